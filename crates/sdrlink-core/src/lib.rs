//! sdrlink-core: Core traits, types, and error definitions for sdrlink.
//!
//! This crate defines the shared abstractions the rest of the workspace
//! builds on. The discovery registry, message classifier, and connection
//! orchestrator all depend on these types without pulling in each other.
//!
//! # Key types
//!
//! - [`RadioTransport`] -- boundary to the low-level protocol client
//! - [`SelectionPrompt`] -- request/response boundary to the UI
//! - [`SessionEvent`] -- the single notify boundary for state and failures
//! - [`DiscoveredTarget`] -- one reachable radio or station
//! - [`AppSettings`] -- persisted defaults, one explicit struct
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod prompt;
pub mod settings;
pub mod target;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use sdrlink_core::*`.
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use prompt::{Arbitration, Credentials, SelectionPrompt};
pub use settings::AppSettings;
pub use target::{DiscoveredTarget, GuiClientSession};
pub use transport::RadioTransport;
pub use types::*;
