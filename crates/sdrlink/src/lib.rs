//! # sdrlink -- Connection Orchestration for SDR Clients
//!
//! `sdrlink` is the non-visual core of a desktop client for networked
//! software-defined radios that speak a line-oriented text protocol. It
//! discovers candidate radios across multiple transport modes, arbitrates
//! exclusive or shared access, drives the connect/disconnect state
//! machine, manages auxiliary data streams (remote audio, DAX channels),
//! and classifies the protocol message stream for diagnostic display.
//!
//! Rendering, window management, and the low-level wire protocol are all
//! out of scope: the core talks to them through the
//! [`SelectionPrompt`], [`SessionEvent`], and [`RadioTransport`]
//! boundaries.
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                  | Purpose                                       |
//! |------------------------|-----------------------------------------------|
//! | `sdrlink-core`         | Types, traits, errors, persisted settings     |
//! | `sdrlink-discovery`    | Discovery registry and advertisement feeds    |
//! | `sdrlink-messages`     | Message classification, filtering, history    |
//! | `sdrlink-session`      | Connection state machine and stream manager   |
//! | `sdrlink-test-harness` | Mock transport and prompt for tests           |
//! | **`sdrlink`**          | This facade crate -- re-exports everything    |
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sdrlink::discovery::{DiscoveryRegistry, LanFeed};
//! use sdrlink::messages::MessagesModel;
//! use sdrlink::session::SessionController;
//! use sdrlink::{AppSettings, RadioTransport, SelectionPrompt};
//!
//! # async fn example(
//! #     transport: Arc<dyn RadioTransport>,
//! #     prompt: Arc<dyn SelectionPrompt>,
//! # ) -> sdrlink::Result<()> {
//! let registry = Arc::new(DiscoveryRegistry::new());
//! let _feed = LanFeed::start(Arc::clone(&registry)).await?;
//!
//! let controller = SessionController::new(
//!     transport,
//!     Arc::clone(&registry),
//!     Arc::new(MessagesModel::new()),
//!     prompt,
//!     AppSettings::default(),
//! );
//!
//! // Drive the machine from UI intents; observe it through events.
//! let mut events = controller.subscribe();
//! controller.connect().await;
//! while let Ok(event) = events.try_recv() {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub use sdrlink_core::*;

/// Discovery registry and advertisement feeds.
pub mod discovery {
    pub use sdrlink_discovery::*;
}

/// Protocol message classification and filtering.
pub mod messages {
    pub use sdrlink_messages::*;
}

/// Connection state machine and auxiliary stream management.
pub mod session {
    pub use sdrlink_session::*;
}
