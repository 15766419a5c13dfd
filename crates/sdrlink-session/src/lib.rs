//! sdrlink-session: Connection orchestration for sdrlink.
//!
//! [`SessionController`] drives the connect/disconnect state machine over
//! the [`RadioTransport`](sdrlink_core::RadioTransport) boundary,
//! consults the discovery registry for viable targets, defers target
//! selection and arbitration to the
//! [`SelectionPrompt`](sdrlink_core::SelectionPrompt) boundary, and
//! manages the lifecycle of auxiliary streams through
//! [`AuxStreamManager`].
//!
//! At most one primary connection exists at a time, and only one
//! connect/disconnect cycle may be in flight; both invariants are
//! enforced by state-gating inside the controller.

pub mod aux;
pub mod controller;

pub use aux::{AuxStream, AuxStreamManager};
pub use controller::{ConnectionSession, SessionController};
