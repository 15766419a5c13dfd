//! sdrlink-messages: Protocol message classification and filtering.
//!
//! Every line of text exchanged with the radio flows through
//! [`MessagesModel`], which suppresses acknowledgement-only noise,
//! retains the chronological history, and maintains a live-filtered view
//! for the diagnostic display. Filter kinds are the closed
//! [`MessageFilter`](sdrlink_core::MessageFilter) enumeration from
//! `sdrlink-core`, re-exported here.

pub mod message;
pub mod model;

pub use message::{Direction, TcpMessage};
pub use model::MessagesModel;
pub use sdrlink_core::MessageFilter;
