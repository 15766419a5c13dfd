//! sdrlink-test-harness: Test doubles for sdrlink.
//!
//! This crate provides [`MockTransport`] for deterministic testing of the
//! connection orchestrator without radio hardware, and [`MockPrompt`] for
//! scripting the interactive selection boundary.

pub mod mock_prompt;
pub mod mock_transport;

pub use mock_prompt::{MockPrompt, PromptCall};
pub use mock_transport::{MockTransport, TransportCall};
