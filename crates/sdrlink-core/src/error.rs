//! Error types for sdrlink.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Discovery, connection, and stream
//! failures are all captured here.
//!
//! None of these errors trigger automatic retry anywhere in the core:
//! every failure is terminal at the point of detection, and recovery is
//! always re-initiated by a fresh user intent.

/// The error type for all sdrlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A discovery feed failed (socket bind error, unreachable relay).
    ///
    /// Non-fatal: the registry simply stops receiving updates from that
    /// source until it recovers.
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Negotiation or transport-level connect failure.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Transport-level disconnect failure.
    ///
    /// Local state is authoritative over remote acknowledgment: the
    /// orchestrator still forces itself back to disconnected after this.
    #[error("disconnect failed: {0}")]
    Disconnect(String),

    /// Auxiliary stream create/remove failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// An operation that requires an active connection was invoked
    /// without one.
    #[error("not connected")]
    NotConnected,

    /// A second primary connection was requested while one is active.
    #[error("a connection is already active")]
    AlreadyConnected,

    /// Timed out waiting for the radio.
    #[error("timeout waiting for radio")]
    Timeout,

    /// Persisted settings could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_discovery() {
        let e = Error::Discovery("bind failed".into());
        assert_eq!(e.to_string(), "discovery error: bind failed");
    }

    #[test]
    fn error_display_connect() {
        let e = Error::Connect("radio refused handle".into());
        assert_eq!(e.to_string(), "connect failed: radio refused handle");
    }

    #[test]
    fn error_display_disconnect() {
        let e = Error::Disconnect("socket already gone".into());
        assert_eq!(e.to_string(), "disconnect failed: socket already gone");
    }

    #[test]
    fn error_display_stream() {
        let e = Error::Stream("no DAX capacity".into());
        assert_eq!(e.to_string(), "stream error: no DAX capacity");
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
