//! ONELAB client error types

use thiserror::Error;

/// ONELAB protocol and session errors
#[derive(Error, Debug)]
pub enum Error {
    /// Peer closed the connection mid-frame or refused a write
    #[error("onelab socket closed while {during}")]
    ConnectionClosed {
        /// Operation in progress when the stream ended
        during: &'static str,
    },

    /// Socket read or write timed out
    #[error("onelab socket timed out while {during}")]
    Timeout {
        /// Operation in progress when the timeout fired
        during: &'static str,
    },

    /// Frame header carried a negative payload length
    #[error("invalid frame length: {len}")]
    InvalidLength {
        /// Declared length
        len: i32,
    },

    /// Payload too large
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Token stream ended before the schema was satisfied
    #[error("token stream exhausted while decoding field `{field}`")]
    MissingToken {
        /// Schema field being decoded
        field: &'static str,
    },

    /// Token could not be parsed as the numeric type the schema requires
    #[error("field `{field}`: invalid {expected} token {token:?}")]
    InvalidNumber {
        /// Schema field being decoded
        field: &'static str,
        /// "int" or "float"
        expected: &'static str,
        /// Offending token
        token: String,
    },

    /// List/dict count token is negative or cannot be satisfied
    #[error("field `{field}`: collection count {count} exceeds limit {max}")]
    CollectionTooLarge {
        /// Schema field being decoded
        field: &'static str,
        /// Declared element count
        count: i64,
        /// Largest count that was acceptable
        max: usize,
    },

    /// Field value does not have the shape its schema entry declares
    #[error("field `{field}` does not match its schema shape")]
    SchemaMismatch {
        /// Schema field involved
        field: &'static str,
    },

    /// A string value contains the token separator and cannot be encoded
    #[error("field `{field}` contains a NUL byte")]
    EmbeddedSeparator {
        /// Schema field being encoded
        field: &'static str,
    },

    /// Version tag disagreement (strict decoding only)
    #[error("onelab version mismatch: expected {expected:?}, got {found:?}")]
    VersionMismatch {
        /// Version this crate speaks
        expected: &'static str,
        /// Version found in the message
        found: String,
    },

    /// Parameter type tag disagreement (strict decoding only)
    #[error("onelab parameter type mismatch: expected {expected:?}, got {found:?}")]
    TypeMismatch {
        /// Type of the parameter being decoded into
        expected: &'static str,
        /// Type found in the message
        found: String,
    },

    /// Connect address could not be used
    #[error("invalid onelab address {address:?}: {reason}")]
    InvalidAddress {
        /// Address as supplied
        address: String,
        /// What was wrong with it
        reason: String,
    },

    /// Feature not available on this platform
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Parameter has an empty name and cannot be sent
    #[error("onelab parameter name is empty")]
    EmptyName,

    /// An earlier failure left the stream between frames unknown
    #[error("onelab stream is out of step with the host")]
    OutOfSync,

    /// Session already torn down
    #[error("onelab session is closed")]
    Closed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Classify an I/O failure that happened during `during`.
    ///
    /// End-of-stream and zero-length writes become [`Error::ConnectionClosed`],
    /// expired socket timeouts become [`Error::Timeout`].
    pub(crate) fn from_io(err: std::io::Error, during: &'static str) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof
            | ErrorKind::WriteZero
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => Self::ConnectionClosed { during },
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Self::Timeout { during },
            _ => Self::Io(err),
        }
    }

    /// Whether a transport failure leaves the stream at an unknown frame
    /// boundary, so the transport can no longer be used.
    ///
    /// A timeout counts: the reply being waited for may still arrive.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed { .. }
                | Self::Timeout { .. }
                | Self::Io(_)
                | Self::InvalidLength { .. }
                | Self::PayloadTooLarge { .. }
                | Self::OutOfSync
                | Self::Closed
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_eof_maps_to_connection_closed() {
        let err = Error::from_io(io::Error::from(io::ErrorKind::UnexpectedEof), "reading header");
        assert!(matches!(
            err,
            Error::ConnectionClosed {
                during: "reading header"
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_would_block_maps_to_timeout() {
        let err = Error::from_io(io::Error::from(io::ErrorKind::WouldBlock), "reading payload");
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_decode_errors_are_not_fatal() {
        let err = Error::MissingToken { field: "value" };
        assert!(!err.is_fatal());
        assert!(!Error::EmptyName.is_fatal());
    }

    #[test]
    fn test_other_io_is_preserved() {
        let err = Error::from_io(io::Error::other("boom"), "writing frame");
        assert!(matches!(err, Error::Io(_)));
    }
}
