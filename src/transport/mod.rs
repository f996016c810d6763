//! ONELAB socket transport

mod endpoint;
mod framed;
mod metrics;

use std::time::Duration;

use crate::protocol::MAX_PAYLOAD_SIZE;

pub use endpoint::{AddressKind, Endpoint, SocketTimeouts};
pub use framed::{Frame, MessageTransport};
pub use metrics::{MessageTypeCounters, MetricsSnapshot};

/// Transport configuration options.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Optional read timeout for sockets. `None` blocks until the host answers.
    pub read_timeout: Option<Duration>,
    /// Optional write timeout for sockets.
    pub write_timeout: Option<Duration>,
    /// Largest payload accepted or sent, in bytes.
    pub max_payload_len: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            max_payload_len: MAX_PAYLOAD_SIZE,
        }
    }
}
