//! Socket endpoint selection for the ONELAB host connection.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use tracing::{debug, instrument};

use super::TransportConfig;
use crate::protocol::{Error, Result};

/// Socket family implied by a connect address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// Local domain socket path
    Local,
    /// `host:port`
    Network,
}

impl AddressKind {
    /// Classify an address the way the host writes them.
    ///
    /// Anything with a path separator, or without a colon, names a local
    /// socket; the rest is `host:port`.
    #[must_use]
    pub fn classify(address: &str) -> Self {
        if address.contains('/') || address.contains('\\') || !address.contains(':') {
            Self::Local
        } else {
            Self::Network
        }
    }
}

/// Streams that take their read and write timeouts from a [`TransportConfig`].
///
/// `Client::attach` applies the configuration through this trait, so a
/// caller-supplied socket honors the same timeouts as one it connected itself.
pub trait SocketTimeouts {
    /// Set both socket timeouts from `config`.
    fn apply_timeouts(&self, config: &TransportConfig) -> io::Result<()>;
}

impl SocketTimeouts for TcpStream {
    fn apply_timeouts(&self, config: &TransportConfig) -> io::Result<()> {
        self.set_read_timeout(config.read_timeout)?;
        self.set_write_timeout(config.write_timeout)
    }
}

#[cfg(unix)]
impl SocketTimeouts for UnixStream {
    fn apply_timeouts(&self, config: &TransportConfig) -> io::Result<()> {
        self.set_read_timeout(config.read_timeout)?;
        self.set_write_timeout(config.write_timeout)
    }
}

impl SocketTimeouts for Endpoint {
    fn apply_timeouts(&self, config: &TransportConfig) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.apply_timeouts(config),
            Self::Network(s) => s.apply_timeouts(config),
        }
    }
}

/// Connected byte stream to the host.
#[derive(Debug)]
pub enum Endpoint {
    /// Local domain socket
    #[cfg(unix)]
    Local(UnixStream),
    /// TCP socket
    Network(TcpStream),
}

impl Endpoint {
    /// Connect to `address`, choosing the socket family from its syntax.
    #[instrument(level = "debug", skip(config))]
    pub fn connect(address: &str, config: &TransportConfig) -> Result<Self> {
        if address.is_empty() {
            return Err(Error::InvalidAddress {
                address: address.to_owned(),
                reason: "empty address".to_owned(),
            });
        }

        let endpoint = match AddressKind::classify(address) {
            AddressKind::Local => Self::connect_local(address)?,
            AddressKind::Network => {
                let stream = TcpStream::connect(address)?;
                stream.set_nodelay(true)?;
                Self::Network(stream)
            }
        };

        endpoint.apply_timeouts(config)?;
        debug!(kind = ?endpoint.kind(), "connected to onelab host");
        Ok(endpoint)
    }

    #[cfg(unix)]
    fn connect_local(path: &str) -> Result<Self> {
        Ok(Self::Local(UnixStream::connect(path)?))
    }

    #[cfg(not(unix))]
    fn connect_local(_path: &str) -> Result<Self> {
        Err(Error::Unsupported("local domain sockets"))
    }

    /// Socket family of this endpoint
    #[must_use]
    pub fn kind(&self) -> AddressKind {
        match self {
            #[cfg(unix)]
            Self::Local(_) => AddressKind::Local,
            Self::Network(_) => AddressKind::Network,
        }
    }

    /// Set socket read timeout.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.set_read_timeout(timeout),
            Self::Network(s) => s.set_read_timeout(timeout),
        }
    }

    /// Set socket write timeout.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.set_write_timeout(timeout),
            Self::Network(s) => s.set_write_timeout(timeout),
        }
    }

    /// Shut down both directions of the socket.
    pub fn shutdown(&self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.shutdown(Shutdown::Both),
            Self::Network(s) => s.shutdown(Shutdown::Both),
        }
    }
}

impl Read for Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.read(buf),
            Self::Network(s) => s.read(buf),
        }
    }
}

impl Write for Endpoint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.write(buf),
            Self::Network(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Self::Local(s) => s.flush(),
            Self::Network(s) => s.flush(),
        }
    }
}
