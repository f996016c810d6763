//! ONELAB session client - exchange typed parameters with a controlling host
//!
//! A computation process uses this crate to read and write named parameters
//! held by a ONELAB host (such as Gmsh) while it runs. Parameters travel as
//! NUL-delimited token streams inside length-prefixed frames over a local
//! domain socket or TCP.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use onelab_client::{Client, ClientConfig, ConnectParams, NumberOptions, StringOptions};
//!
//! // Name and address come from the `-onelab <name> <address>` launch arguments
//! let params = Some(ConnectParams::new("MySolver", "/tmp/onelab.sock"));
//! let mut client = Client::new(params, ClientConfig::default())?;
//!
//! let radius = client.get_number(
//!     "Geometry/Radius",
//!     0.5,
//!     NumberOptions::default().range(0.0, 1.0).step(0.1),
//! )?;
//! let mode = client.get_string("Solver/Mode", "static", StringOptions::default())?;
//! client.merge_file("result.pos")?;
//! # let _ = (radius, mode);
//! # Ok::<(), onelab_client::Error>(())
//! ```
//!
//! Without connection parameters the client is standalone and every query
//! returns its default, so the same program runs with or without a host.
//!
//! # Features
//!
//! - **Schema-driven codec** - one recursive encoder/decoder over fixed field tables
//! - **Exact float round trip** - `%g` layout with shortest round-trip digits
//! - **Typed errors** - closed connections and malformed frames are returned, never swallowed
//! - **Scoped teardown** - STOP is sent when the client is closed or dropped

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod protocol;
pub mod transport;

pub use client::{
    Client, ClientConfig, ConnectParams, NumberOptions, SessionState, Startup, StringOptions,
    SubClientInvocation,
};
pub use protocol::{
    Codec, Error, MAX_PAYLOAD_SIZE, MessageType, Parameter, ParameterType, ParameterValue, Result,
    WIRE_VERSION,
};
pub use transport::{Endpoint, MessageTransport, SocketTimeouts, TransportConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
