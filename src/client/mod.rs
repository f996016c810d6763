//! ONELAB session client
//!
//! A [`Client`] is either attached to a host (it was given connection
//! parameters) or standalone. Standalone clients answer every query with the
//! caller's default, so the same computation runs with or without a host.

mod options;
mod subclient;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::protocol::{Codec, Error, MessageType, Parameter, Result};
use crate::transport::{Endpoint, MessageTransport, MetricsSnapshot, SocketTimeouts, TransportConfig};

pub use options::{NumberOptions, StringOptions};
pub use subclient::{ONELAB_FLAG, SubClientInvocation};

/// Value of `<name>/Action` that asks for an introspection-only run.
pub const ACTION_INITIALIZE: &str = "initialize";

/// Default value of `<name>/Action`.
pub const ACTION_COMPUTE: &str = "compute";

/// Payload of the STOP message.
const FAREWELL: &str = "Goodbye!";

/// Session name and host address, as handed over after `-onelab`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Session (client) name
    pub name: String,
    /// Local socket path or `host:port`
    pub address: String,
}

impl ConnectParams {
    /// Create connection parameters
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Socket settings
    pub transport: TransportConfig,
    /// Parameter codec settings
    pub codec: Codec,
}

/// Lifecycle state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No host; exchanges return defaults
    Disconnected,
    /// Attached to a host
    Connected,
    /// Torn down; no further operations
    Closed,
}

enum State<S> {
    Disconnected,
    Connected(MessageTransport<S>),
    Closed,
}

/// Outcome of starting a session.
pub enum Startup<S: Read + Write = Endpoint> {
    /// Session is ready for queries
    Ready(Client<S>),
    /// Host asked for an introspection-only run; the session was already
    /// torn down and the process should exit successfully
    Initialize,
}

/// ONELAB session client.
pub struct Client<S: Read + Write = Endpoint> {
    name: String,
    state: State<S>,
    codec: Codec,
    action: String,
}

impl Client<Endpoint> {
    /// Start a session, exiting the process if the host asks for `initialize`.
    ///
    /// Without `params` the client is standalone.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be reached or the bootstrap
    /// exchange fails.
    pub fn new(params: Option<ConnectParams>, config: ClientConfig) -> Result<Self> {
        match Self::start(params, config)? {
            Startup::Ready(client) => Ok(client),
            Startup::Initialize => {
                info!("onelab action is initialize; exiting");
                std::process::exit(0)
            }
        }
    }

    /// Start a session and report an `initialize` request instead of exiting.
    pub fn start(params: Option<ConnectParams>, config: ClientConfig) -> Result<Startup> {
        let Some(params) = params else {
            return Ok(Startup::Ready(Self::standalone(config)));
        };

        let endpoint = Endpoint::connect(&params.address, &config.transport)?;
        Self::attach(params.name, endpoint, config)
    }
}

impl<S: Read + Write> Client<S> {
    /// Create a client with no host.
    #[must_use]
    pub fn standalone(config: ClientConfig) -> Self {
        Self {
            name: String::new(),
            state: State::Disconnected,
            codec: config.codec,
            action: ACTION_COMPUTE.to_owned(),
        }
    }

    /// Run the session handshake over an already connected stream.
    ///
    /// The configured timeouts are applied to `stream` first. Then START is
    /// sent with the process id and `<name>/Action` is resolved.
    #[instrument(level = "debug", skip_all, fields(name = name.as_ref()))]
    pub fn attach(name: impl AsRef<str>, stream: S, config: ClientConfig) -> Result<Startup<S>>
    where
        S: SocketTimeouts,
    {
        stream.apply_timeouts(&config.transport)?;
        let mut transport = MessageTransport::new(stream, config.transport);
        transport.send(MessageType::Start, &std::process::id().to_string())?;

        let mut client = Self {
            name: name.as_ref().to_owned(),
            state: State::Connected(transport),
            codec: config.codec,
            action: ACTION_COMPUTE.to_owned(),
        };

        let action_name = format!("{}/Action", client.name);
        client.action = client.get_string(&action_name, ACTION_COMPUTE, StringOptions::default())?;
        debug!(action = %client.action, "bootstrap complete");

        if client.action == ACTION_INITIALIZE {
            client.close()?;
            return Ok(Startup::Initialize);
        }
        Ok(Startup::Ready(client))
    }

    /// Session name (empty when standalone)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved `<name>/Action`
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.state {
            State::Disconnected => SessionState::Disconnected,
            State::Connected(_) => SessionState::Connected,
            State::Closed => SessionState::Closed,
        }
    }

    /// Whether a host is attached
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    /// Transport counters, when connected
    #[must_use]
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        match &self.state {
            State::Connected(transport) => Some(transport.metrics()),
            _ => None,
        }
    }

    /// Transport for one exchange, `None` when standalone.
    fn transport(&mut self) -> Result<Option<&mut MessageTransport<S>>> {
        match &mut self.state {
            State::Connected(transport) => Ok(Some(transport)),
            State::Disconnected => Ok(None),
            State::Closed => Err(Error::Closed),
        }
    }

    /// Close the session without STOP once the transport lost frame alignment.
    ///
    /// Nothing more can be exchanged on such a stream: a late reply or the
    /// rest of a rejected frame would be read as the answer to the next request.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if matches!(&self.state, State::Connected(transport) if !transport.is_in_sync()) {
            warn!(name = %self.name, "closing onelab session after transport failure");
            self.state = State::Closed;
        }
        result
    }

    /// Look `parameter` up on the host.
    ///
    /// If the host knows it, every field is replaced with the host's copy.
    /// If not, the parameter is registered with its current fields.
    ///
    /// A transport failure that leaves the stream mid-frame (including a
    /// receive timeout) closes the session; later calls return [`Error::Closed`].
    #[instrument(level = "debug", skip(self, parameter), fields(name = parameter.name()))]
    pub fn query(&mut self, parameter: &mut Parameter) -> Result<()> {
        let codec = self.codec;
        let Some(transport) = self.transport()? else {
            return Ok(());
        };

        let result = exchange_parameter(transport, codec, parameter);
        self.settle(result)
    }

    /// Query a string parameter, returning the host's value or `value`.
    pub fn get_string(&mut self, name: &str, value: &str, options: StringOptions) -> Result<String> {
        let mut parameter = options.into_parameter(name, value);
        self.query(&mut parameter)?;
        Ok(match parameter.as_string() {
            Some(s) => s.value.clone(),
            None => value.to_owned(),
        })
    }

    /// Query a number parameter, returning the host's value or `value`.
    ///
    /// Without explicit choices, the keys of the option labels become the choices.
    pub fn get_number(&mut self, name: &str, value: f64, options: NumberOptions) -> Result<f64> {
        let mut parameter = options.into_parameter(name, value);
        self.query(&mut parameter)?;
        Ok(parameter.as_number().map_or(value, |n| n.value))
    }

    /// Push `parameter` to the host, recording this client among its users.
    #[instrument(level = "debug", skip(self, parameter), fields(name = parameter.name()))]
    pub fn set(&mut self, mut parameter: Parameter) -> Result<()> {
        let codec = self.codec;
        let client_name = self.name.clone();
        let Some(transport) = self.transport()? else {
            return Ok(());
        };

        parameter.add_client(&client_name);
        let result = codec
            .encode(&parameter)
            .and_then(|message| transport.send(MessageType::Parameter, &message));
        self.settle(result)
    }

    /// Push a string value to the host.
    pub fn set_string(&mut self, name: &str, value: &str, options: StringOptions) -> Result<()> {
        self.set(options.into_parameter(name, value))
    }

    /// Push a number value to the host.
    pub fn set_number(&mut self, name: &str, value: f64, options: NumberOptions) -> Result<()> {
        self.set(options.into_parameter(name, value))
    }

    /// Send an informational message for the host to display.
    pub fn send_info(&mut self, text: &str) -> Result<()> {
        let result = match self.transport()? {
            Some(transport) => transport.send(MessageType::Info, text),
            None => Ok(()),
        };
        self.settle(result)
    }

    /// Ask the host to merge `path`, made absolute against the working directory.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.transport()?.is_none() {
            return Ok(());
        }

        let path = absolutize(path.as_ref())?;
        let directive = merge_directive(&path);
        let result = match self.transport()? {
            Some(transport) => transport.send(MessageType::ParseString, &directive),
            None => Ok(()),
        };
        self.settle(result)
    }

    /// Ask the host to accept a sub-client named `name`.
    ///
    /// Returns the invocation to launch `command` with when the host answers
    /// with a connect address; spawning it is up to the caller.
    #[instrument(level = "debug", skip(self))]
    pub fn request_sub_client(
        &mut self,
        name: &str,
        command: &str,
    ) -> Result<Option<SubClientInvocation>> {
        let Some(transport) = self.transport()? else {
            return Ok(None);
        };

        let result = exchange_connect(transport, name, command);
        self.settle(result)
    }

    /// Say goodbye to the host and release the socket.
    ///
    /// Does nothing when standalone or already closed.
    ///
    /// # Errors
    ///
    /// Returns the error of sending STOP; the session is closed regardless.
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(mut transport) => {
                let result = transport.send(MessageType::Stop, FAREWELL);
                debug!(metrics = ?transport.metrics(), "onelab session closed");
                drop(transport);
                result
            }
            State::Disconnected => {
                self.state = State::Disconnected;
                Ok(())
            }
            State::Closed => Ok(()),
        }
    }
}

impl<S: Read + Write> Drop for Client<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to stop onelab session");
        }
    }
}

/// PARAMETER_QUERY round trip, registering the parameter if the host does not know it.
fn exchange_parameter<S: Read + Write>(
    transport: &mut MessageTransport<S>,
    codec: Codec,
    parameter: &mut Parameter,
) -> Result<()> {
    let request = codec.encode(parameter)?;
    transport.send(MessageType::ParameterQuery, &request)?;
    let reply = transport.receive()?;

    match reply.message_type() {
        Some(MessageType::Parameter) => codec.decode_into(parameter, reply.text())?,
        Some(MessageType::Info) => {
            debug!("parameter unknown to host; registering default");
            transport.send(MessageType::Parameter, &request)?;
        }
        _ => debug!(code = reply.code(), "unexpected reply to parameter query"),
    }
    Ok(())
}

fn exchange_connect<S: Read + Write>(
    transport: &mut MessageTransport<S>,
    name: &str,
    command: &str,
) -> Result<Option<SubClientInvocation>> {
    transport.send(MessageType::Connect, name)?;
    let reply = transport.receive()?;
    debug!(code = reply.code(), text = reply.text(), "sub-client reply");

    if reply.message_type() == Some(MessageType::Connect) && !reply.text().is_empty() {
        let invocation = SubClientInvocation::new(command, name, reply.into_text());
        info!(command_line = %invocation.command_line(), "sub-client accepted");
        return Ok(Some(invocation));
    }
    Ok(None)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn merge_directive(path: &Path) -> String {
    format!("Merge \"{}\";", path.display())
}
