//! Scripted ONELAB host for integration tests.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use onelab_client::protocol::{Parameter, ParameterType, decode, encode};
use onelab_client::transport::Frame;
use onelab_client::{Client, ClientConfig, MessageTransport, MessageType, Startup, TransportConfig};

/// Connected TCP socket pair: (client side, host side).
pub fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (host, _) = listener.accept().unwrap();
    (client, host)
}

/// Host end of a session. Every frame it receives is logged.
pub struct ScriptedHost {
    transport: MessageTransport<TcpStream>,
    pub log: Vec<Frame>,
}

impl ScriptedHost {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            transport: MessageTransport::new(stream, TransportConfig::default()),
            log: Vec::new(),
        }
    }

    /// Receive one frame and check its type.
    pub fn expect(&mut self, msg_type: MessageType) -> Frame {
        let frame = self.transport.receive().unwrap();
        assert_eq!(
            frame.message_type(),
            Some(msg_type),
            "host expected {msg_type}, got code {} ({:?})",
            frame.code(),
            frame.text()
        );
        self.log.push(frame.clone());
        frame
    }

    /// Receive a query and decode the parameter it carries.
    pub fn expect_query(&mut self, ty: ParameterType) -> Parameter {
        let frame = self.expect(MessageType::ParameterQuery);
        decode(ty, frame.text()).unwrap()
    }

    pub fn reply(&mut self, msg_type: MessageType, text: &str) {
        self.transport.send(msg_type, text).unwrap();
    }

    pub fn reply_parameter(&mut self, parameter: &Parameter) {
        self.reply(MessageType::Parameter, &encode(parameter).unwrap());
    }

    /// Reply when the client may already have hung up.
    pub fn try_reply_parameter(&mut self, parameter: &Parameter) -> onelab_client::Result<()> {
        self.transport
            .send(MessageType::Parameter, &encode(parameter).unwrap())
    }

    /// Handle START and the `<name>/Action` bootstrap, answering `action`.
    pub fn handshake(&mut self, action: &str) {
        self.expect(MessageType::Start);
        let mut query = self.expect_query(ParameterType::String);
        assert!(query.name().ends_with("/Action"));
        query.as_string_mut().unwrap().value = action.to_owned();
        self.reply_parameter(&query);
    }

    /// Read until the client hangs up and return everything received.
    pub fn finish(mut self) -> Vec<Frame> {
        while let Ok(frame) = self.transport.receive() {
            self.log.push(frame);
        }
        self.log
    }
}

/// Run `script` as the host on its own thread.
pub fn spawn_host<F>(stream: TcpStream, script: F) -> JoinHandle<Vec<Frame>>
where
    F: FnOnce(&mut ScriptedHost) + Send + 'static,
{
    thread::spawn(move || {
        let mut host = ScriptedHost::new(stream);
        script(&mut host);
        host.finish()
    })
}

/// Attach a client named `name` to a scripted host.
pub fn attach_with<F>(name: &str, script: F) -> (Startup<TcpStream>, JoinHandle<Vec<Frame>>)
where
    F: FnOnce(&mut ScriptedHost) + Send + 'static,
{
    let (client_side, host_side) = socket_pair();
    let host = spawn_host(host_side, script);
    let startup = Client::attach(name, client_side, ClientConfig::default()).unwrap();
    (startup, host)
}

pub fn ready<S: Read + Write>(startup: Startup<S>) -> Client<S> {
    match startup {
        Startup::Ready(client) => client,
        Startup::Initialize => panic!("host asked for initialize"),
    }
}

pub fn types(frames: &[Frame]) -> Vec<MessageType> {
    frames.iter().filter_map(Frame::message_type).collect()
}
