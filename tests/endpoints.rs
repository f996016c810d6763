mod common;

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use common::{ScriptedHost, ready, types};
use onelab_client::protocol::{ParameterType, decode, encode};
use onelab_client::{
    Client, ClientConfig, ConnectParams, Error, MessageTransport, MessageType, TransportConfig,
};

#[test]
fn start_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let host = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut host = ScriptedHost::new(stream);
        host.handshake("compute");
        host.finish()
    });

    let params = ConnectParams::new("Solver", address);
    let mut client = ready(Client::start(Some(params), ClientConfig::default()).unwrap());
    assert!(client.is_connected());
    client.send_info("over tcp").unwrap();
    drop(client);

    let log = host.join().unwrap();
    assert_eq!(
        types(&log),
        [
            MessageType::Start,
            MessageType::ParameterQuery,
            MessageType::Info,
            MessageType::Stop
        ]
    );
}

#[test]
fn silent_host_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let host = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut host = ScriptedHost::new(stream);
        host.expect(MessageType::Start);
        host.expect(MessageType::ParameterQuery);
        // never answer; wait for the client to give up
        host.finish()
    });

    let config = ClientConfig {
        transport: TransportConfig {
            read_timeout: Some(Duration::from_millis(200)),
            ..TransportConfig::default()
        },
        ..ClientConfig::default()
    };
    let result = Client::start(Some(ConnectParams::new("Solver", address)), config);
    assert!(matches!(result, Err(Error::Timeout { .. })));

    host.join().unwrap();
}

#[test]
fn unreachable_host_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    drop(listener);

    let result = Client::start(
        Some(ConnectParams::new("Solver", address)),
        ClientConfig::default(),
    );
    assert!(result.is_err());
}

#[test]
fn empty_address_rejected() {
    let result = Client::start(
        Some(ConnectParams::new("Solver", "")),
        ClientConfig::default(),
    );
    assert!(matches!(result, Err(Error::InvalidAddress { .. })));
}

#[cfg(unix)]
#[test]
fn start_over_local_socket() {
    use std::os::unix::net::UnixListener;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("onelab.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let host = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut transport = MessageTransport::new(stream, TransportConfig::default());
        assert_eq!(
            transport.receive().unwrap().message_type(),
            Some(MessageType::Start)
        );

        let query = transport.receive().unwrap();
        let mut action = decode(ParameterType::String, query.text()).unwrap();
        assert_eq!(action.name(), "Local/Action");
        action.as_string_mut().unwrap().value = "compute".into();
        transport
            .send(MessageType::Parameter, &encode(&action).unwrap())
            .unwrap();

        let merge = transport.receive().unwrap();
        let stop = transport.receive().unwrap();
        (merge, stop)
    });

    let params = ConnectParams::new("Local", path.to_str().unwrap());
    let mut client = ready(Client::start(Some(params), ClientConfig::default()).unwrap());
    client.merge_file("/data/mesh.msh").unwrap();
    drop(client);

    let (merge, stop) = host.join().unwrap();
    assert_eq!(merge.message_type(), Some(MessageType::ParseString));
    assert_eq!(merge.text(), "Merge \"/data/mesh.msh\";");
    assert_eq!(stop.message_type(), Some(MessageType::Stop));
}
