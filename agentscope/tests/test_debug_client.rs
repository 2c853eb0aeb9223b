use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use agentscope::config::ClientConfig;
use agentscope::debug::{
    AgentLogLevel, DebugClient, DebugTransport, DumpProcessCacheArgs, Selector, TcpTransport,
    WireRequest,
};
use agentscope::domain::{DebugError, TransportError};
use agentscope::dump::{dump_process_cache, ProcessCacheOptions, ProcessCacheSummary};

/// Serve one connection: record the request line, answer with `response`
fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let address = listener.local_addr().unwrap().to_string();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("Failed to accept");
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        reader.read_line(&mut request).unwrap();
        let mut writer = stream;
        writer.write_all(response.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
        request
    });
    (address, handle)
}

fn transport(address: &str, timeout_secs: u64) -> TcpTransport {
    TcpTransport::new(&ClientConfig::new(address, timeout_secs)).expect("Failed to create transport")
}

#[test]
fn test_process_cache_round_trip() {
    let (address, server) = serve_once(
        r#"{"flag":"DUMP_PROCESS_CACHE","processes":{"processes":[{"process":{"pid":42,"binary":"/bin/sh"},"refcnt":1}]}}"#,
    );
    let mut client = DebugClient::new(transport(&address, 5));
    let options = ProcessCacheOptions { skip_zero_refcnt: true, ..ProcessCacheOptions::default() };

    let mut out = Vec::new();
    let summary = dump_process_cache(&mut client, &options, &mut out).unwrap();

    assert_eq!(summary, ProcessCacheSummary { printed: 1, filtered: 0, skipped: 0 });
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "{\"process\":{\"pid\":42,\"binary\":\"/bin/sh\"},\"refcnt\":1}\n"
    );

    let request: WireRequest = serde_json::from_str(&server.join().unwrap()).unwrap();
    assert_eq!(request.flag, Selector::DumpProcessCache);
    assert_eq!(request.dump, Some(DumpProcessCacheArgs { skip_zero_refcnt: true }));
}

#[test]
fn test_mismatched_flag_yields_no_records() {
    let (address, server) = serve_once(
        r#"{"flag":"LOG_LEVEL","level":"INFO","processes":{"processes":[{"refcnt":1}]}}"#,
    );
    let mut client = DebugClient::new(transport(&address, 5));

    let mut out = Vec::new();
    let summary =
        dump_process_cache(&mut client, &ProcessCacheOptions::default(), &mut out).unwrap();

    assert_eq!(summary, ProcessCacheSummary::default());
    assert!(out.is_empty());
    server.join().unwrap();
}

#[test]
fn test_log_level_query() {
    let (address, server) = serve_once(r#"{"flag":"LOG_LEVEL","level":"WARN"}"#);
    let mut client = DebugClient::new(transport(&address, 5));
    assert_eq!(client.log_level().unwrap(), AgentLogLevel::Warn);

    let request: WireRequest = serde_json::from_str(&server.join().unwrap()).unwrap();
    assert_eq!(request.flag, Selector::LogLevel);
    assert_eq!(request.dump, None);
}

#[test]
fn test_log_level_mismatch_is_error() {
    let (address, server) = serve_once(r#"{"flag":"DUMP_PROCESS_CACHE","processes":{}}"#);
    let mut client = DebugClient::new(transport(&address, 5));
    let err = client.log_level().unwrap_err();
    assert!(matches!(
        err,
        DebugError::ProtocolMismatch { expected: Selector::LogLevel, actual: Selector::DumpProcessCache }
    ));
    server.join().unwrap();
}

#[test]
fn test_timeout_when_agent_is_silent() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let mut transport = transport(&address, 1);
    let request = WireRequest { flag: Selector::LogLevel, dump: None };
    let err = transport.get_debug(&request).unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }), "got {err}");
    server.join().unwrap();
}

#[test]
fn test_connect_refused() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };
    let mut client = DebugClient::new(transport(&address, 5));
    let err = client.log_level().unwrap_err();
    assert!(matches!(err, DebugError::Transport(TransportError::Connect { .. })), "got {err}");
}

#[test]
fn test_closed_without_response() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut request = String::new();
        BufReader::new(&stream).read_line(&mut request).unwrap();
    });

    let mut client = DebugClient::new(transport(&address, 5));
    let err = client.log_level().unwrap_err();
    assert!(matches!(err, DebugError::Transport(TransportError::Closed)), "got {err}");
    server.join().unwrap();
}
