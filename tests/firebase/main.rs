
use libfirebase::firebase::{ErrorCode, EventType, Firebase, TransportFactory};
use libfirebase::network::application::http::Method;
use libfirebase::network::error::Error;
use mock::{MockTransport, Shared, response, script};

fn client(script: &Shared) -> Firebase<impl TransportFactory<Transport = MockTransport>> {
    let script = script.clone();
    Firebase::new(move || MockTransport::new(&script))
}

fn stream_lines(script: &Shared, lines: &[&str]) {
    let mut script = script.borrow_mut();
    for line in lines {
        script.lines.push_back(Ok(line.to_string()));
    }
}

#[test]
fn test_new_client_has_no_error() {
    let script = script();
    let firebase = client(&script);
    assert!(firebase.succeeded());
    assert!(!firebase.failed());
    assert_eq!(firebase.last_error(), "");
    assert_eq!(firebase.error().code().code(), 0);
    assert_eq!(script.borrow().created, 0);
}

#[test]
fn test_unconfigured_client_still_sends() {
    let script = script();
    let mut firebase = client(&script);

    let value = firebase.get("devices");

    assert!(value.is_null());
    assert!(firebase.succeeded());
    let calls = &script.borrow().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host, "");
    assert_eq!(calls[0].auth, "");
    assert_eq!(calls[0].method, Method::Get);
    assert_eq!(calls[0].path, "devices");
}

#[test]
fn test_unconfigured_client_still_streams() {
    let script = script();
    let mut firebase = client(&script);

    firebase.open_stream("devices");

    assert!(firebase.succeeded());
    let calls = &script.borrow().stream_calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].host, "");
    assert_eq!(calls[0].auth, "");
    assert_eq!(calls[0].path, "devices");
}

#[test]
fn test_status_zero_is_a_failure() {
    let script = script();
    script.borrow_mut().responses.push_back(Ok(response(0, "")));
    let mut firebase = client(&script);

    firebase.get("a");

    assert!(firebase.failed());
    assert!(!firebase.succeeded());
    assert_eq!(firebase.error().code(), ErrorCode::Status(0));
}

#[test]
fn test_get_returns_document() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Ok(response(200, r#"{"led":true,"count":3}"#)));
    let mut firebase = client(&script);
    firebase.configure("demo.firebaseio.com", "secret");

    let value = firebase.get("device");

    assert_eq!(value.get_bool("led"), Some(true));
    assert_eq!(value.get_int("count"), Some(3));
    let calls = &script.borrow().calls;
    assert_eq!(calls[0].host, "demo.firebaseio.com");
    assert_eq!(calls[0].auth, "secret");
}

#[test]
fn test_request_transport_created_once() {
    let script = script();
    let mut firebase = client(&script);

    firebase.get("a");
    firebase.set_int("b", 1);
    firebase.remove("c");

    let script = script.borrow();
    assert_eq!(script.created, 1);
    assert_eq!(script.reuse, vec![true]);
    assert_eq!(script.calls.len(), 3);
}

#[test]
fn test_set_variants_serialize_values() {
    let script = script();
    let mut firebase = client(&script);

    firebase.set("raw", r#"{"a":1}"#);
    firebase.set_int("int", -5);
    firebase.set_bool("flag", true);
    firebase.set_string("name", "say \"hi\"");
    firebase.update("patch", r#"{"b":2}"#);
    firebase.remove("gone");

    let calls = &script.borrow().calls;
    let summary: Vec<(Method, &str, Option<&str>)> = calls
        .iter()
        .map(|call| (call.method, call.path.as_str(), call.body.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Method::Put, "raw", Some(r#"{"a":1}"#)),
            (Method::Put, "int", Some("-5")),
            (Method::Put, "flag", Some("true")),
            (Method::Put, "name", Some(r#""say \"hi\"""#)),
            (Method::Patch, "patch", Some(r#"{"b":2}"#)),
            (Method::Delete, "gone", None),
        ]
    );
    assert!(firebase.succeeded());
}

#[test]
fn test_push_returns_generated_name() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Ok(response(200, r#"{"name":"-NxYz123"}"#)));
    let mut firebase = client(&script);

    let name = firebase.push_int("logs", 42);

    assert_eq!(name.as_str(), "-NxYz123");
    assert!(firebase.succeeded());
    let calls = &script.borrow().calls;
    assert_eq!(calls[0].method, Method::Post);
    assert_eq!(calls[0].body.as_deref(), Some("42"));
}

#[test]
fn test_push_without_name_fails() {
    let script = script();
    let mut firebase = client(&script);

    let name = firebase.push("logs", "1");

    assert!(name.is_empty());
    assert_eq!(firebase.error().code(), ErrorCode::InvalidResponse);
}

#[test]
fn test_status_error_uses_server_message() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Ok(response(401, r#"{"error" : "Permission denied"}"#)));
    let mut firebase = client(&script);

    let value = firebase.get("private");

    assert!(value.is_empty());
    assert!(firebase.failed());
    assert_eq!(firebase.error().code(), ErrorCode::Status(401));
    assert_eq!(firebase.error().code().code(), 401);
    assert_eq!(firebase.last_error(), "Permission denied");
}

#[test]
fn test_status_error_without_body() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Ok(response(500, "")));
    let mut firebase = client(&script);

    firebase.set_int("a", 1);

    assert_eq!(firebase.error().code(), ErrorCode::Status(500));
    assert_eq!(firebase.last_error(), "HTTP request failed with status 500");
}

#[test]
fn test_success_clears_previous_error() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Err(Error::ConnectionRefused));
    let mut firebase = client(&script);

    firebase.get("a");
    assert!(firebase.failed());
    assert_eq!(firebase.error().code(), ErrorCode::ConnectionRefused);
    assert_eq!(firebase.error().code().code(), -1);

    firebase.get("a");
    assert!(firebase.succeeded());
    assert_eq!(firebase.last_error(), "");
}

#[test]
fn test_transport_errors_map_to_codes() {
    let cases = [
        (Error::WriteError, ErrorCode::SendFailed),
        (Error::ConnectionClosed, ErrorCode::ConnectionLost),
        (Error::ProtocolError, ErrorCode::InvalidResponse),
        (Error::Timeout, ErrorCode::ReadTimeout),
        (Error::BufferOverflow, ErrorCode::OutOfMemory),
    ];
    for (error, code) in cases {
        let script = script();
        script.borrow_mut().responses.push_back(Err(error));
        let mut firebase = client(&script);
        firebase.get("a");
        assert_eq!(firebase.error().code(), code, "{:?}", error);
    }
}

#[test]
fn test_typed_getters() {
    let script = script();
    {
        let mut script = script.borrow_mut();
        script.responses.push_back(Ok(response(200, "42")));
        script.responses.push_back(Ok(response(200, "21.5")));
        script.responses.push_back(Ok(response(200, "false")));
        script.responses.push_back(Ok(response(200, r#""porch""#)));
    }
    let mut firebase = client(&script);

    assert_eq!(firebase.get_int("count"), Some(42));
    assert_eq!(firebase.get_float("temp"), Some(21.5));
    assert_eq!(firebase.get_bool("led"), Some(false));
    assert_eq!(firebase.get_string("name").unwrap().as_str(), "porch");
    assert!(firebase.succeeded());
}

#[test]
fn test_typed_getter_mismatch_records_parse_error() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Ok(response(200, r#""text""#)));
    let mut firebase = client(&script);

    assert_eq!(firebase.get_int("name"), None);
    assert_eq!(firebase.error().code(), ErrorCode::Parse);
    assert_eq!(firebase.error().code().code(), -100);
}

#[test]
fn test_update_auth_applies_to_next_request() {
    let script = script();
    let mut firebase = client(&script);
    firebase.configure("demo.firebaseio.com", "first");

    firebase.get("a");
    firebase.update_auth("second");
    firebase.get("a");

    let calls = &script.borrow().calls;
    assert_eq!(calls[0].auth, "first");
    assert_eq!(calls[1].auth, "second");
    assert_eq!(firebase.host(), "demo.firebaseio.com");
}

#[test]
fn test_oversized_auth_is_rejected() {
    let script = script();
    let mut firebase = client(&script);
    let auth = "x".repeat(libfirebase::firebase::MAX_AUTH_LEN + 1);

    firebase.configure("demo.firebaseio.com", &auth);

    assert_eq!(firebase.error().code(), ErrorCode::OutOfMemory);
    assert_eq!(firebase.host(), "demo.firebaseio.com");
}

#[test]
fn test_has_event_without_stream() {
    let script = script();
    let mut firebase = client(&script);

    assert!(!firebase.has_event());
    assert!(firebase.failed());
    assert_eq!(firebase.error().code(), ErrorCode::StreamNotInitialized);
    assert_eq!(firebase.error().code().code(), -6);
    assert_eq!(firebase.last_error(), "HTTP stream is not initialized");
}

#[test]
fn test_read_event_without_stream() {
    let script = script();
    let mut firebase = client(&script);

    let event = firebase.read_event();

    assert!(event.is_empty());
    assert_eq!(event.name(), "");
    assert!(firebase.succeeded());
}

#[test]
fn test_close_stream_without_stream() {
    let script = script();
    let mut firebase = client(&script);

    firebase.close_stream();

    assert!(firebase.succeeded());
    assert_eq!(script.borrow().created, 0);
}

#[test]
fn test_stream_put_event() {
    let script = script();
    let mut firebase = client(&script);
    firebase.configure("demo.firebaseio.com", "secret");

    firebase.open_stream("devices");
    assert!(firebase.succeeded());
    assert!(!firebase.has_event());

    stream_lines(
        &script,
        &[
            "event: put\r",
            r#"data: {"path":"/","data":{"led":true}}"#,
            "",
        ],
    );
    assert!(firebase.has_event());

    let event = firebase.read_event();
    assert_eq!(event.event_type(), EventType::Put);
    assert_eq!(event.name(), "put");
    assert_eq!(event.path().unwrap().as_str(), "/");
    assert_eq!(event.data(), Some(r#"{"led":true}"#));
    assert_eq!(event.body().as_str(), r#"{"path":"/","data":{"led":true}}"#);
    assert_eq!(
        event.object().as_str(),
        r#"{"type":"put","path":"/","data":{"led":true}}"#
    );
    assert!(!firebase.has_event());

    let script = script.borrow();
    assert_eq!(script.stream_calls[0].path, "devices");
    assert_eq!(script.stream_calls[0].auth, "secret");
}

#[test]
fn test_stream_keep_alive_event() {
    let script = script();
    let mut firebase = client(&script);
    firebase.open_stream("devices");
    stream_lines(&script, &["event: keep-alive", "data: null", ""]);

    let event = firebase.read_event();

    assert_eq!(event.event_type(), EventType::KeepAlive);
    assert!(event.body().is_null());
    assert_eq!(event.object().as_str(), "null");
}

#[test]
fn test_stream_read_failure_returns_empty_event() {
    let script = script();
    let mut firebase = client(&script);
    firebase.open_stream("devices");
    {
        let mut script = script.borrow_mut();
        script.lines.push_back(Ok("event: put".to_string()));
        script.lines.push_back(Err(Error::ReadError));
    }

    let event = firebase.read_event();

    assert!(event.is_empty());
    assert_eq!(firebase.error().code(), ErrorCode::InvalidResponse);
}

#[test]
fn test_has_event_after_connection_lost() {
    let script = script();
    let mut firebase = client(&script);
    firebase.open_stream("devices");

    script.borrow_mut().streaming = false;

    assert!(!firebase.has_event());
    assert_eq!(firebase.error().code(), ErrorCode::ConnectionLost);
    assert_eq!(firebase.last_error(), "Connection Lost");
}

#[test]
fn test_close_stream_twice() {
    let script = script();
    let mut firebase = client(&script);
    firebase.open_stream("devices");

    firebase.close_stream();
    firebase.close_stream();

    assert_eq!(script.borrow().ends, 2);
    assert_eq!(script.borrow().reuse, vec![true, false, false]);
    assert!(!firebase.has_event());
    assert_eq!(firebase.error().code(), ErrorCode::ConnectionLost);
    assert!(firebase.read_event().is_empty());
}

#[test]
fn test_reopen_stream_reuses_channel() {
    let script = script();
    let mut firebase = client(&script);

    firebase.get("a");
    firebase.open_stream("one");
    firebase.close_stream();
    firebase.open_stream("two");

    let script = script.borrow();
    assert_eq!(script.created, 2);
    assert_eq!(script.stream_calls.len(), 2);
    assert_eq!(script.stream_calls[1].path, "two");
}

#[test]
fn test_stream_status_error() {
    let script = script();
    script
        .borrow_mut()
        .stream_responses
        .push_back(Ok(response(401, r#"{"error":"Permission denied"}"#)));
    let mut firebase = client(&script);

    firebase.open_stream("private");

    assert_eq!(firebase.error().code(), ErrorCode::Status(401));
    assert_eq!(firebase.last_error(), "Permission denied");
    assert!(!firebase.has_event());
    assert_eq!(firebase.error().code(), ErrorCode::ConnectionLost);
}

#[test]
fn test_failed_mirrors_succeeded() {
    let script = script();
    script
        .borrow_mut()
        .responses
        .push_back(Err(Error::Timeout));
    let mut firebase = client(&script);

    for _ in 0..3 {
        firebase.get("a");
        assert_eq!(firebase.failed(), !firebase.succeeded());
    }
    assert!(!firebase.has_event());
    assert_eq!(firebase.failed(), !firebase.succeeded());
}
