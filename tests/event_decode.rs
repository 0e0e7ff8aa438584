use serde_json::{json, Value};
use signalbus::kernel::event::{
    CharEvent, ComputerCommandEvent, DiskEvent, HttpEvent, KeyEvent, LogEvent, LogLevel,
    MetricCollectEvent, MetricEvent, MetricRegisterEvent, MetricResponseEvent,
    MetricUnregisterEvent, ModemMessageEvent, MouseEvent, MouseKind, PasteEvent, PeripheralEvent,
    RednetMessageEvent, RedstoneEvent, ResizeEvent, SpeakerAudioEmptyEvent, TaskCompleteEvent,
    TaskOutcome, TerminateEvent, TimerEvent, TurtleInventoryEvent, WebSocketCloseEvent,
    WebSocketConnectEvent, WebSocketMessageEvent,
};
use signalbus::kernel::telemetry::MetricsData;
use signalbus::{Event, Registry};

fn registry() -> Registry {
    Registry::standard().expect("built-in variants must not collide")
}

fn roundtrip(event: Event) {
    let registry = registry();
    let tuple = event.to_tuple();
    let decoded = registry.decode(&tuple).expect("canonical tuple must decode");
    assert_eq!(decoded, event, "round trip changed {tuple:?}");
}

#[test]
fn test_roundtrip_input_events() {
    roundtrip(CharEvent { character: "a".into() }.into());
    roundtrip(KeyEvent { key: 65, is_held: true, is_up: false }.into());
    roundtrip(KeyEvent { key: 65, is_held: false, is_up: true }.into());
    roundtrip(
        MouseEvent { kind: MouseKind::Scroll, button: -1, side: None, x: 3, y: 4 }.into(),
    );
    roundtrip(
        MouseEvent {
            kind: MouseKind::Touch,
            button: 0,
            side: Some("left".into()),
            x: 1,
            y: 2,
        }
        .into(),
    );
    roundtrip(ResizeEvent { side: None }.into());
    roundtrip(ResizeEvent { side: Some("top".into()) }.into());
    roundtrip(ComputerCommandEvent { args: vec!["ls".into(), "-l".into()] }.into());
    roundtrip(PasteEvent { text: "hello world".into() }.into());
}

#[test]
fn test_roundtrip_system_events() {
    roundtrip(TimerEvent::timer(7).into());
    roundtrip(TimerEvent { id: 8, is_alarm: true }.into());
    roundtrip(DiskEvent { side: "bottom".into(), eject: true }.into());
    roundtrip(
        TaskCompleteEvent {
            id: 3,
            outcome: TaskOutcome::Success { params: vec![json!("ok"), json!(5)] },
        }
        .into(),
    );
    roundtrip(
        TaskCompleteEvent { id: 4, outcome: TaskOutcome::Failure { error: "boom".into() } }.into(),
    );
    roundtrip(LogEvent::new(LogLevel::Warning, "disk almost full").into());
    roundtrip(RedstoneEvent.into());
    roundtrip(TerminateEvent.into());
    roundtrip(TurtleInventoryEvent.into());
    roundtrip(PeripheralEvent { side: "left".into(), detach: false }.into());
    roundtrip(PeripheralEvent { side: "left".into(), detach: true }.into());
    roundtrip(SpeakerAudioEmptyEvent { side: "right".into() }.into());
}

#[test]
fn test_roundtrip_network_and_metric_events() {
    roundtrip(
        ModemMessageEvent {
            side: "back".into(),
            channel: 1,
            reply_channel: 2,
            message: json!({"k": [1, 2]}),
            distance: 12.5,
        }
        .into(),
    );
    roundtrip(
        HttpEvent { url: "http://x".into(), handle: None, error: Some("timeout".into()) }.into(),
    );
    roundtrip(
        WebSocketCloseEvent {
            url: "ws://x".into(),
            reason: Some("bye".into()),
            code: Some(1000),
        }
        .into(),
    );
    roundtrip(MetricCollectEvent { request_id: 1, collection_time_unix_nano: 1_000_000 }.into());
    roundtrip(MetricRegisterEvent { publisher_id: "p1".into() }.into());
    roundtrip(MetricUnregisterEvent { publisher_id: "p1".into() }.into());
    roundtrip(
        MetricResponseEvent {
            request_id: 1,
            publisher_id: "p1".into(),
            resource_metrics: vec![json!({"resource": {}})],
        }
        .into(),
    );
    roundtrip(
        MetricEvent { data: MetricsData { resource_metrics: vec![json!(1), json!(2)] } }.into(),
    );
}

#[test]
fn test_roundtrip_optional_network_arguments() {
    // 1. Rednet with and without a protocol
    roundtrip(
        RednetMessageEvent {
            sender: 12,
            message: json!({"cmd": "ping"}),
            protocol: Some("chat".into()),
        }
        .into(),
    );
    roundtrip(
        RednetMessageEvent { sender: 12, message: json!("hello"), protocol: None }.into(),
    );

    // 2. HTTP success keeps its handle
    roundtrip(
        HttpEvent { url: "http://x".into(), handle: Some(json!({"id": 4})), error: None }.into(),
    );

    // 3. Websocket message, text and binary
    roundtrip(
        WebSocketMessageEvent {
            url: "ws://x".into(),
            content: "frame".into(),
            is_binary: false,
        }
        .into(),
    );
    roundtrip(
        WebSocketMessageEvent {
            url: "ws://x".into(),
            content: "\u{1}\u{2}".into(),
            is_binary: true,
        }
        .into(),
    );

    // 4. Websocket connect in both shapes
    roundtrip(WebSocketConnectEvent { handle: Some(json!({"id": 9})), error: None }.into());
    roundtrip(WebSocketConnectEvent { handle: None, error: Some("refused".into()) }.into());

    // 5. Close with a code but no reason keeps the gap
    roundtrip(
        WebSocketCloseEvent { url: "ws://x".into(), reason: None, code: Some(1006) }.into(),
    );
}

#[test]
fn test_websocket_close_distinguishes_empty_reason_from_absent() {
    let registry = registry();

    let event = registry.decode(&[json!("websocket_closed"), json!("ws://x"), json!("")]).unwrap();
    assert_eq!(
        event,
        Event::WebSocketClose(WebSocketCloseEvent {
            url: "ws://x".into(),
            reason: Some(String::new()),
            code: None,
        })
    );

    let event = registry.decode(&[json!("websocket_closed"), json!("ws://x")]).unwrap();
    assert_eq!(
        event,
        Event::WebSocketClose(WebSocketCloseEvent {
            url: "ws://x".into(),
            reason: None,
            code: None,
        })
    );
}

#[test]
fn test_unknown_discriminator_is_generic() {
    let registry = registry();
    let tuple = vec![json!("my_custom_event"), json!(1), json!("x")];

    let event = registry.decode(&tuple).unwrap();

    match &event {
        Event::Generic(generic) => {
            assert_eq!(generic.name(), "my_custom_event");
            assert_eq!(generic.args(), vec![json!(1), json!("x")]);
        }
        other => panic!("expected generic event, got {other:?}"),
    }
    assert_eq!(event.to_tuple(), tuple, "generic events re-encode verbatim");
}

#[test]
fn test_non_string_discriminator_is_generic() {
    let registry = registry();

    let event = registry.decode(&[json!(42)]).unwrap();
    assert!(matches!(event, Event::Generic(_)));

    let event = registry.decode(&[]).unwrap();
    assert!(matches!(event, Event::Generic(_)));
}

#[test]
fn test_wrong_payload_is_decode_mismatch() {
    let registry = registry();

    let err = registry.decode(&[json!("timer"), json!("not-a-number")]).unwrap_err();

    assert_eq!(err.discriminator, "timer");
    assert!(!err.issues.is_empty(), "mismatch must report at least one issue");
}

#[test]
fn test_missing_required_argument_is_decode_mismatch() {
    let registry = registry();

    let err = registry.decode(&[json!("metric_register")]).unwrap_err();

    assert_eq!(err.discriminator, "metric_register");
}

#[test]
fn test_key_held_defaults_to_false() {
    let registry = registry();

    let event = registry.decode(&[json!("key"), json!(30)]).unwrap();

    assert_eq!(event, Event::Key(KeyEvent { key: 30, is_held: false, is_up: false }));
}

#[test]
fn test_task_failure_without_message_reads_empty() {
    let registry = registry();

    let event = registry.decode(&[json!("task_complete"), json!(9), json!(false)]).unwrap();

    let Event::TaskComplete(task) = event else {
        panic!("expected task_complete");
    };
    assert!(!task.is_success());
    assert_eq!(task.outcome, TaskOutcome::Failure { error: String::new() });
}

#[test]
fn test_log_level_is_wire_index() {
    let registry = registry();

    let event = registry.decode(&[json!("log"), json!(3), json!("fatal")]).unwrap();
    let Event::Log(log) = event else {
        panic!("expected log");
    };
    assert_eq!(log.level, LogLevel::Error);

    let err = registry.decode(&[json!("log"), json!(4), json!("out of range")]).unwrap_err();
    assert_eq!(err.discriminator, "log");
}

#[test]
fn test_metric_payload_absent_reads_empty() {
    let registry = registry();

    let event = registry.decode(&[json!("metric")]).unwrap();

    assert_eq!(event, Event::Metric(MetricEvent::default()));
}

#[test]
fn test_to_tuple_drops_trailing_absent_slots() {
    let log = LogEvent::new(LogLevel::Info, "hello");

    let tuple = Event::from(log).to_tuple();

    assert_eq!(tuple, vec![json!("log"), json!(1), json!("hello")]);
    assert_eq!(tuple.last(), Some(&Value::from("hello")));
}

#[test]
fn test_extra_trailing_elements_are_tolerated() {
    let registry = registry();

    let event = registry.decode(&[json!("char"), json!("z"), json!("extra")]).unwrap();

    assert_eq!(event, Event::Char(CharEvent { character: "z".into() }));
}
