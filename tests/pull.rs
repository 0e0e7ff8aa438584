use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use signalbus::kernel::event::{CharEvent, KeyEvent, PasteEvent, TimerEvent};
use signalbus::{Bus, Event, PullError, Pulled, Registry};

fn bus() -> Bus {
    Bus::new(Arc::new(Registry::standard().unwrap()))
}

#[tokio::test]
async fn test_pull_raw_filters_by_discriminator() {
    let bus = bus();
    let mut puller = bus.subscribe();

    bus.emit("char", [json!("a")]);
    bus.emit("paste", [json!("hello")]);

    let event = puller.pull_raw(Some(&["paste"])).await.unwrap();
    assert_eq!(event, Event::Paste(PasteEvent { text: "hello".into() }));
}

#[tokio::test]
async fn test_pull_raw_without_filter_takes_anything() {
    let bus = bus();
    let mut puller = bus.subscribe();

    bus.emit("something_custom", [json!(1)]);

    let event = puller.pull_raw(None).await.unwrap();
    assert_eq!(event.name(), "something_custom");
}

#[tokio::test]
async fn test_terminate_passes_every_filter() {
    let bus = bus();
    let mut puller = bus.subscribe();

    bus.terminate();

    let event = puller.pull_raw(Some(&["char"])).await.unwrap();
    assert!(event.is_terminate(), "terminate must never be filtered out");

    bus.terminate();
    let pulled = puller.pull_as::<CharEvent>().await.unwrap();
    assert!(matches!(pulled, Pulled::Other(Event::Terminate(_))));
}

#[tokio::test]
async fn test_pull_as_matches_variant() {
    let bus = bus();
    let mut puller = bus.subscribe();

    bus.emit("char", [json!("x")]);
    bus.emit("key_up", [json!(12)]);

    let pulled = puller.pull_as::<KeyEvent>().await.unwrap();
    assert_eq!(pulled.matched(), Some(KeyEvent { key: 12, is_held: false, is_up: true }));
}

#[tokio::test]
async fn test_reject_list_is_retried_and_others_returned() {
    let bus = bus();
    let mut puller = bus.subscribe();
    let filter: &[&str] = &["char", "key", "paste"];

    bus.emit("char", [json!("a")]);
    bus.emit("key", [json!(5)]);
    bus.emit("paste", [json!("p")]);

    // 1. `char` is rejected silently, `key` comes back as a non-match
    let pulled = puller.pull_as_with::<PasteEvent>(Some(filter), &["char"]).await.unwrap();
    assert!(!pulled.is_match());
    assert!(matches!(pulled, Pulled::Other(Event::Key(_))));

    // 2. The next pull finds the paste
    let pulled = puller.pull_as_with::<PasteEvent>(Some(filter), &["char"]).await.unwrap();
    assert_eq!(pulled, Pulled::Matched(PasteEvent { text: "p".into() }));
}

#[tokio::test]
async fn test_decode_mismatch_is_surfaced() {
    let bus = bus();
    let mut puller = bus.subscribe();

    bus.emit("timer", [json!("soon")]);

    let err = puller.pull_raw(None).await.unwrap_err();
    assert_eq!(err.as_label(), "decode_mismatch");
    let PullError::Decode(decode) = err else {
        panic!("expected a decode error");
    };
    assert_eq!(decode.discriminator, "timer");
}

#[tokio::test]
async fn test_closed_bus_ends_pull() {
    let bus = bus();
    let mut puller = bus.subscribe();
    drop(bus);

    let err = puller.pull_raw(None).await.unwrap_err();
    assert_eq!(err, PullError::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_timer_signal_carries_its_id() {
    let bus = bus();
    let mut puller = bus.subscribe();

    let first = bus.start_timer(Duration::from_millis(200));
    let second = bus.start_timer(Duration::from_millis(100));
    assert_ne!(first, second);

    let pulled = puller.pull_as::<TimerEvent>().await.unwrap();
    assert_eq!(pulled.matched(), Some(TimerEvent::timer(second)), "shorter timer fires first");

    let pulled = puller.pull_as::<TimerEvent>().await.unwrap();
    assert_eq!(pulled.matched(), Some(TimerEvent::timer(first)));
}

#[tokio::test]
async fn test_backlog_is_delivered_in_order() {
    let bus = bus();
    let mut puller = bus.subscribe();

    // 1. Nobody pulls while a large burst is emitted
    for i in 0..10_000 {
        bus.emit("chatter", [json!(i)]);
    }
    bus.emit("paste", [json!("last")]);

    // 2. Every signal is still there, oldest first
    for i in 0..10_000 {
        let event = puller.pull_raw(None).await.unwrap();
        assert_eq!(event.args(), vec![json!(i)], "signal {i} skipped or reordered");
    }
    let event = puller.pull_raw(Some(&["paste"])).await.unwrap();
    assert_eq!(event, Event::Paste(PasteEvent { text: "last".into() }));
}

#[tokio::test]
async fn test_every_subscriber_sees_every_signal() {
    let bus = bus();
    let mut fast = bus.subscribe();
    let mut slow = bus.subscribe();

    bus.emit("char", [json!("a")]);
    bus.emit("char", [json!("b")]);

    for puller in [&mut fast, &mut slow] {
        let first = puller.pull_as::<CharEvent>().await.unwrap().matched().unwrap();
        let second = puller.pull_as::<CharEvent>().await.unwrap().matched().unwrap();
        assert_eq!((first.character.as_str(), second.character.as_str()), ("a", "b"));
    }
}

#[tokio::test]
async fn test_dropped_puller_does_not_block_others() {
    let bus = bus();
    let gone = bus.subscribe();
    let mut live = bus.subscribe();
    drop(gone);

    bus.emit("char", [json!("x")]);

    let pulled = live.pull_as::<CharEvent>().await.unwrap();
    assert_eq!(pulled.matched(), Some(CharEvent { character: "x".into() }));
}
