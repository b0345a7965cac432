use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_bridge::{
    parse_recording, replay_file, AgUiEvent, BridgeEvent, EventSink, FeedEvent, ReplayError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<BridgeEvent>>>,
}

impl EventSink for TestSink {
    fn emit(&self, event: BridgeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

const RECORDING: &str = r#"
# summarize a short note
{"type":"RUN_STARTED"}
{"type":"STEP_STARTED","stepName":"counter"}
{"type":"STATE_SNAPSHOT","snapshot":{"final_count":{"word_count":12}}}
{"type":"RUN_FINISHED"}
"#;

#[test]
fn recording_skips_comments_and_blank_lines() {
    let events = parse_recording(RECORDING).unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[1],
        AgUiEvent::StepStarted {
            step_name: "counter".to_string()
        }
    );
}

#[test]
fn parse_errors_name_the_line() {
    let err = parse_recording("{\"type\":\"RUN_STARTED\"}\n\n{oops").unwrap_err();
    assert!(matches!(err, ReplayError::Parse { line: 3, .. }));
}

#[tokio::test]
async fn replay_emits_the_recorded_feed() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("session.jsonl");
    std::fs::write(&file, RECORDING).unwrap();

    let sink = TestSink::default();
    replay_file(&file, Duration::ZERO, &sink).await.unwrap();

    let events = sink.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            BridgeEvent::Feed(FeedEvent::RunStatus {
                running: true,
                active_node: None
            }),
            BridgeEvent::Feed(FeedEvent::RunStatus {
                running: true,
                active_node: Some("counter".to_string())
            }),
            BridgeEvent::Feed(FeedEvent::Snapshot(
                json!({"final_count": {"word_count": 12}})
            )),
            BridgeEvent::Feed(FeedEvent::RunStatus {
                running: false,
                active_node: None
            }),
        ]
    );
}

#[tokio::test]
async fn missing_recording_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let sink = TestSink::default();
    let err = replay_file(&dir.path().join("none.jsonl"), Duration::ZERO, &sink)
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::Io { .. }));
}
