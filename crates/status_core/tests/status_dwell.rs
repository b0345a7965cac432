use std::sync::Once;
use std::time::{Duration, Instant};

use serde_json::json;
use status_core::{update, AgentSnapshot, AppState, Effect, Msg, MIN_DWELL};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn snapshot(raw: serde_json::Value, at: Instant) -> Msg {
    Msg::SnapshotReceived {
        snapshot: AgentSnapshot::from_value(raw),
        at,
    }
}

fn run_status(running: bool, node: Option<&str>, at: Instant) -> Msg {
    Msg::RunStatusChanged {
        running,
        active_node: node.map(ToOwned::to_owned),
        at,
    }
}

fn scheduled(effects: &[Effect]) -> Vec<u64> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::ScheduleStatusTimer { timer_id, .. } => Some(*timer_id),
            _ => None,
        })
        .collect()
}

#[test]
fn first_label_commits_immediately() {
    init_logging();
    let t0 = Instant::now();
    let (state, effects) = update(AppState::new(), run_status(true, None, t0));

    assert_eq!(state.view().status, "Thinking");
    assert!(effects.is_empty());
}

#[test]
fn change_inside_dwell_window_waits_for_timer() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, None, t0));

    let (state, effects) = update(state, run_status(true, Some("summarizer"), t0 + ms(100)));
    assert_eq!(state.view().status, "Thinking");
    assert_eq!(
        effects,
        vec![Effect::ScheduleStatusTimer {
            timer_id: 1,
            delay: ms(500)
        }]
    );

    let (state, effects) = update(
        state,
        Msg::StatusTimerFired {
            timer_id: 1,
            at: t0 + MIN_DWELL,
        },
    );
    assert_eq!(state.view().status, "Summarizing");
    assert!(effects.is_empty());
}

#[test]
fn label_never_changes_before_dwell_elapses() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, Some("summarizer"), t0));
    assert_eq!(state.view().status, "Summarizing");

    let (state, _) = update(state, run_status(true, Some("counter"), t0 + ms(599)));
    assert_eq!(state.view().status, "Summarizing");

    // A later snapshot after the window commits straight away.
    let (state, effects) = update(state, run_status(true, Some("counter"), t0 + ms(700)));
    assert_eq!(state.view().status, "Counting");
    assert_eq!(effects, vec![Effect::CancelStatusTimer { timer_id: 1 }]);
}

#[test]
fn burst_of_snapshots_collapses_to_one_commit_of_the_last() {
    init_logging();
    let t0 = Instant::now();
    let (mut state, _) = update(AppState::new(), run_status(true, None, t0));
    assert_eq!(state.view().status, "Thinking");

    let mut all_scheduled = Vec::new();
    for i in 0..10u64 {
        let at = t0 + ms(10 + i * 50);
        let (next, effects) = update(state, snapshot(json!({"llm_status": format!("step {i}")}), at));
        assert_eq!(next.view().status, "Thinking");
        all_scheduled.extend(scheduled(&effects));
        state = next;
    }
    assert_eq!(all_scheduled.len(), 10);
    let last_timer = *all_scheduled.last().unwrap();

    // Superseded timers are ignored even if they slip through.
    for stale in &all_scheduled[..9] {
        let (next, _) = update(
            state,
            Msg::StatusTimerFired {
                timer_id: *stale,
                at: t0 + MIN_DWELL,
            },
        );
        assert_eq!(next.view().status, "Thinking");
        state = next;
    }

    let (state, _) = update(
        state,
        Msg::StatusTimerFired {
            timer_id: last_timer,
            at: t0 + MIN_DWELL,
        },
    );
    assert_eq!(state.view().status, "step 9");
}

#[test]
fn timer_commits_latest_inputs_at_fire_time() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, Some("summarizer"), t0));
    let (state, effects) = update(state, run_status(true, Some("counter"), t0 + ms(100)));
    let timer_id = scheduled(&effects)[0];
    let (state, _) = update(
        state,
        snapshot(json!({"final_count": {"word_count": 12}}), t0 + ms(200)),
    );
    assert_eq!(state.view().status, "Summarizing");
    assert_eq!(state.view().word_count, Some(12));

    // The snapshot rescheduled; fire the newest timer.
    let (state, _) = update(
        state,
        Msg::StatusTimerFired {
            timer_id: timer_id + 1,
            at: t0 + MIN_DWELL,
        },
    );
    assert_eq!(state.view().status, "Counting");
}

#[test]
fn run_finishing_with_count_shows_completed() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, Some("counter"), t0));
    let (state, _) = update(
        state,
        snapshot(json!({"final_count": {"word_count": 12}}), t0 + ms(700)),
    );
    let (state, _) = update(state, run_status(false, None, t0 + ms(1400)));

    let view = state.view();
    assert_eq!(view.status, "Completed");
    assert_eq!(view.word_count, Some(12));
    assert!(!view.running);
}

#[test]
fn cleared_agent_phrase_falls_back_to_derived_label() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, Some("translate"), t0));
    let (state, _) = update(state, snapshot(json!({"llm_status": "Verifying"}), t0 + ms(700)));
    assert_eq!(state.view().status, "Verifying");

    let (state, _) = update(state, snapshot(json!({"llm_status": ""}), t0 + ms(1400)));
    assert_eq!(state.view().status, "Translating");
}

#[test]
fn out_of_order_snapshots_are_last_write_wins() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(
        AppState::new(),
        snapshot(json!({"summary_data": "newer", "final_count": 5}), t0),
    );
    let (state, _) = update(state, snapshot(json!({"summary_data": "older"}), t0 + ms(10)));

    let view = state.view();
    assert_eq!(view.summary.as_deref(), Some("older"));
    assert_eq!(view.word_count, None);
}

#[test]
fn run_failure_stops_run_and_surfaces_error() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, Some("summarizer"), t0));
    let (state, _) = update(
        state,
        Msg::RunFailed {
            message: "agent unreachable".to_string(),
            at: t0 + ms(800),
        },
    );

    let view = state.view();
    assert!(!view.running);
    assert_eq!(view.status, "Idle");
    assert_eq!(view.errors, vec!["agent unreachable".to_string()]);
}

#[test]
fn unrelated_snapshot_does_not_extend_a_settled_label() {
    init_logging();
    let t0 = Instant::now();
    let (state, _) = update(AppState::new(), run_status(true, None, t0));
    let (state, effects) = update(
        state,
        snapshot(json!({"summary_data": {"summary": "draft"}}), t0 + ms(650)),
    );
    assert!(effects.is_empty());

    let (state, effects) = update(state, run_status(true, Some("summarizer"), t0 + ms(700)));
    assert_eq!(state.view().status, "Summarizing");
    assert!(scheduled(&effects).is_empty());
}
