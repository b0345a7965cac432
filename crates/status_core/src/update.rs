use agent_logging::{agent_debug, agent_warn};

use crate::{upload, AppState, Effect, Msg, Role};

const BUSY_NOTICE: &str = "The agent is still working; send again once it finishes";
const ATTACHED_NOTICE: &str = "File attached; it will be sent with your next message";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::ChatSubmitted { at } => {
            if state.input().trim().is_empty() {
                state.take_input();
                return (state, Vec::new());
            }
            // The input is kept so the user can resend it after the run.
            if state.is_running() {
                agent_debug!("chat submit held back: run in progress");
                state.set_notice(BUSY_NOTICE);
                return (state, Vec::new());
            }
            let text = state.take_input();
            let text = text.trim();
            state.push_message(Role::User, text.to_string());
            state.begin_turn(at)
        }
        Msg::UploadRequested { path } => {
            if state.start_upload() {
                vec![Effect::StartUpload { path }]
            } else {
                agent_warn!("upload of {:?} rejected: another upload is in flight", path);
                Vec::new()
            }
        }
        Msg::UploadFinished { result, at } => match result {
            Ok(envelope) => {
                agent_debug!(
                    "upload {} finished ({} bytes)",
                    envelope.file_id,
                    envelope.size_bytes
                );
                state.finish_upload(None);
                state.push_message(Role::User, upload::encode(&envelope));
                if state.is_running() {
                    state.set_notice(ATTACHED_NOTICE);
                    Vec::new()
                } else {
                    state.begin_turn(at)
                }
            }
            Err(failure) => {
                agent_warn!("upload failed: {}", failure);
                state.finish_upload(Some(failure.to_string()));
                Vec::new()
            }
        },
        Msg::SnapshotReceived { snapshot, at } => state.apply_snapshot(snapshot, at),
        Msg::RunStatusChanged {
            running,
            active_node,
            at,
        } => state.apply_run_status(running, active_node, at),
        Msg::StatusTimerFired { timer_id, at } => {
            state.fire_status_timer(timer_id, at);
            Vec::new()
        }
        Msg::AssistantText { message_id, delta } => {
            state.append_assistant_text(message_id, &delta);
            Vec::new()
        }
        Msg::RunFailed { message, at } => state.apply_run_failure(message, at),
    };

    (state, effects)
}
