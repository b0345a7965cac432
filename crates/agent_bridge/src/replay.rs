//! Offline feed: replays recorded AG-UI events from a JSON-lines file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use agent_logging::agent_info;
use thiserror::Error;

use crate::agui::{parse_event, AgUiEvent, FeedTracker};
use crate::run::EventSink;
use crate::{BridgeEvent, FeedSource};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Parses a recording. Blank lines and lines starting with `#` are skipped.
pub fn parse_recording(text: &str) -> Result<Vec<AgUiEvent>, ReplayError> {
    text.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, payload)| {
            parse_event(payload).map_err(|err| ReplayError::Parse {
                line,
                message: err.to_string(),
            })
        })
        .collect()
}

/// Replays a recording into `sink`, pausing `interval` between events.
pub async fn replay_file(
    path: &Path,
    interval: Duration,
    sink: &dyn EventSink,
) -> Result<(), ReplayError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let events = parse_recording(&text)?;
    agent_info!("replaying {} events from {}", events.len(), path.display());

    let mut tracker = FeedTracker::new(FeedSource::Replay);
    for (index, event) in events.into_iter().enumerate() {
        if index > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        for feed_event in tracker.apply(event) {
            sink.emit(BridgeEvent::Feed(feed_event));
        }
    }
    for feed_event in tracker.close() {
        sink.emit(BridgeEvent::Feed(feed_event));
    }
    Ok(())
}
