use agent_logging::{agent_debug, agent_info, agent_warn};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;

use crate::agui::{parse_event, FeedTracker, SseDecoder};
use crate::{BridgeEvent, ClientConfig, FeedSource, RunError, RunRequest};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: BridgeEvent);
}

pub struct ChannelEventSink {
    tx: std::sync::mpsc::Sender<BridgeEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: std::sync::mpsc::Sender<BridgeEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: BridgeEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait RunClient: Send + Sync {
    /// Starts a run and streams its feed into `sink` until the agent closes
    /// the stream.
    async fn run(&self, request: &RunRequest, sink: &dyn EventSink) -> Result<(), RunError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRunClient {
    config: ClientConfig,
}

impl ReqwestRunClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> Result<reqwest::Client, RunError> {
        reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .build()
            .map_err(|err| RunError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl RunClient for ReqwestRunClient {
    async fn run(&self, request: &RunRequest, sink: &dyn EventSink) -> Result<(), RunError> {
        let url = self.config.run_url();
        let parsed =
            reqwest::Url::parse(&url).map_err(|err| RunError::InvalidUrl(err.to_string()))?;
        let client = self.build_client()?;

        agent_info!(
            "starting run {} on {} with {} messages",
            request.run_id,
            url,
            request.messages.len()
        );
        let response = client
            .post(parsed)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunError::HttpStatus(status.as_u16()));
        }

        let mut tracker = FeedTracker::with_state(FeedSource::Live, request.state.clone());
        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    // Whatever arrived so far stays applied; the run is over.
                    emit_all(sink, tracker.close());
                    return Err(map_reqwest_error(err));
                }
            };
            for payload in decoder.feed(&chunk) {
                forward(&mut tracker, &payload, sink);
            }
        }
        if let Some(payload) = decoder.finish() {
            forward(&mut tracker, &payload, sink);
        }
        emit_all(sink, tracker.close());
        agent_debug!("run {} stream closed", request.run_id);
        Ok(())
    }
}

/// Parses one payload and forwards the resulting feed events.
pub(crate) fn forward(tracker: &mut FeedTracker, payload: &str, sink: &dyn EventSink) {
    match parse_event(payload) {
        Ok(event) => emit_all(sink, tracker.apply(event)),
        Err(err) => agent_warn!("skipping malformed agent event: {}", err),
    }
}

fn emit_all(sink: &dyn EventSink, events: Vec<crate::FeedEvent>) {
    for event in events {
        sink.emit(BridgeEvent::Feed(event));
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RunError {
    if err.is_timeout() {
        return RunError::Timeout;
    }
    RunError::Network(err.to_string())
}
