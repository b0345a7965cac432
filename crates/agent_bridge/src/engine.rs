use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use agent_logging::{agent_debug, agent_error, agent_warn, current_turn, with_turn};
use tokio_util::sync::CancellationToken;

use crate::replay::replay_file;
use crate::run::{EventSink, ReqwestRunClient, RunClient};
use crate::upload::{ReqwestUploader, Uploader};
use crate::{BridgeEvent, ClientConfig, FeedEvent, RunRequest, TimerId};

enum BridgeCommand {
    StartRun(RunRequest),
    Upload { path: PathBuf },
    ScheduleTimer { timer_id: TimerId, delay: Duration },
    CancelTimer { timer_id: TimerId },
    Replay { path: PathBuf, interval: Duration },
}

/// Runs network work and timers on a background runtime and reports back
/// through an [`EventSink`].
///
/// Each command carries the sender's turn; work spawned for it logs under
/// that turn.
pub struct BridgeHandle {
    cmd_tx: mpsc::Sender<(u64, BridgeCommand)>,
}

impl BridgeHandle {
    pub fn new(config: ClientConfig, sink: Arc<dyn EventSink>) -> Self {
        let run_client = Arc::new(ReqwestRunClient::new(config.clone()));
        let uploader = Arc::new(ReqwestUploader::new(config));
        Self::with_clients(run_client, uploader, sink)
    }

    pub fn with_clients(
        run_client: Arc<dyn RunClient>,
        uploader: Arc<dyn Uploader>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    agent_error!("could not start bridge runtime: {}", err);
                    return;
                }
            };
            let mut timer: Option<(TimerId, CancellationToken)> = None;
            while let Ok((turn, command)) = cmd_rx.recv() {
                agent_logging::set_turn(turn);
                match command {
                    BridgeCommand::ScheduleTimer { timer_id, delay } => {
                        if let Some((previous, token)) = timer.take() {
                            agent_debug!("timer {} replaced by {}", previous, timer_id);
                            token.cancel();
                        }
                        let token = CancellationToken::new();
                        let sink = sink.clone();
                        let child = token.clone();
                        runtime.spawn(with_turn(turn, async move {
                            if child
                                .run_until_cancelled(tokio::time::sleep(delay))
                                .await
                                .is_some()
                            {
                                sink.emit(BridgeEvent::TimerElapsed { timer_id });
                            }
                        }));
                        timer = Some((timer_id, token));
                    }
                    BridgeCommand::CancelTimer { timer_id } => {
                        if let Some((pending, token)) = timer.take() {
                            if pending == timer_id {
                                token.cancel();
                            } else {
                                timer = Some((pending, token));
                            }
                        }
                    }
                    command => {
                        let run_client = run_client.clone();
                        let uploader = uploader.clone();
                        let sink = sink.clone();
                        runtime.spawn(with_turn(turn, async move {
                            handle_command(
                                run_client.as_ref(),
                                uploader.as_ref(),
                                command,
                                sink.as_ref(),
                            )
                            .await;
                        }));
                    }
                }
            }
        });

        Self { cmd_tx }
    }

    pub fn start_run(&self, request: RunRequest) {
        self.send(BridgeCommand::StartRun(request));
    }

    pub fn upload(&self, path: impl Into<PathBuf>) {
        self.send(BridgeCommand::Upload { path: path.into() });
    }

    /// Schedules `timer_id`; a timer still pending is cancelled first.
    pub fn schedule_timer(&self, timer_id: TimerId, delay: Duration) {
        self.send(BridgeCommand::ScheduleTimer { timer_id, delay });
    }

    pub fn cancel_timer(&self, timer_id: TimerId) {
        self.send(BridgeCommand::CancelTimer { timer_id });
    }

    pub fn replay(&self, path: impl Into<PathBuf>, interval: Duration) {
        self.send(BridgeCommand::Replay {
            path: path.into(),
            interval,
        });
    }

    fn send(&self, command: BridgeCommand) {
        if self.cmd_tx.send((current_turn(), command)).is_err() {
            agent_warn!("bridge thread is gone; command dropped");
        }
    }
}

async fn handle_command(
    run_client: &dyn RunClient,
    uploader: &dyn Uploader,
    command: BridgeCommand,
    sink: &dyn EventSink,
) {
    match command {
        BridgeCommand::StartRun(request) => {
            if let Err(err) = run_client.run(&request, sink).await {
                agent_warn!("run {} failed: {}", request.run_id, err);
                sink.emit(BridgeEvent::RunFailed(err));
            }
        }
        BridgeCommand::Upload { path } => {
            let result = uploader.upload(&path).await;
            sink.emit(BridgeEvent::UploadCompleted(result));
        }
        BridgeCommand::Replay { path, interval } => {
            if let Err(err) = replay_file(&path, interval, sink).await {
                agent_warn!("replay of {} failed: {}", path.display(), err);
                sink.emit(BridgeEvent::Feed(FeedEvent::RunError {
                    message: err.to_string(),
                }));
            }
        }
        BridgeCommand::ScheduleTimer { .. } | BridgeCommand::CancelTimer { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RunError, UploadError, UploadRecord};
    use std::path::Path;

    struct SilentRunClient;

    #[async_trait::async_trait]
    impl RunClient for SilentRunClient {
        async fn run(&self, _request: &RunRequest, _sink: &dyn EventSink) -> Result<(), RunError> {
            Err(RunError::HttpStatus(503))
        }
    }

    struct NoUploads;

    #[async_trait::async_trait]
    impl Uploader for NoUploads {
        async fn upload(&self, _path: &Path) -> Result<UploadRecord, UploadError> {
            Err(UploadError::Timeout)
        }
    }

    struct TurnEchoRunClient;

    #[async_trait::async_trait]
    impl RunClient for TurnEchoRunClient {
        async fn run(&self, _request: &RunRequest, _sink: &dyn EventSink) -> Result<(), RunError> {
            tokio::task::yield_now().await;
            Err(RunError::Network(format!(
                "turn {}",
                agent_logging::current_turn()
            )))
        }
    }

    fn handle() -> (BridgeHandle, mpsc::Receiver<BridgeEvent>) {
        let (tx, rx) = mpsc::channel();
        let sink = Arc::new(crate::run::ChannelEventSink::new(tx));
        (
            BridgeHandle::with_clients(Arc::new(SilentRunClient), Arc::new(NoUploads), sink),
            rx,
        )
    }

    #[test]
    fn scheduled_timer_fires_once() {
        let (bridge, rx) = handle();
        bridge.schedule_timer(1, Duration::from_millis(10));
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event, BridgeEvent::TimerElapsed { timer_id: 1 });
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn rescheduling_cancels_the_pending_timer() {
        let (bridge, rx) = handle();
        bridge.schedule_timer(1, Duration::from_millis(200));
        bridge.schedule_timer(2, Duration::from_millis(20));
        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(event, BridgeEvent::TimerElapsed { timer_id: 2 });
        assert!(rx.recv_timeout(Duration::from_millis(400)).is_err());
    }

    #[test]
    fn cancelled_timer_stays_silent() {
        let (bridge, rx) = handle();
        bridge.schedule_timer(4, Duration::from_millis(50));
        bridge.cancel_timer(4);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn failed_run_and_upload_are_reported() {
        let (bridge, rx) = handle();
        bridge.start_run(RunRequest::new("thread", "run-1"));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            BridgeEvent::RunFailed(RunError::HttpStatus(503))
        );
        bridge.upload("scan.png");
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            BridgeEvent::UploadCompleted(Err(UploadError::Timeout))
        );
    }

    #[test]
    fn spawned_work_runs_under_the_sender_turn() {
        let (tx, rx) = mpsc::channel();
        let sink = Arc::new(crate::run::ChannelEventSink::new(tx));
        let bridge =
            BridgeHandle::with_clients(Arc::new(TurnEchoRunClient), Arc::new(NoUploads), sink);

        agent_logging::set_turn(5);
        bridge.start_run(RunRequest::new("thread", "run-5"));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            BridgeEvent::RunFailed(RunError::Network("turn 5".to_string()))
        );
    }
}
