use std::path::PathBuf;
use std::time::Duration;

use agent_bridge::{ClientConfig, DEFAULT_ENDPOINT};
use clap::{Parser, ValueEnum};

use super::logging::LogDestination;

/// Terminal client for the document-processing agent.
#[derive(Parser, Debug)]
#[command(name = "agent-client", version)]
pub struct Args {
    /// Base URL of the agent backend.
    #[arg(long, env = "AGUI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Play back a recorded AG-UI session (one JSON event per line).
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Pause between replayed events.
    #[arg(long, default_value_t = 400)]
    pub replay_interval_ms: u64,

    #[arg(long, value_enum, default_value_t = LogChoice::File)]
    pub log: LogChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogChoice {
    Terminal,
    File,
    Both,
}

impl Args {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::with_endpoint(self.endpoint.clone())
    }

    pub fn replay_interval(&self) -> Duration {
        Duration::from_millis(self.replay_interval_ms)
    }
}

impl From<LogChoice> for LogDestination {
    fn from(choice: LogChoice) -> Self {
        match choice {
            LogChoice::Terminal => LogDestination::Terminal,
            LogChoice::File => LogDestination::File,
            LogChoice::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn replay_flags_parse() {
        let args = Args::try_parse_from([
            "agent-client",
            "--endpoint",
            "http://agent.local:9000",
            "--replay",
            "session.jsonl",
            "--replay-interval-ms",
            "50",
            "--log",
            "both",
        ])
        .unwrap();

        assert_eq!(args.client_config().run_url(), "http://agent.local:9000/agui");
        assert_eq!(args.replay, Some(PathBuf::from("session.jsonl")));
        assert_eq!(args.replay_interval(), Duration::from_millis(50));
        assert_eq!(args.log, LogChoice::Both);
    }

    #[test]
    fn unknown_log_destination_is_rejected() {
        assert!(Args::try_parse_from(["agent-client", "--log", "syslog"]).is_err());
    }
}
