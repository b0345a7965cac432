use std::time::Duration;

/// Default agent backend, matching the backend's development server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8001";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the agent backend.
    pub endpoint: String,
    pub run_path: String,
    pub upload_path: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for uploads. Runs stream for as long as the agent
    /// works and only get the connect timeout.
    pub upload_timeout: Duration,
    pub thread_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            run_path: "/agui".to_string(),
            upload_path: "/upload".to_string(),
            connect_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(60),
            thread_id: format!("agent-client-{}", std::process::id()),
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn run_url(&self) -> String {
        join_url(&self.endpoint, &self.run_path)
    }

    pub fn upload_url(&self) -> String {
        join_url(&self.endpoint, &self.upload_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let config = ClientConfig::with_endpoint("http://localhost:9000/");
        assert_eq!(config.run_url(), "http://localhost:9000/agui");
        assert_eq!(config.upload_url(), "http://localhost:9000/upload");
    }
}
