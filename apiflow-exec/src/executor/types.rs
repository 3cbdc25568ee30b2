use std::sync::Arc;
use std::time::Duration;

use crate::endpoints::EndpointRegistry;
use crate::executor::events::{EventSink, NoOpEventSink};
use crate::executor::http::HttpClient;

pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Used when neither the step nor the session `config.timeoutMs` sets a timeout.
    pub default_step_timeout: Duration,
    pub max_response_bytes: usize,
    pub follow_redirects: bool,
    pub user_agent: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            default_step_timeout: DEFAULT_STEP_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            follow_redirects: false,
            user_agent: concat!("apiflow/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Collaborators handed to the orchestrator; nothing here is process-global.
#[derive(Clone)]
pub struct ExecutorContext {
    pub http: Arc<dyn HttpClient>,
    pub endpoints: Arc<EndpointRegistry>,
    pub config: ExecutorConfig,
    pub events: Arc<dyn EventSink>,
}

impl ExecutorContext {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            endpoints: Arc::new(EndpointRegistry::default()),
            config: ExecutorConfig::default(),
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_endpoints(mut self, endpoints: EndpointRegistry) -> Self {
        self.endpoints = Arc::new(endpoints);
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }
}
