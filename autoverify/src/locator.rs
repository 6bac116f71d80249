use crate::engine::{PageEngine, UiElement};
use crate::errors::AutomationError;
use crate::resolve::Resolver;
use crate::selector::ElementQuery;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Binds an [`ElementQuery`] to an engine for one-shot or polled lookup.
pub struct Locator {
    engine: Arc<dyn PageEngine>,
    resolver: Resolver,
    query: ElementQuery,
    timeout: Duration,
}

impl Locator {
    pub fn new(engine: Arc<dyn PageEngine>, query: ElementQuery) -> Self {
        Self {
            engine,
            resolver: Resolver::standard(),
            query,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Single resolution attempt, no waiting.
    pub async fn first(&self) -> Result<Option<UiElement>, AutomationError> {
        self.resolver.resolve(&self.engine, &self.query).await
    }

    /// Poll until the element appears or the timeout expires.
    ///
    /// This is the only bounded wait in the automation layer; every other
    /// delay is a fixed pacing constant.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<UiElement, AutomationError> {
        let timeout = timeout.unwrap_or(self.timeout);
        let deadline = tokio::time::Instant::now() + timeout;
        debug!(target = %self.query.describe(), ?timeout, "waiting for element");
        loop {
            if let Some(element) = self.resolver.resolve(&self.engine, &self.query).await? {
                return Ok(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "element {} did not appear within {timeout:?}",
                    self.query.describe()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
