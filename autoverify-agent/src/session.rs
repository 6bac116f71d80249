//! Per-run context threaded through every stage.
//!
//! Nothing here is global: one `RunSession` owns the narration stream, the
//! cancellation token, and the pacing profile for exactly one run, so two
//! runs can never bleed state into each other. Cancellation is cooperative —
//! stages poll the token at defined suspension points and in-flight
//! primitives are never interrupted.

use crate::analyzer::DecisionAnalyzer;
use crate::provider::RegistryClient;
use autoverify::{Interactor, Narrator, Page, PageEngine, Pacing};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// External collaborators a workflow needs beyond the UI itself.
pub struct AgentServices {
    pub provider: Arc<dyn RegistryClient>,
    pub analyzer: DecisionAnalyzer,
}

pub struct RunSession {
    run_id: String,
    page: Page,
    interactor: Interactor,
    narrator: Narrator,
    pacing: Pacing,
    cancel: CancellationToken,
    stopped: AtomicBool,
}

impl RunSession {
    pub fn new(page: Page, pacing: Pacing) -> Self {
        let narrator = Narrator::new();
        let interactor = Interactor::new(page.engine(), narrator.clone(), pacing);
        Self {
            run_id: Uuid::new_v4().to_string(),
            page,
            interactor,
            narrator,
            pacing,
            cancel: CancellationToken::new(),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn engine(&self) -> Arc<dyn PageEngine> {
        self.page.engine()
    }

    pub fn interactor(&self) -> &Interactor {
        &self.interactor
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    /// Handle for requesting cancellation from outside the run.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fixed settle delay between workflow transitions, giving the UI's own
    /// asynchronous rendering time to catch up.
    pub async fn settle(&self) {
        tokio::time::sleep(self.pacing.settle).await;
    }

    /// Idempotent end-of-run signal for listening UI chrome.
    pub fn mark_stopped(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.narrator.result("Automation run stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
