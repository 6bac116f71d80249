#![allow(dead_code)]

use async_trait::async_trait;
use autoverify::sim::SimPage;
use autoverify::{Page, PageEngine, Pacing};
use autoverify_agent::analyzer::DecisionAnalyzer;
use autoverify_agent::demo::demo_dashboard;
use autoverify_agent::llm::ReasoningModel;
use autoverify_agent::provider::{ProviderResult, RegistryClient};
use autoverify_agent::session::{AgentServices, RunSession};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Demo dashboard plus a zero-pacing session over it.
pub fn dashboard_session() -> (Arc<SimPage>, RunSession) {
    let page = demo_dashboard();
    let engine: Arc<dyn PageEngine> = page.clone();
    (page, RunSession::new(Page::new(engine), Pacing::instant()))
}

/// Registry client with programmed responses and call counters.
pub struct CannedRegistry {
    npi: Option<ProviderResult>,
    license: Option<ProviderResult>,
    pub npi_calls: AtomicUsize,
    pub license_calls: AtomicUsize,
}

impl CannedRegistry {
    pub fn empty() -> Self {
        Self {
            npi: None,
            license: None,
            npi_calls: AtomicUsize::new(0),
            license_calls: AtomicUsize::new(0),
        }
    }

    pub fn npi(result: ProviderResult) -> Self {
        Self {
            npi: Some(result),
            ..Self::empty()
        }
    }

    pub fn license(result: ProviderResult) -> Self {
        Self {
            license: Some(result),
            ..Self::empty()
        }
    }
}

#[async_trait]
impl RegistryClient for CannedRegistry {
    async fn npi_lookup(&self, _npi: &str) -> ProviderResult {
        self.npi_calls.fetch_add(1, Ordering::SeqCst);
        self.npi.clone().unwrap_or(ProviderResult::Error {
            message: "no canned NPI response".to_string(),
        })
    }

    async fn license_lookup(&self, _number: &str, _state: Option<&str>) -> ProviderResult {
        self.license_calls.fetch_add(1, Ordering::SeqCst);
        self.license.clone().unwrap_or(ProviderResult::Error {
            message: "no canned license response".to_string(),
        })
    }
}

enum ScriptedReply {
    Json(Value),
    Fail(String),
}

/// Reasoning model with queued replies; records every user prompt it sees.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(value: Value) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([ScriptedReply::Json(value)])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([ScriptedReply::Fail(message.to_string())])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningModel for ScriptedModel {
    async fn complete_json(&self, _system: &str, user: &str) -> anyhow::Result<Value> {
        self.prompts.lock().unwrap().push(user.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Json(value)) => Ok(value),
            Some(ScriptedReply::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("scripted model exhausted")),
        }
    }
}

pub fn decision_json(decision: &str, reasoning: &str) -> Value {
    json!({
        "decision": decision,
        "reasoning": reasoning,
        "issues_found": [],
        "recommendations": [],
    })
}

/// Bundle canned collaborators into services, keeping handles for asserts.
pub fn services_with(
    registry: CannedRegistry,
    model: ScriptedModel,
) -> (Arc<CannedRegistry>, Arc<ScriptedModel>, AgentServices) {
    let registry = Arc::new(registry);
    let model = Arc::new(model);
    let services = AgentServices {
        provider: registry.clone(),
        analyzer: DecisionAnalyzer::new(model.clone()),
    };
    (registry, model, services)
}
