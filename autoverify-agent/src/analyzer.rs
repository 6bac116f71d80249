//! AI decision step.
//!
//! The analyzer always produces a [`VerificationDecision`]; no failure of
//! the reasoning call, and no absence of input, is ever allowed to reach the
//! caller as an error. Deterministic fallbacks cover both degraded paths.

use crate::llm::ReasoningModel;
use crate::provider::ProviderResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are a credentialing verification analyst. \
Given a verification type, the raw registry lookup result (which may be a \
valid negative 'not found' outcome or an error), and the subject's details, \
decide the step outcome. Respond with a single JSON object: \
{\"decision\": \"completed\"|\"requires_review\"|\"failed\"|\"in_progress\", \
\"reasoning\": string, \"issues_found\": string[], \"recommendations\": string[]}. \
A subject legitimately absent from a registry is a valid negative result, not \
a failure. No prose, no code fences.";

/// Outcome classes a decision can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Completed,
    RequiresReview,
    Failed,
    InProgress,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Completed => "completed",
            DecisionStatus::RequiresReview => "requires_review",
            DecisionStatus::Failed => "failed",
            DecisionStatus::InProgress => "in_progress",
        }
    }

    /// The matching dashboard dropdown label.
    pub fn status_label(&self) -> &'static str {
        match self {
            DecisionStatus::Completed => "Completed",
            DecisionStatus::RequiresReview => "Requires Review",
            DecisionStatus::Failed => "Failed",
            DecisionStatus::InProgress => "In Progress",
        }
    }
}

/// Structured outcome of the analysis stage. Always populated — a workflow
/// never completes without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationDecision {
    pub decision: DecisionStatus,
    pub reasoning: String,
    #[serde(default)]
    pub issues_found: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

pub struct DecisionAnalyzer {
    model: Arc<dyn ReasoningModel>,
}

impl DecisionAnalyzer {
    pub fn new(model: Arc<dyn ReasoningModel>) -> Self {
        Self { model }
    }

    /// Turn whatever verification evidence exists into a decision.
    pub async fn analyze(
        &self,
        verification_type: &str,
        provider_result: Option<&ProviderResult>,
        subject: Option<&Value>,
        context: Option<&str>,
    ) -> VerificationDecision {
        let Some(result) = provider_result else {
            return Self::no_data_decision(verification_type);
        };

        let user = json!({
            "verification_type": verification_type,
            "provider_result": result,
            "subject_data": subject,
            "context": context,
        })
        .to_string();

        match self.model.complete_json(SYSTEM_PROMPT, &user).await {
            Ok(value) => match serde_json::from_value::<VerificationDecision>(value) {
                Ok(decision) => decision,
                Err(e) => {
                    warn!(error = %e, "analysis response had an unexpected shape");
                    Self::failure_decision(&format!(
                        "the response did not match the expected shape ({e})"
                    ))
                }
            },
            Err(e) => {
                warn!(error = %e, "analysis call failed");
                Self::failure_decision(&format!("{e:#}"))
            }
        }
    }

    fn no_data_decision(verification_type: &str) -> VerificationDecision {
        VerificationDecision {
            decision: DecisionStatus::Completed,
            reasoning: format!(
                "No verification data was available for {verification_type}; \
                 the step was completed without an external check."
            ),
            issues_found: vec!["No subject data available for external verification".to_string()],
            recommendations: vec![
                "Collect the subject's identifying details and re-run the check".to_string(),
            ],
        }
    }

    fn failure_decision(detail: &str) -> VerificationDecision {
        VerificationDecision {
            decision: DecisionStatus::RequiresReview,
            reasoning: format!("AI analysis failed: {detail}. Flagging for manual review."),
            issues_found: vec!["AI analysis unavailable".to_string()],
            recommendations: vec![
                "Review the registry result manually before approving".to_string(),
            ],
        }
    }
}
