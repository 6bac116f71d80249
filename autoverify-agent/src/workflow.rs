//! Verification workflow state machines.
//!
//! One linear machine per verification type:
//! `PREPARE → EXTERNAL_CALL → ANALYZE → RECORD_NOTES → SET_STATUS → SAVE →
//! COLLAPSE → DONE`, with `FAILED` reachable from any stage. Only step
//! preparation, the status write, the save, and the collapse can abort a
//! run; a missing subject, a not-found registry response, and a failed
//! analysis all degrade gracefully and surface through narration and the
//! final decision instead.

use crate::analyzer::VerificationDecision;
use crate::inspector::{inspect_step, panel_selector};
use crate::provider::{self, ProviderQuery, ProviderResult};
use crate::registry::VerificationKind;
use crate::sequencer::prepare_step;
use crate::session::{AgentServices, RunSession};
use crate::steps::StepInspection;
use autoverify::ElementQuery;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Terminal summary of one workflow run. Produced exactly once per run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOutcome {
    pub success: bool,
    pub message: String,
    /// The failure point on failure, `completed` on success.
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_result: Option<ProviderResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_decision: Option<VerificationDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<StepInspection>,
}

struct StageFailure {
    stage: &'static str,
    message: String,
}

fn notes_query(step_id: &str) -> ElementQuery {
    ElementQuery::css("textarea[name=\"verification_notes\"]")
        .within(panel_selector(step_id))
        .or_attr("data-field", "notes")
        .or_pattern("textarea")
}

fn status_query(step_id: &str) -> ElementQuery {
    ElementQuery::css("select[name=\"verification_status\"]")
        .within(panel_selector(step_id))
        .or_attr("data-field", "status")
        .or_pattern("select")
}

fn save_query(step_id: &str) -> ElementQuery {
    ElementQuery::css("button[data-action=\"save\"]")
        .within(panel_selector(step_id))
        .or_text("save")
}

fn collapse_query(step_id: &str) -> ElementQuery {
    ElementQuery::css("button[data-action=\"collapse\"]")
        .within(panel_selector(step_id))
        .or_text("collapse")
        .or_pattern(".step-header")
}

/// Run one verification workflow to its terminal state.
pub async fn run_verification(
    session: &RunSession,
    services: &AgentServices,
    kind: VerificationKind,
    step_id: &str,
    subject: Option<Value>,
    query: Option<ProviderQuery>,
    context: Option<&str>,
) -> WorkflowOutcome {
    let display = kind.display_name();
    let narrator = session.narrator();
    narrator.thinking(format!("Starting {display} workflow for step '{step_id}'"));

    // PREPARE
    if let Err(e) = prepare_step(session, step_id).await {
        let failure = StageFailure {
            stage: e.stage(),
            message: e.to_string(),
        };
        return fail(session, step_id, display, failure, None, None).await;
    }
    session.settle().await;

    // EXTERNAL_CALL — entered only with the minimum identifying field.
    let api_result = match &query {
        Some(query) => {
            narrator.action(format!(
                "Performing {display} API call for '{}'...",
                query.identifier()
            ));
            let result = provider::run_query(&services.provider, query).await;
            narrator.result(match &result {
                ProviderResult::Match { .. } => {
                    format!("{display} API call returned a record")
                }
                ProviderResult::NotFound { message } => format!(
                    "{display} API call found no record ({message}); \
                     treating the absence as a valid negative result"
                ),
                ProviderResult::Error { message } => format!(
                    "{display} API call failed ({message}); continuing so the \
                     result can still be reviewed"
                ),
            });
            Some(result)
        }
        None => {
            narrator.thinking(format!(
                "No identifying data provided for {display}; skipping the external call"
            ));
            None
        }
    };
    session.settle().await;

    // ANALYZE — failures inside the analyzer never abort the workflow.
    narrator.action(format!("Analyzing {display} result with AI..."));
    let decision = services
        .analyzer
        .analyze(display, api_result.as_ref(), subject.as_ref(), context)
        .await;
    narrator.result(format!(
        "AI analysis completed: {} — {}",
        decision.decision.as_str(),
        decision.reasoning
    ));
    session.settle().await;

    // RECORD_NOTES — a warning on failure, never fatal.
    match session
        .interactor()
        .fill(&notes_query(step_id), &decision.reasoning, "the review notes field")
        .await
    {
        Ok(true) => {}
        Ok(false) => narrator.result("Could not record review notes; continuing"),
        Err(e) => narrator.result(format!("Could not record review notes ({e}); continuing")),
    }
    session.settle().await;

    // SET_STATUS — the status is the authoritative step outcome; fatal.
    let status_label = decision.decision.status_label();
    narrator.action(format!(
        "Setting verification status to '{}'...",
        decision.decision.as_str()
    ));
    match session
        .interactor()
        .choose(&status_query(step_id), status_label, "the status dropdown")
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            let failure = StageFailure {
                stage: "set_status",
                message: format!("could not set the status to '{status_label}'"),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
        Err(e) => {
            let failure = StageFailure {
                stage: "set_status",
                message: e.to_string(),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
    }
    session.settle().await;

    // SAVE — fatal.
    narrator.action(format!("Saving the {display} step..."));
    match session
        .interactor()
        .click(&save_query(step_id), "the save button")
        .await
    {
        Ok(true) => narrator.result(format!("Successfully saved {display} step")),
        Ok(false) => {
            let failure = StageFailure {
                stage: "save",
                message: "the save button could not be found".to_string(),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
        Err(e) => {
            let failure = StageFailure {
                stage: "save",
                message: e.to_string(),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
    }
    session.settle().await;

    // COLLAPSE — fatal: sequential batch runs must not inherit open panels.
    narrator.action(format!("Collapsing the {display} step..."));
    match session
        .interactor()
        .click(&collapse_query(step_id), "the collapse control")
        .await
    {
        Ok(true) => narrator.result(format!("{display} step collapsed")),
        Ok(false) => {
            let failure = StageFailure {
                stage: "collapse",
                message: "the collapse control could not be found".to_string(),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
        Err(e) => {
            let failure = StageFailure {
                stage: "collapse",
                message: e.to_string(),
            };
            return fail(session, step_id, display, failure, api_result, Some(decision)).await;
        }
    }

    // DONE
    let current_state = inspect_step(&session.engine(), step_id).await.ok();
    let message = format!(
        "{display} workflow completed with decision '{}'",
        decision.decision.as_str()
    );
    info!(step_id, decision = decision.decision.as_str(), "workflow completed");
    narrator.result(message.clone());
    WorkflowOutcome {
        success: true,
        message,
        step: "completed".to_string(),
        api_result,
        ai_decision: Some(decision),
        current_state,
    }
}

async fn fail(
    session: &RunSession,
    step_id: &str,
    display: &str,
    failure: StageFailure,
    api_result: Option<ProviderResult>,
    ai_decision: Option<VerificationDecision>,
) -> WorkflowOutcome {
    let message = format!(
        "{display} workflow failed at {}: {}",
        failure.stage, failure.message
    );
    session.narrator().result(message.clone());
    info!(step_id, stage = failure.stage, "workflow failed");
    let current_state = inspect_step(&session.engine(), step_id).await.ok();
    WorkflowOutcome {
        success: false,
        message,
        step: failure.stage.to_string(),
        api_result,
        ai_decision,
        current_state,
    }
}
