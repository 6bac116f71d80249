//! Step preparation: inspect, expand, start.
//!
//! The sequence is idempotent — an already-expanded, already-started step
//! passes straight through with no additional interactions and an identical
//! snapshot.

use crate::inspector::{inspect_step, panel_selector};
use crate::session::RunSession;
use crate::steps::{PanelState, StepInspection, StepStatus};
use autoverify::ElementQuery;
use thiserror::Error;
use tracing::{debug, warn};

/// The four distinguished failure points of step preparation. Each aborts
/// the calling workflow under its wire name.
#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("inspection failed: {0}")]
    Inspection(String),
    #[error("expand failed: {0}")]
    Expand(String),
    #[error("expand verification failed: {0}")]
    ExpandVerification(String),
    #[error("start failed: {0}")]
    Start(String),
}

impl PrepareError {
    pub fn stage(&self) -> &'static str {
        match self {
            PrepareError::Inspection(_) => "inspection",
            PrepareError::Expand(_) => "expand",
            PrepareError::ExpandVerification(_) => "expand_verification",
            PrepareError::Start(_) => "start",
        }
    }
}

fn expand_query(step_id: &str) -> ElementQuery {
    ElementQuery::css(".step-header")
        .within(panel_selector(step_id))
        .or_attr("data-action", "expand")
        .or_pattern("[aria-expanded]")
}

fn start_query(step_id: &str) -> ElementQuery {
    ElementQuery::css("button[data-action=\"start\"]")
        .within(panel_selector(step_id))
        .or_text("start")
        .or_pattern("button.start")
}

/// Run the inspect → expand → start sequence for one step.
///
/// Returns the latest inspection on success. A start click that is not
/// followed by a visible status change is logged, not fatal; the status
/// write later in the workflow is the authoritative outcome.
pub async fn prepare_step(
    session: &RunSession,
    step_id: &str,
) -> Result<StepInspection, PrepareError> {
    let narrator = session.narrator();
    let engine = session.engine();
    narrator.thinking(format!("Preparing step '{step_id}'"));

    let inspection = inspect_step(&engine, step_id)
        .await
        .map_err(|e| PrepareError::Inspection(e.to_string()))?;
    if inspection.state == PanelState::NotFound {
        narrator.result(format!("Step '{step_id}' was not found on the page"));
        return Err(PrepareError::Inspection(format!(
            "step '{step_id}' was not found"
        )));
    }

    if inspection.state == PanelState::Collapsed {
        narrator.thinking(format!("Step '{step_id}' is collapsed; expanding it"));
        match session
            .interactor()
            .click(&expand_query(step_id), &format!("the '{step_id}' step header"))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(PrepareError::Expand(format!(
                    "no expand control found for step '{step_id}'"
                )))
            }
            Err(e) => return Err(PrepareError::Expand(e.to_string())),
        }
        session.settle().await;

        let after = inspect_step(&engine, step_id)
            .await
            .map_err(|e| PrepareError::ExpandVerification(e.to_string()))?;
        if after.state != PanelState::Expanded {
            narrator.result(format!(
                "Step '{step_id}' did not expand after clicking its header"
            ));
            return Err(PrepareError::ExpandVerification(format!(
                "step '{step_id}' is still {:?} after expanding",
                after.state
            )));
        }
    }

    let mut inspection = inspect_step(&engine, step_id)
        .await
        .map_err(|e| PrepareError::Inspection(e.to_string()))?;

    let startable = matches!(
        inspection.current_status,
        StepStatus::NotStarted | StepStatus::Unknown
    );
    if inspection.has_start_button && startable {
        narrator.thinking(format!("Starting step '{step_id}'"));
        match session
            .interactor()
            .click(&start_query(step_id), &format!("the '{step_id}' start button"))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(PrepareError::Start(format!(
                    "no start control found for step '{step_id}'"
                )))
            }
            Err(e) => return Err(PrepareError::Start(e.to_string())),
        }
        session.settle().await;

        match inspect_step(&engine, step_id).await {
            Ok(after_start) => {
                if after_start.current_status != StepStatus::InProgress {
                    // Log-only: the click landed but the badge never moved.
                    warn!(
                        step_id,
                        status = after_start.current_status.as_str(),
                        "start was clicked but the step status did not change"
                    );
                    narrator.thinking(format!(
                        "Start was clicked but step '{step_id}' still reads '{}'; continuing",
                        after_start.current_status.label()
                    ));
                }
                inspection = after_start;
            }
            Err(e) => debug!(step_id, error = %e, "post-start inspection failed"),
        }
    } else if matches!(
        inspection.current_status,
        StepStatus::InProgress | StepStatus::Completed
    ) {
        narrator.thinking(format!(
            "Step '{step_id}' is already {}; no start needed",
            inspection.current_status.label()
        ));
    }

    Ok(inspection)
}
