//! Read-only projection of a step panel's current state.

use crate::steps::{PanelState, StepInspection, StepStatus};
use autoverify::{AutomationError, PageEngine};
use std::sync::Arc;
use tracing::debug;

/// CSS selector of the panel for a step id.
pub fn panel_selector(step_id: &str) -> String {
    format!("[data-step-id=\"{step_id}\"]")
}

/// Inspect a step panel.
///
/// The snapshot is recomputed from the live document on every call — the
/// dashboard re-renders asynchronously, so a cached inspection is a stale
/// inspection.
pub async fn inspect_step(
    engine: &Arc<dyn PageEngine>,
    step_id: &str,
) -> Result<StepInspection, AutomationError> {
    let panel_css = panel_selector(step_id);
    let Some(panel) = engine.query(&panel_css).await?.into_iter().next() else {
        debug!(step_id, "step panel not present");
        return Ok(StepInspection::not_found());
    };

    let classes = engine
        .attribute(panel, "class")
        .await?
        .unwrap_or_default();
    let state = if classes.split_whitespace().any(|c| c == "expanded") {
        PanelState::Expanded
    } else {
        PanelState::Collapsed
    };

    let current_status = match engine
        .query(&format!("{panel_css} .step-status"))
        .await?
        .into_iter()
        .next()
    {
        Some(badge) => StepStatus::from_label(&engine.text(badge).await?),
        None => StepStatus::Unknown,
    };

    let mut available_actions = Vec::new();
    for button in engine
        .query(&format!("{panel_css} button[data-action]"))
        .await?
    {
        if let Some(action) = engine.attribute(button, "data-action").await? {
            available_actions.push(action);
        }
    }

    let mut available_fields = Vec::new();
    let fields_css = format!(
        "{panel_css} input[name], {panel_css} textarea[name], {panel_css} select[name]"
    );
    for field in engine.query(&fields_css).await? {
        if let Some(name) = engine.attribute(field, "name").await? {
            available_fields.push(name);
        }
    }

    let has_start_button = available_actions.iter().any(|a| a == "start");
    let has_save_button = available_actions.iter().any(|a| a == "save");

    debug!(
        step_id,
        ?state,
        status = current_status.as_str(),
        actions = available_actions.len(),
        "inspected step panel"
    );

    Ok(StepInspection {
        state,
        current_status,
        available_actions,
        available_fields,
        has_start_button,
        has_save_button,
    })
}
