//! Bundled demo dashboard and the scripted no-credential walkthrough.
//!
//! The dashboard is a [`SimPage`] mirroring the verification screen the
//! agent drives in production: one expandable panel per verification step
//! with a status badge, a start button, a notes field, a status dropdown,
//! and save/collapse controls. Integration tests reuse the same fixture.

use crate::orchestrator::RunSummary;
use crate::sequencer::prepare_step;
use crate::session::RunSession;
use crate::steps::StepStatus;
use autoverify::sim::{SimNode, SimPage};
use autoverify::{Bounds, ElementQuery};
use std::sync::Arc;

pub const DEMO_STEPS: &[(&str, &str)] = &[
    ("npi_verification", "NPI Verification"),
    ("medical_verification", "Medical License Verification"),
];

/// Build the demo credentialing dashboard.
pub fn demo_dashboard() -> Arc<SimPage> {
    let page = Arc::new(SimPage::new());
    let root = page.append(
        None,
        SimNode::new("div")
            .id("dashboard")
            .bounds(Bounds::new(0.0, 0.0, 1280.0, 2000.0)),
    );

    for (index, (step_id, title)) in DEMO_STEPS.iter().enumerate() {
        let top = 120.0 + index as f64 * 320.0;
        let panel = page.append(
            Some(root),
            SimNode::new("div")
                .class("verification-step")
                .class("collapsed")
                .attr("data-step-id", *step_id)
                .bounds(Bounds::new(40.0, top, 1200.0, 300.0)),
        );
        let header = page.append(
            Some(panel),
            SimNode::new("div")
                .class("step-header")
                .text(*title)
                .bounds(Bounds::new(40.0, top, 1200.0, 48.0)),
        );
        let badge = page.append(
            Some(panel),
            SimNode::new("span")
                .class("step-status")
                .text(StepStatus::NotStarted.label())
                .bounds(Bounds::new(1060.0, top + 8.0, 160.0, 32.0)),
        );
        let body = page.append(
            Some(panel),
            SimNode::new("div")
                .class("step-body")
                .bounds(Bounds::new(40.0, top + 48.0, 1200.0, 252.0)),
        );
        let start = page.append(
            Some(body),
            SimNode::new("button")
                .attr("data-action", "start")
                .text("Start Verification")
                .bounds(Bounds::new(60.0, top + 60.0, 160.0, 36.0)),
        );
        page.append(
            Some(body),
            SimNode::new("textarea")
                .attr("name", "verification_notes")
                .attr("data-field", "notes")
                .bounds(Bounds::new(60.0, top + 110.0, 700.0, 90.0)),
        );
        let status_select = page.append(
            Some(body),
            SimNode::new("select")
                .attr("name", "verification_status")
                .attr("data-field", "status")
                .bounds(Bounds::new(60.0, top + 210.0, 240.0, 32.0)),
        );
        for status in [
            StepStatus::NotStarted,
            StepStatus::InProgress,
            StepStatus::Completed,
            StepStatus::RequiresReview,
            StepStatus::Failed,
        ] {
            page.append(
                Some(status_select),
                SimNode::new("option")
                    .attr("value", status.as_str())
                    .text(status.label()),
            );
        }
        let save = page.append(
            Some(body),
            SimNode::new("button")
                .attr("data-action", "save")
                .text("Save")
                .bounds(Bounds::new(320.0, top + 210.0, 100.0, 32.0)),
        );
        let collapse = page.append(
            Some(body),
            SimNode::new("button")
                .attr("data-action", "collapse")
                .text("Collapse")
                .bounds(Bounds::new(440.0, top + 210.0, 100.0, 32.0)),
        );

        page.on_click(header, move |dom| {
            if dom.has_class(panel, "expanded") {
                dom.remove_class(panel, "expanded");
                dom.add_class(panel, "collapsed");
            } else {
                dom.remove_class(panel, "collapsed");
                dom.add_class(panel, "expanded");
            }
        });
        page.on_click(start, move |dom| {
            dom.set_text(badge, StepStatus::InProgress.label());
        });
        page.on_click(save, move |dom| {
            let status = StepStatus::from_label(&dom.value_of(status_select));
            dom.set_text(badge, status.label());
            dom.set_attr(panel, "data-saved", "true");
        });
        page.on_click(collapse, move |dom| {
            dom.remove_class(panel, "expanded");
            dom.add_class(panel, "collapsed");
        });
    }

    page
}

/// Scripted walkthrough used when no API key is configured: inspect, expand
/// and start each known step, then fold it back up — no registry calls, no
/// AI analysis.
pub async fn run_demo(session: &RunSession) -> RunSummary {
    let narrator = session.narrator();
    narrator.thinking(
        "No API key configured; running the scripted demo walkthrough over the bundled dashboard",
    );

    let mut summary = RunSummary::default();
    for (step_id, title) in DEMO_STEPS {
        if session.is_cancelled() {
            narrator.result("Cancellation requested; halting the demo");
            summary.cancelled = true;
            break;
        }
        match prepare_step(session, step_id).await {
            Ok(inspection) => {
                narrator.result(format!(
                    "{title} is {} with status '{}'",
                    match inspection.state {
                        crate::steps::PanelState::Expanded => "expanded",
                        _ => "visible",
                    },
                    inspection.current_status.label()
                ));
                let collapse = ElementQuery::css("button[data-action=\"collapse\"]")
                    .within(crate::inspector::panel_selector(step_id));
                if let Err(e) = session.interactor().click(&collapse, "the collapse control").await
                {
                    narrator.result(format!("Could not collapse {title}: {e}"));
                }
            }
            Err(e) => narrator.result(format!("Skipping {title}: {e}")),
        }
        session.settle().await;
    }

    if !summary.cancelled {
        summary.status_text = "Demo walkthrough complete".to_string();
        narrator.result("Demo walkthrough complete");
    }
    session.mark_stopped();
    summary
}
