mod common;

use autoverify::ThoughtEvent;
use autoverify_agent::analyzer::DecisionStatus;
use autoverify_agent::provider::ProviderResult;
use autoverify_agent::registry;
use common::{dashboard_session, decision_json, services_with, CannedRegistry, ScriptedModel};
use serde_json::json;
use std::sync::atomic::Ordering;

fn assert_relative_order(events: &[ThoughtEvent], needles: &[&str]) {
    let mut previous: Option<usize> = None;
    for needle in needles {
        let position = events
            .iter()
            .position(|e| e.message.contains(needle))
            .unwrap_or_else(|| panic!("no event containing '{needle}'"));
        if let Some(previous) = previous {
            assert!(
                position > previous,
                "'{needle}' appeared out of order (index {position} <= {previous})"
            );
        }
        previous = Some(position);
    }
}

#[tokio::test]
async fn positive_npi_match_runs_the_full_pipeline() {
    let (page, session) = dashboard_session();
    let (canned, _model, services) = services_with(
        CannedRegistry::npi(ProviderResult::Match {
            record: json!({"number": "1234567890", "basic": {"first_name": "JANE"}}),
        }),
        ScriptedModel::replying(decision_json(
            "completed",
            "The NPI record matches the subject's details.",
        )),
    );

    let outcome = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({
            "stepId": "npi_verification",
            "subjectData": {"npi": "1234567890", "firstName": "Jane", "lastName": "Doe"},
        }),
    )
    .await
    .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.step, "completed");
    assert_eq!(canned.npi_calls.load(Ordering::SeqCst), 1);
    let decision = outcome.ai_decision.expect("a decision is always produced");
    assert!(matches!(
        decision.decision,
        DecisionStatus::Completed | DecisionStatus::RequiresReview
    ));
    assert!(matches!(
        outcome.api_result,
        Some(ProviderResult::Match { .. })
    ));

    // The narrated stream covers every stage, in order.
    assert_relative_order(
        &session.narrator().events(),
        &[
            "Starting",
            "Performing",
            "Analyzing",
            "Setting verification status",
            "Successfully saved",
        ],
    );

    // The panel ends saved, statused, and folded back up.
    page.read(|dom| {
        let panel = dom.find("[data-step-id=\"npi_verification\"]").unwrap();
        assert!(dom.has_class(panel, "collapsed"));
        let select = dom
            .find("[data-step-id=\"npi_verification\"] select")
            .unwrap();
        assert_eq!(dom.value_of(select), "completed");
    });
}

#[tokio::test]
async fn missing_identifier_skips_the_external_call() {
    let (page, session) = dashboard_session();
    let (canned, model, services) = services_with(
        CannedRegistry::empty(),
        // Would produce requires_review if it were ever consulted.
        ScriptedModel::failing("the analyzer must not run a model call here"),
    );

    let outcome = registry::dispatch(
        &session,
        &services,
        "medical_verification",
        json!({
            "stepId": "medical_verification",
            "subjectData": {"firstName": "Jane", "lastName": "Doe"},
        }),
    )
    .await
    .unwrap();

    assert!(outcome.success);
    assert_eq!(canned.license_calls.load(Ordering::SeqCst), 0);
    assert!(model.prompts().is_empty());
    assert!(outcome.api_result.is_none());

    let decision = outcome.ai_decision.unwrap();
    assert_eq!(decision.decision, DecisionStatus::Completed);
    assert!(decision.reasoning.contains("No verification data was available"));

    page.read(|dom| {
        let select = dom
            .find("[data-step-id=\"medical_verification\"] select")
            .unwrap();
        assert_eq!(dom.value_of(select), "completed");
    });
}

#[tokio::test]
async fn registry_not_found_is_a_valid_negative_not_a_failure() {
    let (_page, session) = dashboard_session();
    let (_canned, model, services) = services_with(
        CannedRegistry::npi(ProviderResult::NotFound {
            message: "NPI 9999999999 is not enrolled in the registry".to_string(),
        }),
        ScriptedModel::replying(decision_json(
            "completed",
            "The subject is not enrolled, which is the expected negative result.",
        )),
    );

    let outcome = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({
            "stepId": "npi_verification",
            "subjectData": {"npi": "9999999999"},
        }),
    )
    .await
    .unwrap();

    assert!(outcome.success);
    // The synthetic negative reaches analysis as a result, not an error.
    assert!(matches!(
        outcome.api_result,
        Some(ProviderResult::NotFound { .. })
    ));
    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("not_found"));
    assert_ne!(outcome.ai_decision.unwrap().decision, DecisionStatus::Failed);
}

#[tokio::test]
async fn analyzer_failure_degrades_to_requires_review() {
    let (page, session) = dashboard_session();
    let (_canned, _model, services) = services_with(
        CannedRegistry::npi(ProviderResult::Match {
            record: json!({"number": "1234567890"}),
        }),
        ScriptedModel::failing("model timed out"),
    );

    let outcome = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({
            "stepId": "npi_verification",
            "subjectData": {"npi": "1234567890"},
        }),
    )
    .await
    .unwrap();

    // The workflow still runs to completion with the fallback decision.
    assert!(outcome.success);
    let decision = outcome.ai_decision.unwrap();
    assert_eq!(decision.decision, DecisionStatus::RequiresReview);
    assert!(decision.reasoning.contains("AI analysis failed"));
    assert!(decision
        .issues_found
        .contains(&"AI analysis unavailable".to_string()));

    assert_relative_order(
        &session.narrator().events(),
        &[
            "Setting verification status to 'requires_review'",
            "Successfully saved",
            "step collapsed",
        ],
    );
    page.read(|dom| {
        let select = dom
            .find("[data-step-id=\"npi_verification\"] select")
            .unwrap();
        assert_eq!(dom.value_of(select), "requires_review");
    });
}

#[tokio::test]
async fn unknown_step_fails_inspection_without_any_external_work() {
    let (_page, session) = dashboard_session();
    let (canned, model, services) = services_with(
        CannedRegistry::npi(ProviderResult::Match {
            record: json!({}),
        }),
        ScriptedModel::replying(decision_json("completed", "unused")),
    );

    let outcome = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({
            "stepId": "background_check",
            "subjectData": {"npi": "1234567890"},
        }),
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.step, "inspection");
    assert_eq!(canned.npi_calls.load(Ordering::SeqCst), 0);
    assert!(model.prompts().is_empty());
    assert!(outcome.api_result.is_none());
    assert!(outcome.ai_decision.is_none());
}

#[tokio::test]
async fn losing_the_status_control_is_fatal() {
    let (page, session) = dashboard_session();
    let (_canned, _model, services) = services_with(
        CannedRegistry::npi(ProviderResult::Match {
            record: json!({"number": "1234567890"}),
        }),
        ScriptedModel::replying(decision_json("completed", "all good")),
    );

    // The dashboard loses its status dropdown mid-run.
    page.mutate(|dom| {
        let select = dom
            .find("[data-step-id=\"npi_verification\"] select")
            .unwrap();
        dom.remove(select);
    });

    let outcome = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({
            "stepId": "npi_verification",
            "subjectData": {"npi": "1234567890"},
        }),
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.step, "set_status");
    // The decision still exists; only the persistence of it failed.
    assert!(outcome.ai_decision.is_some());
}
