mod common;

use autoverify_agent::registry::{self, DispatchError, VerificationKind};
use common::{dashboard_session, services_with, CannedRegistry, ScriptedModel};
use serde_json::json;

#[test]
fn tool_specs_cover_every_registered_kind() {
    let specs = registry::tool_specs();
    let names: Vec<&str> = specs.iter().map(|s| s.function.name.as_str()).collect();
    assert_eq!(names, vec!["npi_verification", "medical_verification"]);

    for spec in &specs {
        let schema = serde_json::to_value(&spec.function.parameters).unwrap();
        let properties = schema
            .get("properties")
            .and_then(|p| p.as_object())
            .unwrap_or_else(|| panic!("{} has no properties", spec.function.name));
        assert!(properties.contains_key("stepId"));
        assert!(properties.contains_key("subjectData"));
        assert!(properties.contains_key("context"));
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "stepId"));
    }
}

#[test]
fn tool_names_round_trip_through_the_kind_enum() {
    for kind in VerificationKind::ALL {
        assert_eq!(VerificationKind::from_tool_name(kind.tool_name()), Some(kind));
    }
    assert_eq!(VerificationKind::from_tool_name("unknown_tool"), None);
}

#[tokio::test]
async fn unknown_tool_is_rejected_at_dispatch() {
    let (_page, session) = dashboard_session();
    let (_canned, _model, services) =
        services_with(CannedRegistry::empty(), ScriptedModel::failing("unused"));

    let err = registry::dispatch(&session, &services, "passport_verification", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownTool(_)));
}

#[tokio::test]
async fn malformed_arguments_are_rejected_before_any_interaction() {
    let (page, session) = dashboard_session();
    let (_canned, _model, services) =
        services_with(CannedRegistry::empty(), ScriptedModel::failing("unused"));

    let err = registry::dispatch(
        &session,
        &services,
        "npi_verification",
        json!({"stepId": 42}),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DispatchError::InvalidArguments { .. }));
    assert!(page.events().is_empty());
}
