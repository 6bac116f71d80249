use autoverify_agent::provider::{HttpRegistryClient, ProviderResult, RegistryClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> HttpRegistryClient {
    HttpRegistryClient::new(server.uri(), server.uri())
}

#[tokio::test]
async fn npi_record_is_a_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("number", "1234567890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result_count": 1,
            "results": [{"number": "1234567890", "basic": {"first_name": "JANE"}}],
        })))
        .mount(&server)
        .await;

    match client(&server).await.npi_lookup("1234567890").await {
        ProviderResult::Match { record } => assert_eq!(record["number"], "1234567890"),
        other => panic!("expected a match, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_npi_result_set_is_a_valid_negative() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result_count": 0, "results": []})),
        )
        .mount(&server)
        .await;

    match client(&server).await.npi_lookup("9999999999").await {
        ProviderResult::NotFound { message } => {
            assert!(message.contains("not enrolled"));
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn http_404_is_normalized_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/licenses/A-100"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match client(&server).await.license_lookup("A-100", Some("CA")).await {
        ProviderResult::NotFound { message } => {
            assert!(message.contains("A-100"));
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_captured_not_thrown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    match client(&server).await.npi_lookup("1234567890").await {
        ProviderResult::Error { message } => assert!(message.contains("500")),
        other => panic!("expected an error result, got {other:?}"),
    }
}

#[tokio::test]
async fn registry_validation_errors_are_captured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Errors": [{"description": "Invalid number", "field": "number"}],
        })))
        .mount(&server)
        .await;

    match client(&server).await.npi_lookup("not-a-number").await {
        ProviderResult::Error { message } => assert!(message.contains("rejected")),
        other => panic!("expected an error result, got {other:?}"),
    }
}

#[tokio::test]
async fn license_record_is_a_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/licenses/A-100"))
        .and(query_param("state", "CA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "license_number": "A-100",
            "status": "active",
        })))
        .mount(&server)
        .await;

    match client(&server).await.license_lookup("A-100", Some("CA")).await {
        ProviderResult::Match { record } => assert_eq!(record["status"], "active"),
        other => panic!("expected a match, got {other:?}"),
    }
}
