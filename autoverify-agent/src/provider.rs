//! External verification registry clients.
//!
//! Result shaping is deliberate business logic, not generic error handling:
//! a not-found-class response means the subject is absent from the registry,
//! which is itself a meaningful verification outcome, so it is normalized
//! into a successful negative result. Every other failure is captured as an
//! error-shaped value and fed forward — downstream review can still add
//! value on a failed automatic check — so these calls never return `Err`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Normalized outcome of one registry lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderResult {
    /// The registry returned a record for the subject.
    Match { record: Value },
    /// The subject has no record in the registry — a valid negative.
    NotFound { message: String },
    /// The lookup itself failed; captured, never thrown.
    Error { message: String },
}

impl ProviderResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ProviderResult::Error { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            ProviderResult::Match { .. } => "record found".to_string(),
            ProviderResult::NotFound { message } => message.clone(),
            ProviderResult::Error { message } => format!("lookup failed: {message}"),
        }
    }
}

/// One lookup request, already narrowed to the fields the registry needs.
#[derive(Debug, Clone)]
pub enum ProviderQuery {
    Npi { npi: String },
    License { number: String, state: Option<String> },
}

impl ProviderQuery {
    pub fn identifier(&self) -> &str {
        match self {
            ProviderQuery::Npi { npi } => npi,
            ProviderQuery::License { number, .. } => number,
        }
    }
}

#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn npi_lookup(&self, npi: &str) -> ProviderResult;

    async fn license_lookup(&self, number: &str, state: Option<&str>) -> ProviderResult;
}

pub async fn run_query(client: &Arc<dyn RegistryClient>, query: &ProviderQuery) -> ProviderResult {
    match query {
        ProviderQuery::Npi { npi } => client.npi_lookup(npi).await,
        ProviderQuery::License { number, state } => {
            client.license_lookup(number, state.as_deref()).await
        }
    }
}

/// HTTP client for the NPPES NPI registry and the medical-board lookup API.
pub struct HttpRegistryClient {
    http: reqwest::Client,
    npi_base: String,
    license_base: String,
}

impl HttpRegistryClient {
    pub fn new(npi_base: impl Into<String>, license_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            npi_base: npi_base.into(),
            license_base: license_base.into(),
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn npi_lookup(&self, npi: &str) -> ProviderResult {
        let url = format!("{}/api/", self.npi_base.trim_end_matches('/'));
        debug!(npi, "querying NPI registry");
        let response = match self
            .http
            .get(&url)
            .query(&[("version", "2.1"), ("number", npi)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "NPI registry request failed");
                return ProviderResult::Error {
                    message: format!("NPI registry request failed: {e}"),
                };
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return ProviderResult::NotFound {
                message: format!("NPI {npi} is not enrolled in the registry"),
            };
        }
        if !response.status().is_success() {
            return ProviderResult::Error {
                message: format!("NPI registry returned HTTP {}", response.status()),
            };
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => {
                return ProviderResult::Error {
                    message: format!("NPI registry returned an unreadable body: {e}"),
                }
            }
        };
        if let Some(errors) = payload.get("Errors") {
            return ProviderResult::Error {
                message: format!("NPI registry rejected the query: {errors}"),
            };
        }
        match payload.get("result_count").and_then(Value::as_u64) {
            Some(0) => ProviderResult::NotFound {
                message: format!("NPI {npi} is not enrolled in the registry"),
            },
            Some(_) => {
                let record = payload
                    .get("results")
                    .and_then(|r| r.get(0))
                    .cloned()
                    .unwrap_or(payload.clone());
                ProviderResult::Match { record }
            }
            None => ProviderResult::Error {
                message: "NPI registry response had an unexpected shape".to_string(),
            },
        }
    }

    async fn license_lookup(&self, number: &str, state: Option<&str>) -> ProviderResult {
        let url = format!(
            "{}/api/licenses/{number}",
            self.license_base.trim_end_matches('/')
        );
        debug!(number, state, "querying medical board");
        let mut request = self.http.get(&url);
        if let Some(state) = state {
            request = request.query(&[("state", state)]);
        }
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "medical board request failed");
                return ProviderResult::Error {
                    message: format!("medical board request failed: {e}"),
                };
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return ProviderResult::NotFound {
                message: format!("No license record found for {number}"),
            };
        }
        if !response.status().is_success() {
            return ProviderResult::Error {
                message: format!("medical board returned HTTP {}", response.status()),
            };
        }
        match response.json::<Value>().await {
            Ok(record) => ProviderResult::Match { record },
            Err(e) => ProviderResult::Error {
                message: format!("medical board returned an unreadable body: {e}"),
            },
        }
    }
}
