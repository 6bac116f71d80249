//! Closed registry of verification workflow tools.
//!
//! Each verification type is a tagged variant with its own typed argument
//! struct, so dispatch is schema-validated rather than stringly-typed: the
//! JSON-Schema for each tool is generated from the argument struct, and
//! arguments are deserialized into it before any workflow runs.

use crate::llm::ToolDef;
use crate::provider::ProviderQuery;
use crate::session::{AgentServices, RunSession};
use crate::subject::{LicenseSubject, NpiSubject};
use crate::workflow::{run_verification, WorkflowOutcome};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    Npi,
    MedicalLicense,
}

impl VerificationKind {
    pub const ALL: [VerificationKind; 2] =
        [VerificationKind::Npi, VerificationKind::MedicalLicense];

    pub fn tool_name(&self) -> &'static str {
        match self {
            VerificationKind::Npi => "npi_verification",
            VerificationKind::MedicalLicense => "medical_verification",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tool_name() == name)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VerificationKind::Npi => "NPI verification",
            VerificationKind::MedicalLicense => "medical license verification",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            VerificationKind::Npi => {
                "Verify a provider's NPI number against the NPPES registry and \
                 record the outcome on the matching dashboard step."
            }
            VerificationKind::MedicalLicense => {
                "Verify a provider's medical license against the state board \
                 and record the outcome on the matching dashboard step."
            }
        }
    }

    fn parameters_schema(&self) -> Value {
        let schema = match self {
            VerificationKind::Npi => schema_for!(NpiArgs),
            VerificationKind::MedicalLicense => schema_for!(MedicalLicenseArgs),
        };
        serde_json::to_value(schema).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// Arguments for the `npi_verification` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NpiArgs {
    /// Dashboard id of the step to drive.
    pub step_id: String,
    #[serde(default)]
    pub subject_data: Option<NpiSubject>,
    /// Optional free-text context forwarded to the analysis step.
    #[serde(default)]
    pub context: Option<String>,
}

/// Arguments for the `medical_verification` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicalLicenseArgs {
    /// Dashboard id of the step to drive.
    pub step_id: String,
    #[serde(default)]
    pub subject_data: Option<LicenseSubject>,
    /// Optional free-text context forwarded to the analysis step.
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown workflow tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for '{tool}': {detail}")]
    InvalidArguments { tool: String, detail: String },
}

/// Tool definitions for every registered workflow, for the chat loop.
pub fn tool_specs() -> Vec<ToolDef> {
    VerificationKind::ALL
        .iter()
        .map(|kind| {
            ToolDef::function(
                kind.tool_name(),
                kind.description(),
                kind.parameters_schema(),
            )
        })
        .collect()
}

/// Validate arguments for the named tool and run the matching workflow.
pub async fn dispatch(
    session: &RunSession,
    services: &AgentServices,
    tool_name: &str,
    args: Value,
) -> Result<WorkflowOutcome, DispatchError> {
    let kind = VerificationKind::from_tool_name(tool_name)
        .ok_or_else(|| DispatchError::UnknownTool(tool_name.to_string()))?;
    let invalid = |e: serde_json::Error| DispatchError::InvalidArguments {
        tool: tool_name.to_string(),
        detail: e.to_string(),
    };

    match kind {
        VerificationKind::Npi => {
            let args: NpiArgs = serde_json::from_value(args).map_err(invalid)?;
            let query = args
                .subject_data
                .as_ref()
                .and_then(|s| s.identifier())
                .map(|npi| ProviderQuery::Npi {
                    npi: npi.to_string(),
                });
            let subject = args
                .subject_data
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok());
            Ok(run_verification(
                session,
                services,
                kind,
                &args.step_id,
                subject,
                query,
                args.context.as_deref(),
            )
            .await)
        }
        VerificationKind::MedicalLicense => {
            let args: MedicalLicenseArgs = serde_json::from_value(args).map_err(invalid)?;
            let query = args
                .subject_data
                .as_ref()
                .and_then(|s| s.identifier())
                .map(|number| ProviderQuery::License {
                    number: number.to_string(),
                    state: args.subject_data.as_ref().and_then(|s| s.state.clone()),
                });
            let subject = args
                .subject_data
                .as_ref()
                .and_then(|s| serde_json::to_value(s).ok());
            Ok(run_verification(
                session,
                services,
                kind,
                &args.step_id,
                subject,
                query,
                args.context.as_deref(),
            )
            .await)
        }
    }
}
