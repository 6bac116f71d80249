//! Verification-type-specific subject fact bags.
//!
//! Every field is optional; a workflow only requires its minimum
//! identifying field to attempt an external call, and the absence of that
//! field downgrades the call to "no data" rather than an error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn trimmed_non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Facts for an NPI registry check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NpiSubject {
    /// 10-digit National Provider Identifier; the minimum identifying field.
    pub npi: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization_name: Option<String>,
    pub state: Option<String>,
}

impl NpiSubject {
    pub fn identifier(&self) -> Option<&str> {
        trimmed_non_empty(self.npi.as_ref())
    }
}

/// Facts for a state medical-license check.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSubject {
    /// Board-issued license number; the minimum identifying field.
    pub license_number: Option<String>,
    pub state: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl LicenseSubject {
    pub fn identifier(&self) -> Option<&str> {
        trimmed_non_empty(self.license_number.as_ref())
    }
}
