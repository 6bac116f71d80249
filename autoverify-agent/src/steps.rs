use serde::{Deserialize, Serialize};

/// Structural state of a step panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    NotFound,
    Collapsed,
    Expanded,
}

/// Review status shown on a step's badge and status dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    RequiresReview,
    Unknown,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
            StepStatus::RequiresReview => "requires_review",
            StepStatus::Unknown => "unknown",
        }
    }

    /// Human form used by the dashboard's badge and dropdown options.
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "Not Started",
            StepStatus::InProgress => "In Progress",
            StepStatus::Completed => "Completed",
            StepStatus::Failed => "Failed",
            StepStatus::RequiresReview => "Requires Review",
            StepStatus::Unknown => "Unknown",
        }
    }

    /// Parse either the wire form (`requires_review`) or the badge label
    /// (`Requires Review`), case-insensitively. Anything else is `Unknown`.
    pub fn from_label(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "not_started" => StepStatus::NotStarted,
            "in_progress" => StepStatus::InProgress,
            "completed" | "complete" => StepStatus::Completed,
            "failed" => StepStatus::Failed,
            "requires_review" | "needs_review" => StepStatus::RequiresReview,
            _ => StepStatus::Unknown,
        }
    }
}

/// Stateless snapshot of one step panel.
///
/// Always recomputed from the live document; never cached between queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInspection {
    pub state: PanelState,
    pub current_status: StepStatus,
    pub available_actions: Vec<String>,
    pub available_fields: Vec<String>,
    pub has_start_button: bool,
    pub has_save_button: bool,
}

impl StepInspection {
    pub fn not_found() -> Self {
        Self {
            state: PanelState::NotFound,
            current_status: StepStatus::Unknown,
            available_actions: Vec::new(),
            available_fields: Vec::new(),
            has_start_button: false,
            has_save_button: false,
        }
    }
}
