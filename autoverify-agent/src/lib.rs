//! Credentialing verification automation agent.
//!
//! Drives a verification dashboard the way a human reviewer would: each
//! verification type is a linear workflow state machine that prepares the
//! step's UI panel, calls the matching external registry, asks an AI
//! reasoning step for a structured decision, records the outcome in the
//! panel, and saves. An LLM-driven orchestration loop selects workflows from
//! a natural-language task and streams narrated progress events.

pub mod analyzer;
pub mod config;
pub mod demo;
pub mod inspector;
pub mod llm;
pub mod orchestrator;
pub mod provider;
pub mod registry;
pub mod sequencer;
pub mod session;
pub mod steps;
pub mod subject;
pub mod workflow;

pub use analyzer::{DecisionAnalyzer, DecisionStatus, VerificationDecision};
pub use config::AgentConfig;
pub use orchestrator::{Orchestrator, RunSummary};
pub use registry::{DispatchError, VerificationKind};
pub use sequencer::{prepare_step, PrepareError};
pub use session::{AgentServices, RunSession};
pub use steps::{PanelState, StepInspection, StepStatus};
pub use workflow::WorkflowOutcome;
