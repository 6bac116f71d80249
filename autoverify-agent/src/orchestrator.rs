//! LLM-driven orchestration loop.
//!
//! Turns a natural-language task into workflow invocations: the model sees
//! the registry's tool definitions, its text fragments accumulate into the
//! run's status text (text alone never ends the run — further tool calls
//! may follow), each tool call is narrated, dispatched, and its structured
//! outcome relayed back, and a turn with no tool calls is the model's
//! handoff. The cancellation token is polled once per received event;
//! cleanup runs on every exit path.

use crate::llm::{AssistantTurn, ChatBackend, ChatMessage, ToolDef};
use crate::registry;
use crate::session::{AgentServices, RunSession};
use crate::workflow::WorkflowOutcome;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are an automation agent operating a provider \
credentialing dashboard. Use the available workflow tools to complete the \
user's task, one step at a time. Pass the subject data you were given through \
to the matching tool unchanged. When every requested step has been handled, \
reply with a short summary and make no further tool calls.";

const MAX_ROUNDS: usize = 12;

/// Terminal summary of one orchestrated run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Accumulated model-authored status text.
    pub status_text: String,
    pub outcomes: Vec<WorkflowOutcome>,
    pub cancelled: bool,
    pub error: Option<String>,
}

pub struct Orchestrator {
    session: RunSession,
    services: AgentServices,
    chat: Arc<dyn ChatBackend>,
}

impl Orchestrator {
    pub fn new(session: RunSession, services: AgentServices, chat: Arc<dyn ChatBackend>) -> Self {
        Self {
            session,
            services,
            chat,
        }
    }

    pub fn session(&self) -> &RunSession {
        &self.session
    }

    /// Run the loop to completion, cancellation, or failure.
    ///
    /// Whatever happens inside, cleanup always runs: the run is marked
    /// stopped and listening UI chrome gets its final event.
    pub async fn run_task(&self, task: &str, subject_data: Option<&Value>) -> RunSummary {
        let mut summary = match self.drive(task, subject_data).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "orchestration run failed");
                self.session.narrator().result(format!("Run failed: {e:#}"));
                RunSummary {
                    error: Some(format!("{e:#}")),
                    cancelled: self.session.is_cancelled(),
                    ..Default::default()
                }
            }
        };
        summary.cancelled |= self.session.is_cancelled();
        self.session.mark_stopped();
        summary
    }

    async fn drive(&self, task: &str, subject_data: Option<&Value>) -> Result<RunSummary> {
        let narrator = self.session.narrator();
        let tools: Vec<ToolDef> = registry::tool_specs();
        let mut summary = RunSummary::default();

        let mut user = task.to_string();
        if let Some(subject) = subject_data {
            user.push_str("\n\nSubject data:\n");
            user.push_str(&serde_json::to_string_pretty(subject)?);
        }
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)];

        for round in 0..MAX_ROUNDS {
            if self.session.is_cancelled() {
                narrator.result("Cancellation requested; halting the run");
                summary.cancelled = true;
                return Ok(summary);
            }

            let turn: AssistantTurn = self
                .chat
                .next_turn(&messages, &tools)
                .await
                .with_context(|| format!("model turn {round} failed"))?;

            if let Some(text) = &turn.text {
                if !summary.status_text.is_empty() {
                    summary.status_text.push('\n');
                }
                summary.status_text.push_str(text);
                narrator.thinking(text.clone());
            }
            messages.push(ChatMessage::assistant(
                turn.text.clone(),
                turn.tool_calls.clone(),
            ));

            if turn.tool_calls.is_empty() {
                // Handoff: the model is done driving tools.
                narrator.result("Workflow run complete; handing back control");
                return Ok(summary);
            }

            for call in &turn.tool_calls {
                if self.session.is_cancelled() {
                    narrator.result("Cancellation requested; halting the run");
                    summary.cancelled = true;
                    return Ok(summary);
                }

                let name = &call.function.name;
                let args: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(Value::Null);
                narrator.action(format!("Invoking {name} with {args}"));

                match registry::dispatch(&self.session, &self.services, name, args).await {
                    Ok(outcome) => {
                        narrator.result(format!(
                            "{name} {}: {}",
                            if outcome.success { "succeeded" } else { "failed" },
                            outcome.message
                        ));
                        let payload = serde_json::to_string(&outcome)
                            .unwrap_or_else(|_| "{\"success\":false}".to_string());
                        messages.push(ChatMessage::tool(call.id.clone(), payload));
                        summary.outcomes.push(outcome);
                    }
                    Err(e) => {
                        info!(tool = name.as_str(), error = %e, "tool call rejected");
                        narrator.result(format!("{name} rejected: {e}"));
                        let payload = serde_json::json!({
                            "success": false,
                            "message": e.to_string(),
                        });
                        messages.push(ChatMessage::tool(call.id.clone(), payload.to_string()));
                    }
                }
            }
        }

        bail!("run did not complete within {MAX_ROUNDS} model turns")
    }
}
