use std::env;
use tracing::info;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CHAT_URL: &str = "https://api.openai.com/v1";
const DEFAULT_NPI_URL: &str = "https://npiregistry.cms.hhs.gov";
const DEFAULT_LICENSE_URL: &str = "https://api.statemedboard.example.com";

/// Environment-driven agent configuration.
///
/// The API key is the single credential gating the whole system: without it
/// the agent runs the scripted demo walkthrough, a reduced subset of
/// interactions with no external calls.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub chat_base_url: String,
    pub npi_registry_url: String,
    pub license_registry_url: String,
    /// Force demo mode even when a key is present.
    pub force_demo: bool,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AgentConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("AUTOVERIFY_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|v| !v.trim().is_empty());
        let config = Self {
            api_key,
            model: env_or("AUTOVERIFY_MODEL", DEFAULT_MODEL),
            chat_base_url: env_or("AUTOVERIFY_CHAT_URL", DEFAULT_CHAT_URL),
            npi_registry_url: env_or("AUTOVERIFY_NPI_URL", DEFAULT_NPI_URL),
            license_registry_url: env_or("AUTOVERIFY_LICENSE_URL", DEFAULT_LICENSE_URL),
            force_demo: env::var("AUTOVERIFY_DEMO").is_ok(),
        };
        if config.demo_mode() {
            info!("no API key configured; the agent will run in demo mode");
        }
        config
    }

    pub fn demo_mode(&self) -> bool {
        self.force_demo || self.api_key.is_none()
    }
}
