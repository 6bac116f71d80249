use thiserror::Error;

/// Errors surfaced by automation operations.
///
/// Ordinary "the thing isn't there" conditions are not errors at the
/// primitive layer; primitives narrate them and return `false`. The variants
/// here cover the conditions that must stop a caller.
#[derive(Error, Debug)]
pub enum AutomationError {
    /// No element matched any resolution strategy where one was required.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// An expected action control exists but is disabled. This should never
    /// happen in a well-formed flow and is always a hard failure.
    #[error("Element is disabled: {0}")]
    ElementDisabled(String),

    /// A bounded wait expired before the element appeared.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// The underlying page engine failed.
    #[error("Engine error: {0}")]
    EngineError(String),
}
