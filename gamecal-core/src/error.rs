//! Error types for gamecal.

use thiserror::Error;

/// Errors that can occur in gamecal operations.
#[derive(Error, Debug)]
pub enum GameCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No calendar configured for league '{0}'")]
    NoCalendarBinding(String),

    #[error("Invalid code '{0}': codes must be non-empty and contain no whitespace")]
    InvalidCode(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Could not decode store record: {0}")]
    Decode(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("Confirmation channel error: {0}")]
    Confirmation(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Event source error: {0}")]
    Source(String),

    #[error("Rejection ledger error: {0}")]
    Ledger(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GameCalError {
    /// Transport failures only cost the current change; the run goes on.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GameCalError::Provider(_)
                | GameCalError::ProviderNotInstalled(_)
                | GameCalError::ProviderTimeout(_)
                | GameCalError::Confirmation(_)
                | GameCalError::Notify(_)
        )
    }
}

/// Result type alias for gamecal operations.
pub type GameCalResult<T> = Result<T, GameCalError>;
