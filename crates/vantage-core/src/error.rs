//! Error types for Vantage

use thiserror::Error;

/// Result type alias using Vantage's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Vantage error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Project '{0}' not found. Run `vantage projects list` to see all projects.")]
    ProjectNotFound(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check your connection to the console.")]
    Network(#[from] reqwest::Error),

    #[error("Console API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Validation errors (E200-E299)
    #[error("Validation failed: {0}")]
    Validation(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::ProjectNotFound(_) => "E001",
            Self::Network(_) => "E100",
            Self::Api { .. } => "E101",
            Self::Validation(_) => "E200",
            Self::Config(_) => "E600",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ProjectNotFound(_) => Some("vantage projects list".to_string()),
            Self::Network(_) => Some("Check the console base URL with `vantage config get api.base_url`".to_string()),
            Self::Api { status: 401, .. } => Some("Set VANTAGE_API_TOKEN in the environment".to_string()),
            Self::Config(_) => Some("vantage config list".to_string()),
            _ => None,
        }
    }
}
