use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for the application.
///
/// Covers:
/// - IO operations (config file, playlist index files)
/// - Settings file parsing
/// - Option coercion and enumerated choices
/// - Environment configuration

/// Represents all possible errors that can occur in the application.
///
/// # Error Categories
///
/// - IO: File system operations
/// - Json: Malformed settings file
/// - InvalidType / InvalidChoice: Option values that cannot be coerced
/// - MissingEnv / CredentialsMissing: Incomplete run configuration
/// - Custom: Application-specific errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid type for option '{option}': {value}")]
    InvalidType { option: String, value: String },

    #[error("Invalid choice for option '{option}': '{value}' (choose from {})", .choices.join(", "))]
    InvalidChoice {
        option: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Credential file not found: {}", .0.display())]
    CredentialsMissing(PathBuf),

    #[error("{0}")]
    Custom(String),
}

impl From<&str> for AppError {
    fn from(error: &str) -> Self {
        AppError::Custom(error.to_string())
    }
}

impl From<String> for AppError {
    fn from(error: String) -> Self {
        AppError::Custom(error)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
