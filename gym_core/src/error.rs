//! Error types for the gym_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gym_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error, fatal at startup (bad config file or catalog level)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Database state error
    #[error("State error: {0}")]
    State(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Username already exists: {0}")]
    MemberExists(String),

    #[error("Equipment not found: {0}")]
    EquipmentNotFound(u32),

    /// Rejected user input (unknown level, empty name, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
