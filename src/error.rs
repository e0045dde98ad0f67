//! Error types for docstore
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias using DocStoreError
pub type Result<T> = std::result::Result<T, DocStoreError>;

/// Unified error type for docstore operations
#[derive(Debug, Error)]
pub enum DocStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    #[error("Engine error: {0}")]
    Engine(#[from] rusqlite::Error),

    // -------------------------------------------------------------------------
    // Document Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Object with id \"{0}\" already exists")]
    DuplicateId(String),

    #[error("Unable to delete item with id \"{0}\"")]
    DeleteFailed(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Store not loaded: call load() first")]
    NotReady,

    // -------------------------------------------------------------------------
    // Hook Errors
    // -------------------------------------------------------------------------
    #[error("Persistence hook failed: {0}")]
    Hook(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocStoreError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            DocStoreError::Io(_) => "IO",
            DocStoreError::Engine(_) => "ENGINE",
            DocStoreError::InvalidInput(_) => "INVALID_INPUT",
            DocStoreError::DuplicateId(_) => "DUPLICATE_ID",
            DocStoreError::DeleteFailed(_) => "DELETE_FAILED",
            DocStoreError::NotReady => "NOT_READY",
            DocStoreError::Hook(_) => "HOOK",
            DocStoreError::Config(_) => "CONFIG",
        }
    }
}
