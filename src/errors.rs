//! Unified application error type.
//! All modules (db, export, selection, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Request errors (rejected before any query)
    // ---------------------------
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation not allowed for role '{0}'")]
    Forbidden(String),

    // ---------------------------
    // Template errors (fatal for an export)
    // ---------------------------
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template error: {0}")]
    Template(String),

    // ---------------------------
    // Asset errors (recovered by the branding loader)
    // ---------------------------
    #[error("Asset error: {0}")]
    Asset(String),

    // ---------------------------
    // Stream errors (after the first byte was written)
    // ---------------------------
    #[error("Output stream aborted: {0}")]
    StreamWrite(io::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Shorthand used by the request validators.
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
