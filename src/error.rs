//! Typed error taxonomy shared by every component.
//!
//! One variant per error code the engine can surface; `http_status` mirrors what an HTTP
//! transport built on top of this crate would map each variant to, even though the transport
//! itself is out of scope here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaspError {
    #[error("folder path does not exist: {0}")]
    FolderNotFound(PathBuf),

    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to persist to the store: {0}")]
    SaveFailed(String),

    #[error("no cover data for file {0}")]
    NoCoverData(String),

    #[error("rule conflict: {0}")]
    RuleConflict(String),

    #[error("unsupported rule type: {0}")]
    InvalidType(String),

    #[error("rule not found: {0}")]
    RuleNotFound(String),

    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("failed to move file: {0}")]
    MoveFailed(String),

    #[error("action log not found: {0}")]
    LogNotFound(String),

    #[error("action batch already undone: {0}")]
    AlreadyUndone(String),

    #[error("extension already mapped: {0}")]
    ExtensionConflict(String),

    #[error("custom extension not found: {0}")]
    ExtensionNotFound(String),

    #[error("category already exists: {0}")]
    CategoryConflict(String),

    #[error("custom category not found: {0}")]
    CategoryNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl ClaspError {
    /// The status code an HTTP transport built on this engine would report for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ClaspError::FolderNotFound(_) => 404,
            ClaspError::PermissionDenied(_) => 403,
            ClaspError::FileNotFound(_) => 404,
            ClaspError::SaveFailed(_) => 500,
            ClaspError::NoCoverData(_) => 404,
            ClaspError::RuleConflict(_) => 409,
            ClaspError::InvalidType(_) => 400,
            ClaspError::RuleNotFound(_) => 404,
            ClaspError::ScanNotFound(_) => 404,
            ClaspError::MoveFailed(_) => 500,
            ClaspError::LogNotFound(_) => 404,
            ClaspError::AlreadyUndone(_) => 409,
            ClaspError::ExtensionConflict(_) => 409,
            ClaspError::ExtensionNotFound(_) => 404,
            ClaspError::CategoryConflict(_) => 409,
            ClaspError::CategoryNotFound(_) => 404,
            ClaspError::Io(_) => 500,
            ClaspError::Db(_) => 500,
        }
    }

    /// The stable code string, matching the distilled spec's error code set.
    pub fn code(&self) -> &'static str {
        match self {
            ClaspError::FolderNotFound(_) => "FOLDER_NOT_FOUND",
            ClaspError::PermissionDenied(_) => "PERMISSION_DENIED",
            ClaspError::FileNotFound(_) => "FILE_NOT_FOUND",
            ClaspError::SaveFailed(_) => "SAVE_FAILED",
            ClaspError::NoCoverData(_) => "NO_COVER_DATA",
            ClaspError::RuleConflict(_) => "RULE_CONFLICT",
            ClaspError::InvalidType(_) => "INVALID_TYPE",
            ClaspError::RuleNotFound(_) => "RULE_NOT_FOUND",
            ClaspError::ScanNotFound(_) => "SCAN_NOT_FOUND",
            ClaspError::MoveFailed(_) => "MOVE_FAILED",
            ClaspError::LogNotFound(_) => "LOG_NOT_FOUND",
            ClaspError::AlreadyUndone(_) => "ALREADY_UNDONE",
            ClaspError::ExtensionConflict(_) => "EXTENSION_CONFLICT",
            ClaspError::ExtensionNotFound(_) => "EXTENSION_NOT_FOUND",
            ClaspError::CategoryConflict(_) => "CATEGORY_CONFLICT",
            ClaspError::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            ClaspError::Io(_) => "IO_ERROR",
            ClaspError::Db(_) => "SAVE_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, ClaspError>;
