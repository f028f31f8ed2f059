//! Error types for compendium_map

use thiserror::Error;

/// Main error type for compendium merging, layout and plotting
#[derive(Error, Debug)]
pub enum CompendiumError {
    #[error("Empty input: {reason}")]
    EmptyInput { reason: String },

    #[error("Invalid filter: {reason}")]
    InvalidFilter { reason: String },

    #[error("Invalid expression table: {reason}")]
    InvalidExpressionTable { reason: String },

    #[error("Invalid clinical table: {reason}")]
    InvalidClinicalTable { reason: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Unknown configuration '{name}'. Available configurations are: {available}")]
    UnknownConfig { name: String, available: String },

    #[error("Layout failed: {reason}")]
    Layout { reason: String },

    #[error("Plot rendering failed: {reason}")]
    Plot { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Result type alias for compendium operations
pub type Result<T> = std::result::Result<T, CompendiumError>;
