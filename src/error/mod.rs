//! Error handling module for avprobe

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for probe operations
#[derive(Error, Debug)]
pub enum AvProbeError {
    /// Caller-supplied argument rejected before any resource was acquired
    #[error("Invalid argument: {message}")]
    Validation { message: String },

    /// Input file not found
    #[error("Input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The driver could not allocate a required structure
    #[error("Could not allocate {step}.")]
    Allocation { step: String },

    /// The driver reported a negative status
    #[error("{operation} failed with status {status}{}", describe(.message))]
    Driver {
        operation: String,
        status: i32,
        message: Option<String>,
    },

    /// A metadata source yielded the same key twice
    #[error("Duplicate tag key: {key}")]
    DuplicateKey { key: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe(message: &Option<String>) -> String {
    match message {
        Some(text) => format!(": {}", text),
        None => String::new(),
    }
}

impl AvProbeError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an allocation failure for the named step
    pub fn allocation(step: impl Into<String>) -> Self {
        Self::Allocation { step: step.into() }
    }

    /// Create a driver error from a negative status
    pub fn driver(operation: impl Into<String>, status: i32, message: Option<String>) -> Self {
        Self::Driver {
            operation: operation.into(),
            status,
            message,
        }
    }

    /// Bad input, as opposed to an I/O or driver failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::NotFound { .. })
    }

    /// Driver-reported status, if any
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Driver { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for probe operations
pub type AvResult<T> = std::result::Result<T, AvProbeError>;
