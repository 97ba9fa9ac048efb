//! Error types for upload handling.

use thiserror::Error;

use crate::config::Messages;

/// Reasons a selected file is refused.
///
/// Every variant is handled the same way by the controller: a blocking alert
/// with the localized message followed by a full form reset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Media type is not one of the accepted image types
    #[error("Unsupported media type '{mime_type}'")]
    UnsupportedType {
        /// The media type reported for the file
        mime_type: String,
    },

    /// File is larger than the configured limit
    #[error("File is {size_bytes} bytes, limit is {limit_bytes} bytes")]
    TooLarge {
        /// Reported file size
        size_bytes: u64,
        /// Configured maximum size
        limit_bytes: u64,
    },

    /// The asynchronous file read did not produce any data
    #[error("Failed to read file: {reason}")]
    ReadFailed {
        /// Host-provided failure description
        reason: String,
    },
}

impl UploadError {
    /// Create a read failure error.
    pub fn read_failed(reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            reason: reason.into(),
        }
    }

    /// Localized text shown to the user for this error.
    pub fn user_message<'a>(&self, messages: &'a Messages) -> &'a str {
        match self {
            UploadError::UnsupportedType { .. } => messages.invalid_type.as_str(),
            UploadError::TooLarge { .. } => messages.too_large.as_str(),
            UploadError::ReadFailed { .. } => messages.read_failed.as_str(),
        }
    }
}
