//! Selected file metadata, acceptance checks and data URL encoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::config::UploadPolicy;
use crate::error::UploadError;

/// A file the user picked or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as reported by the host
    pub name: String,
    /// Media type as reported by the host (may be empty)
    pub mime_type: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

/// Check a file against the upload policy.
///
/// The media type is checked first, so an oversized file of the wrong type
/// reports `UnsupportedType`.
pub fn validate(file: &SelectedFile, policy: &UploadPolicy) -> Result<(), UploadError> {
    if !policy.accepted_types.iter().any(|t| *t == file.mime_type) {
        return Err(UploadError::UnsupportedType {
            mime_type: file.mime_type.clone(),
        });
    }

    if file.size_bytes > policy.max_size_bytes {
        return Err(UploadError::TooLarge {
            size_bytes: file.size_bytes,
            limit_bytes: policy.max_size_bytes,
        });
    }

    Ok(())
}

/// Encode file contents as a base64 data URL usable as an image source.
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let payload = STANDARD.encode(bytes);
    let mut url = String::with_capacity(payload.len() + mime_type.len() + 13);
    url.push_str("data:");
    url.push_str(mime_type);
    url.push_str(";base64,");
    url.push_str(&payload);
    url
}

/// Decode a base64 data URL back into its media type and bytes.
/// Returns None for anything that is not a base64 data URL.
#[cfg(test)]
pub(crate) fn from_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (mime_type, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime_type.to_string(), bytes))
}
