//! Send-time validation for composed messages.

use thiserror::Error;

use crate::protocol::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendRejection {
    #[error("an upload is still in progress")]
    UploadInFlight,
    #[error("nothing to send")]
    Empty,
}

/// Refuse while an upload is running, or when there is neither text nor an
/// attachment.
pub fn validate_outgoing(
    text: &str,
    attachments: &[UploadedFile],
    uploading: bool,
) -> Result<(), SendRejection> {
    if uploading {
        return Err(SendRejection::UploadInFlight);
    }
    if text.trim().is_empty() && attachments.is_empty() {
        return Err(SendRejection::Empty);
    }
    Ok(())
}

/// Strip trailing whitespace and NUL characters before sending.
pub fn sanitize_message(text: &str) -> String {
    text.trim_end().chars().filter(|&c| c != '\0').collect()
}
