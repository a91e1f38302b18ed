//! Exit code utilities and mappings

use crate::error::{AnalysisError, ErrorPayload};

pub const FAILURE: i32 = 1;
pub const CLIENT_ERROR: i32 = 2;

/// Exit code for an error returned by a command
///
/// Problems with the caller's input map to 2, everything else to 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis) if analysis.is_client_error() => CLIENT_ERROR,
        _ => FAILURE,
    }
}

/// Sanitized payload for an error returned by a command
pub fn payload_for(err: &anyhow::Error) -> ErrorPayload {
    match err.downcast_ref::<AnalysisError>() {
        Some(analysis) => analysis.to_payload(),
        None => ErrorPayload {
            error: err.to_string(),
            details: None,
        },
    }
}
