//! Error types for the intercom admission core.
//!
//! Parse problems in registry lines or account extra parameters are not
//! errors: they are recovered locally and the offending fragment is
//! skipped. Policy rejections are an outcome (406 hangup), not an error.

use thiserror::Error;

use crate::hidden::HiddenState;
use crate::types::CallId;

#[derive(Debug, Error)]
pub enum IntercomError {
    #[error("No hidden session for call {0}")]
    NoHiddenSession(CallId),

    #[error("Hidden session already exists for call {0}")]
    HiddenSessionExists(CallId),

    #[error("Invalid hidden-call transition: start from {0:?}")]
    InvalidTransition(HiddenState),

    #[error("Custom subject not configured: {0}")]
    UnknownCustomSubject(String),

    #[error("Call operation failed: {0}")]
    Call(String),
}

pub type Result<T> = std::result::Result<T, IntercomError>;
