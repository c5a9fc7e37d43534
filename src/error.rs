use thiserror::Error;

use crate::snmp::pdu::SnmpErrorCode;

/// Crate-wide error type. Variant names track the error kinds named in
/// the error handling design: validation and conflict errors propagate
/// to API-surface callers, everything else is local to a poll/discovery
/// cycle and is logged + persisted rather than bubbled up.
#[derive(Debug, Error)]
pub enum YmError {
    #[error("validation failed: {0:?}")]
    ValidationFailed(Vec<String>),

    #[error("device {device_id} is unreachable")]
    Unreachable { device_id: String },

    #[error("SNMP error: {code:?}")]
    SnmpError { code: SnmpErrorCode },

    #[error("operation timed out")]
    Timeout,

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("notification transport {transport_id} failed: {reason}")]
    TransportFailed { transport_id: String, reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, YmError>;

impl From<sea_orm::DbErr> for YmError {
    fn from(err: sea_orm::DbErr) -> Self {
        YmError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for YmError {
    fn from(err: reqwest::Error) -> Self {
        YmError::TransportFailed {
            transport_id: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}
