// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use serde::Serialize;
use thiserror::Error;

use crate::core::types::ViewHandle;

/// Code reported for faults the capture subsystem did not classify itself.
pub const UNKNOWN_ERROR_CODE: &str = "capture/unknown";

/// Message reported alongside [`UNKNOWN_ERROR_CODE`].
pub const UNKNOWN_ERROR_MESSAGE: &str =
    "An unexpected error occurred while performing a camera operation";

#[derive(Error, Debug)]
pub enum CameraError {
    /// Typed fault raised by the capture subsystem. `domain` and `id`
    /// together form the machine-parseable error code.
    #[error("{message}")]
    Capture {
        domain: String,
        id: String,
        message: String,
    },

    #[error("Camera view not found for handle {0}")]
    ViewNotFound(ViewHandle),

    #[error("Permission request issued without a permission-capable activity")]
    NoActivity,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CameraError {
    /// Typed capture fault with its own domain and id.
    pub fn capture(
        domain: impl Into<String>,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Capture {
            domain: domain.into(),
            id: id.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CameraError>;

/// Structured error contract crossing the bridge boundary.
///
/// `code` is always `"<domain>/<id>"`. Constructed only here; the dispatch
/// and permission paths never hand a raw fault to the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorRecord {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// The catch-all record for unanticipated faults, with the original
    /// fault preserved for diagnostics.
    pub fn unknown(cause: Option<String>) -> Self {
        Self {
            code: UNKNOWN_ERROR_CODE.into(),
            message: UNKNOWN_ERROR_MESSAGE.into(),
            cause,
        }
    }

    /// JSON form of the record as it crosses the boundary.
    pub fn to_json(&self) -> serde_json::Value {
        // A record of plain strings cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&CameraError> for ErrorRecord {
    fn from(error: &CameraError) -> Self {
        match error {
            CameraError::Capture { domain, id, .. } => {
                Self::new(format!("{domain}/{id}"), error.to_string())
            }
            CameraError::ViewNotFound(_) => Self::new("system/view-not-found", error.to_string()),
            CameraError::NoActivity => Self::new("system/no-activity", error.to_string()),
            CameraError::Other(cause) => Self::unknown(Some(format!("{cause:#}"))),
        }
    }
}

impl From<CameraError> for ErrorRecord {
    fn from(error: CameraError) -> Self {
        Self::from(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_capture_fault_keeps_its_own_code() {
        let record = ErrorRecord::from(CameraError::capture("capture", "session-error", "x"));
        assert_eq!(record.code, "capture/session-error");
        assert_eq!(record.message, "x");
        assert!(record.cause.is_none());
    }

    #[test]
    fn test_view_not_found_references_the_handle() {
        let record = ErrorRecord::from(CameraError::ViewNotFound(ViewHandle(999)));
        assert_eq!(record.code, "system/view-not-found");
        assert!(
            record.message.contains("999"),
            "message should name the requested handle: {}",
            record.message
        );
    }

    #[test]
    fn test_unclassified_fault_maps_to_catch_all_with_cause() {
        let record = ErrorRecord::from(CameraError::from(anyhow::anyhow!("socket hangup")));
        assert_eq!(record.code, UNKNOWN_ERROR_CODE);
        assert_eq!(record.message, UNKNOWN_ERROR_MESSAGE);
        assert_eq!(record.cause.as_deref(), Some("socket hangup"));
    }

    #[test]
    fn test_no_activity_keeps_the_domain_id_shape() {
        let record = ErrorRecord::from(CameraError::NoActivity);
        assert_eq!(record.code, "system/no-activity");
    }

    #[test]
    fn test_cause_is_omitted_from_serialized_records_when_absent() {
        let json = ErrorRecord::new("system/view-not-found", "gone").to_json();
        assert_eq!(json["code"], "system/view-not-found");
        assert!(json.get("cause").is_none());
    }
}
