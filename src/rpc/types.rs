//! Envelope of the match service's HTTP responses.
//!
//! Successful calls answer `{"result": {"data": <MatchResponse>}}`; failures
//! answer `{"error": {"code": ..., "message": ...}}`.

use serde::{Deserialize, Serialize};

/// Name of the match procedure, appended to the service URL
pub const MATCH_PROCEDURE: &str = "matchPdfSnapshot";

/// Response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ServiceResult<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceResult<T> {
    pub data: T,
}

/// Error object returned by the service
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: serde_json::Value,
    pub message: String,
}

impl ServiceError {
    /// Code as text; services send either numbers or strings
    pub fn code_string(&self) -> String {
        match &self.code {
            serde_json::Value::String(code) => code.clone(),
            serde_json::Value::Null => "UNKNOWN".to_string(),
            other => other.to_string(),
        }
    }
}
