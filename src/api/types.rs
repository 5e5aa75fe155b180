//! API Request/Response Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::errors::AppError;
use crate::models::types::{AuditResult, ReferenceLayout};

// ============================================
// Audit
// ============================================

/// `POST /audit` success body
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: AuditResult,
}

impl From<AuditResult> for AuditResponse {
    fn from(result: AuditResult) -> Self {
        Self {
            status: "success",
            result,
        }
    }
}

// ============================================
// Reference Upload
// ============================================

/// `POST /admin/upload-reference` success body
#[derive(Debug, Serialize)]
pub struct UploadReferenceResponse {
    pub status: &'static str,
    pub message: String,
    pub layout: ReferenceLayout,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================
// Errors
// ============================================

/// Error payload returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub code: &'static str,
    pub detail: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            status: "error",
            code: err.code_str(),
            detail: err.detail(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
