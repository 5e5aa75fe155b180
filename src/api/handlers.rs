//! API Request Handlers

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use super::types::*;
use crate::core::auditor::{ensure_image_mime, ShelfAuditor};
use crate::core::extractor::LayoutExtractor;
use crate::core::prompts::PromptTemplates;
use crate::core::reference_store::ReferenceStore;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::StandardPrices;
use crate::providers::gemini::VisionModel;
use crate::utils::constants::{APP_VERSION, DEFAULT_MAX_UPLOAD_MB, SERVICE_NAME, UPLOAD_FIELD};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Shared application state
pub struct AppState {
    pub auditor: Arc<ShelfAuditor>,
    pub extractor: Arc<LayoutExtractor>,
    pub standard_prices: StandardPrices,
    pub max_upload_bytes: usize,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        model: Arc<dyn VisionModel>,
        store: Arc<dyn ReferenceStore>,
        prompts: PromptTemplates,
        standard_prices: StandardPrices,
    ) -> Self {
        let prompts = Arc::new(prompts);
        let extractor = Arc::new(LayoutExtractor::new(
            model.clone(),
            store.clone(),
            prompts.clone(),
        ));
        let auditor = Arc::new(ShelfAuditor::new(model, store, extractor.clone(), prompts));

        Self {
            auditor,
            extractor,
            standard_prices,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            start_time: Instant::now(),
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// One uploaded file taken from a multipart body
struct Upload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

/// Oversized bodies surface from the multipart parser as 413
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::invalid_input(format!("{}: {}", context, err))
    }
}

/// Pull the `file` field out of the body. The content type is checked before
/// the payload is read.
async fn read_upload(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        ensure_image_mime(&content_type)?;

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read upload", e))?;

        return Ok(Upload {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::invalid_input(format!(
        "Missing '{}' field in upload",
        UPLOAD_FIELD
    )))
}

// ============================================
// Web UI
// ============================================

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    Json(HealthData {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

// ============================================
// Standard Prices
// ============================================

pub async fn get_standards(State(state): State<Arc<AppState>>) -> Json<StandardPrices> {
    Json(state.standard_prices.clone())
}

// ============================================
// Shelf Audit
// ============================================

pub async fn audit_shelf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AuditResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;

    let result = state
        .auditor
        .audit(&upload.bytes, &upload.content_type, &upload.filename)
        .await
        .map_err(|e| {
            error!("❌ Error during analysis of {}: {}", upload.filename, e.detail());
            e
        })?;

    Ok(Json(result.into()))
}

// ============================================
// Reference Upload (admin)
// ============================================

pub async fn upload_reference(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadReferenceResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        "🖼️ New reference image: {} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let layout = state
        .extractor
        .replace_reference(&upload.bytes)
        .await
        .map_err(|e| {
            error!("❌ Error uploading reference: {}", e.detail());
            e
        })?;

    Ok(Json(UploadReferenceResponse {
        status: "success",
        message: "Backend reference image uploaded and analyzed".to_string(),
        layout,
    }))
}
