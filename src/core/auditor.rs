//! Audit Orchestrator
//!
//! One model call per uploaded shelf photo. The only decision made here is
//! which prompt to send: the comparison prompt when a reference layout is
//! available (cached, or extracted on the spot from a stored reference
//! image), the standalone prompt otherwise.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::compliance::classify_compliance;
use crate::core::extractor::LayoutExtractor;
use crate::core::prompts::{PromptKind, PromptTemplates};
use crate::core::reference_store::ReferenceStore;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{AuditResult, ReferenceLayout};
use crate::providers::gemini::VisionModel;

/// Reject anything whose declared content type is not `image/*`.
pub fn ensure_image_mime(mime_type: &str) -> AppResult<()> {
    if mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(AppError::invalid_input("File must be an image"))
    }
}

pub struct ShelfAuditor {
    model: Arc<dyn VisionModel>,
    store: Arc<dyn ReferenceStore>,
    extractor: Arc<LayoutExtractor>,
    prompts: Arc<PromptTemplates>,
}

impl ShelfAuditor {
    pub fn new(
        model: Arc<dyn VisionModel>,
        store: Arc<dyn ReferenceStore>,
        extractor: Arc<LayoutExtractor>,
        prompts: Arc<PromptTemplates>,
    ) -> Self {
        Self {
            model,
            store,
            extractor,
            prompts,
        }
    }

    /// Audit one shelf photo.
    pub async fn audit(&self, image: &[u8], mime_type: &str, filename: &str) -> AppResult<AuditResult> {
        ensure_image_mime(mime_type)?;
        let start = Instant::now();
        info!("🛒 Processing image: {}, size: {} bytes", filename, image.len());

        let reference = self.resolve_reference().await?;
        let (kind, prompt) = self.select_prompt(reference.as_ref());

        info!("🤖 Calling model with {} prompt...", kind.as_str());
        let analysis = self.model.generate(&prompt, image, mime_type).await?;
        if analysis.trim().is_empty() {
            return Err(AppError::external_service("Model returned an empty analysis"));
        }

        let compliance_status = classify_compliance(&analysis);
        info!(
            "{} Analysis completed in {}ms: {}",
            compliance_status.emoji(),
            start.elapsed().as_millis(),
            compliance_status.as_str()
        );

        Ok(AuditResult {
            timestamp: Utc::now(),
            filename: filename.to_string(),
            analysis,
            compliance_status,
            has_reference: reference.is_some(),
        })
    }

    /// Cached layout, or a fresh extraction when only the image is stored.
    ///
    /// A malformed cache is treated as absent. A cache that no longer matches
    /// a manually replaced image is still served.
    pub async fn resolve_reference(&self) -> AppResult<Option<ReferenceLayout>> {
        match self.store.load_layout().await {
            Ok(Some(layout)) => return Ok(Some(layout)),
            Ok(None) => {}
            Err(e) if e.code == ErrorCode::MalformedState => {
                warn!("⚠️ {}; re-extracting", e.detail());
            }
            Err(e) => return Err(e),
        }

        if !self.store.image_exists().await? {
            return Ok(None);
        }

        info!("📭 No cached reference layout, extracting from stored image");
        self.extractor.extract_stored().await
    }

    /// Pick the template for this audit and render it.
    pub fn select_prompt(&self, reference: Option<&ReferenceLayout>) -> (PromptKind, String) {
        match reference {
            Some(layout) => (PromptKind::Comparison, self.prompts.render_comparison(layout)),
            None => (PromptKind::Standalone, self.prompts.standalone().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_image_mime() {
        assert!(ensure_image_mime("image/jpeg").is_ok());
        assert!(ensure_image_mime("image/png").is_ok());
        assert!(ensure_image_mime("IMAGE/WEBP").is_ok());

        for bad in ["text/plain", "application/octet-stream", "", "imagejpeg"] {
            let err = ensure_image_mime(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidInput, "{:?} should be rejected", bad);
        }
    }
}
