//! Layout Extractor
//!
//! Asks the model to describe the reference shelf once and caches the answer
//! in the reference store.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::prompts::PromptTemplates;
use crate::core::reference_store::{sniff_image_mime, ReferenceStore};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::ReferenceLayout;
use crate::providers::gemini::VisionModel;

pub struct LayoutExtractor {
    model: Arc<dyn VisionModel>,
    store: Arc<dyn ReferenceStore>,
    prompts: Arc<PromptTemplates>,
}

impl LayoutExtractor {
    pub fn new(
        model: Arc<dyn VisionModel>,
        store: Arc<dyn ReferenceStore>,
        prompts: Arc<PromptTemplates>,
    ) -> Self {
        Self {
            model,
            store,
            prompts,
        }
    }

    /// Describe `image`, persist the layout, and return it.
    pub async fn extract(&self, image: &[u8]) -> AppResult<ReferenceLayout> {
        let start = Instant::now();
        let mime_type = sniff_image_mime(image);
        info!("🔍 Extracting reference layout ({} bytes, {})", image.len(), mime_type);

        let text = self
            .model
            .generate(self.prompts.extraction(), image, mime_type)
            .await
            .map_err(|e| {
                warn!("❌ Reference extraction failed: {}", e);
                e
            })?;

        if text.trim().is_empty() {
            return Err(AppError::external_service(
                "Model returned an empty reference layout",
            ));
        }

        let layout = ReferenceLayout::new(text);
        self.store.save_layout(&layout).await?;

        info!(
            "✅ Reference layout extracted in {}ms",
            start.elapsed().as_millis()
        );
        Ok(layout)
    }

    /// Store `image` as the new reference and re-extract its layout.
    /// The image stays replaced even when extraction fails.
    pub async fn replace_reference(&self, image: &[u8]) -> AppResult<ReferenceLayout> {
        self.store.save_image(image).await?;
        self.extract(image).await
    }

    /// Extract from whatever image the store currently holds.
    /// `Ok(None)` when there is no reference image.
    pub async fn extract_stored(&self) -> AppResult<Option<ReferenceLayout>> {
        match self.store.load_image().await? {
            Some(image) => self.extract(&image).await.map(Some),
            None => {
                warn!("⚠️ No reference image found");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference_store::MemoryReferenceStore;
    use crate::models::errors::ErrorCode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedModel {
        reply: AppResult<String>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FixedModel {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VisionModel for FixedModel {
        async fn generate(&self, prompt: &str, _image: &[u8], mime_type: &str) -> AppResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), mime_type.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AppError::new(e.code, e.message.clone())),
            }
        }
    }

    fn extractor(model: Arc<FixedModel>, store: Arc<MemoryReferenceStore>) -> LayoutExtractor {
        LayoutExtractor::new(model, store, Arc::new(PromptTemplates::default()))
    }

    #[tokio::test]
    async fn test_extract_persists_layout() {
        let model = Arc::new(FixedModel::ok("Row 1, Position 1: Coca-Cola 1L x6"));
        let store = Arc::new(MemoryReferenceStore::new());

        let layout = extractor(model.clone(), store.clone())
            .extract(&[0xFF, 0xD8, 0xFF, 0xE0])
            .await
            .unwrap();

        assert_eq!(layout.extracted_layout, "Row 1, Position 1: Coca-Cola 1L x6");
        assert_eq!(store.load_layout().await.unwrap(), Some(layout));

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PromptTemplates::default().extraction());
        assert_eq!(calls[0].1, "image/jpeg");
    }

    #[tokio::test]
    async fn test_extract_empty_text_fails() {
        let model = Arc::new(FixedModel::ok("   \n"));
        let store = Arc::new(MemoryReferenceStore::new());

        let err = extractor(model, store.clone()).extract(b"img").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalService);
        assert!(store.load_layout().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_extract_model_error_propagates() {
        let model = Arc::new(FixedModel {
            reply: Err(AppError::external_service("quota exhausted")),
            calls: Mutex::new(Vec::new()),
        });
        let store = Arc::new(MemoryReferenceStore::new());

        let err = extractor(model, store).extract(b"img").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalService);
    }

    #[tokio::test]
    async fn test_extract_stored_without_image() {
        let model = Arc::new(FixedModel::ok("unused"));
        let store = Arc::new(MemoryReferenceStore::new());

        let result = extractor(model.clone(), store).extract_stored().await.unwrap();
        assert!(result.is_none());
        assert!(model.calls.lock().unwrap().is_empty());
    }
}
