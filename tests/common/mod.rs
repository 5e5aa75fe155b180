//! Shared fixtures: a scripted vision model and service wiring.

#![allow(dead_code)]

use async_trait::async_trait;
use shelf_eye::{
    AppError, AppResult, LayoutExtractor, PromptTemplates, ReferenceStore, ShelfAuditor,
    VisionModel,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// JPEG magic bytes followed by filler
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// PNG magic bytes followed by filler
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];

#[derive(Debug, Clone)]
pub struct ModelCall {
    pub prompt: String,
    pub image: Vec<u8>,
    pub mime_type: String,
}

/// Answers extraction prompts with a numbered layout and every other prompt
/// with a fixed report. Records each call.
pub struct ScriptedModel {
    audit_reply: String,
    fail_with: Option<String>,
    fail_extraction: bool,
    delay: Option<Duration>,
    extractions: AtomicUsize,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn replying(audit_reply: &str) -> Self {
        Self {
            audit_reply: audit_reply.to_string(),
            fail_with: None,
            fail_extraction: false,
            delay: None,
            extractions: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::replying("")
        }
    }

    pub fn failing_extraction(mut self) -> Self {
        self.fail_extraction = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn extraction_count(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

/// Layout text produced by the n-th extraction (1-based)
pub fn extracted_layout(n: usize) -> String {
    format!("Row 1, Position 1: Coca-Cola 500ml x6 (extraction #{})", n)
}

#[async_trait]
impl VisionModel for ScriptedModel {
    async fn generate(&self, prompt: &str, image: &[u8], mime_type: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(ModelCall {
            prompt: prompt.to_string(),
            image: image.to_vec(),
            mime_type: mime_type.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.fail_with {
            return Err(AppError::external_service(message.clone()));
        }

        if prompt == PromptTemplates::default().extraction() {
            if self.fail_extraction {
                return Err(AppError::external_service("extraction refused"));
            }
            let n = self.extractions.fetch_add(1, Ordering::SeqCst) + 1;
            return Ok(extracted_layout(n));
        }

        Ok(self.audit_reply.clone())
    }
}

pub struct Service {
    pub auditor: ShelfAuditor,
    pub extractor: Arc<LayoutExtractor>,
}

pub fn service(model: Arc<ScriptedModel>, store: Arc<dyn ReferenceStore>) -> Service {
    let prompts = Arc::new(PromptTemplates::default());
    let extractor = Arc::new(LayoutExtractor::new(
        model.clone(),
        store.clone(),
        prompts.clone(),
    ));
    let auditor = ShelfAuditor::new(model, store, extractor.clone(), prompts);
    Service { auditor, extractor }
}
