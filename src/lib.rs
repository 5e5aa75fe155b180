//! Shelf-Eye Library
//!
//! Retail shelf compliance audits delegated to a multimodal vision model:
//! - Caches a textual layout of one reference shelf photo
//! - Compares uploaded shelf photos against it (or audits them standalone)
//! - Derives a coarse perfect/issues verdict from the model's report

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    classify_compliance, ensure_image_mime, FileReferenceStore, LayoutExtractor,
    MemoryReferenceStore, PromptKind, PromptTemplates, ReferenceStore, ShelfAuditor,
};
pub use models::{
    AppConfig, AppError, AppResult, AuditResult, ComplianceStatus, ErrorCode, GeminiConfig,
    ReferenceLayout, StandardPrices,
};
pub use providers::{GeminiClient, VisionModel};
