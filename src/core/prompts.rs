//! Prompt templates
//!
//! Prompts are data, not code. The defaults are compiled in from
//! `assets/prompts/`; a deployment can override any of them by dropping a
//! file with the same name into the configured prompt directory.

use std::path::Path;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::ReferenceLayout;
use crate::utils::constants::{
    COMPARISON_PROMPT_FILE, EXTRACTION_PROMPT_FILE, REFERENCE_LAYOUT_PLACEHOLDER,
    STANDALONE_PROMPT_FILE,
};

const DEFAULT_EXTRACTION: &str = include_str!("../../assets/prompts/reference_extraction.txt");
const DEFAULT_COMPARISON: &str = include_str!("../../assets/prompts/comparison.txt");
const DEFAULT_STANDALONE: &str = include_str!("../../assets/prompts/standalone.txt");

/// Which template a model call was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Describe the reference shelf
    Extraction,
    /// Audit against the cached reference layout
    Comparison,
    /// Audit with no reference available
    Standalone,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Extraction => "extraction",
            PromptKind::Comparison => "comparison",
            PromptKind::Standalone => "standalone",
        }
    }
}

/// The three prompt templates used by the service
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    extraction: String,
    comparison: String,
    standalone: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extraction: DEFAULT_EXTRACTION.to_string(),
            comparison: DEFAULT_COMPARISON.to_string(),
            standalone: DEFAULT_STANDALONE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Build from explicit template text
    pub fn new(
        extraction: impl Into<String>,
        comparison: impl Into<String>,
        standalone: impl Into<String>,
    ) -> AppResult<Self> {
        let templates = Self {
            extraction: extraction.into(),
            comparison: comparison.into(),
            standalone: standalone.into(),
        };
        templates.validate()?;
        Ok(templates)
    }

    /// Defaults, with any template present in `dir` taking precedence
    pub fn from_dir(dir: &Path) -> AppResult<Self> {
        let mut templates = Self::default();

        for (file, slot) in [
            (EXTRACTION_PROMPT_FILE, &mut templates.extraction),
            (COMPARISON_PROMPT_FILE, &mut templates.comparison),
            (STANDALONE_PROMPT_FILE, &mut templates.standalone),
        ] {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    info!("📝 Prompt override loaded from {}", path.display());
                    *slot = text;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(AppError::storage(
                        format!("Failed to read prompt {}", path.display()),
                        e,
                    ))
                }
            }
        }

        templates.validate()?;
        Ok(templates)
    }

    /// `from_dir` when a directory is configured, defaults otherwise
    pub fn load(dir: Option<&Path>) -> AppResult<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> AppResult<()> {
        if !self.comparison.contains(REFERENCE_LAYOUT_PLACEHOLDER) {
            return Err(AppError::invalid_config(format!(
                "Comparison prompt must contain the {} placeholder",
                REFERENCE_LAYOUT_PLACEHOLDER
            )));
        }
        for (kind, text) in [
            (PromptKind::Extraction, &self.extraction),
            (PromptKind::Comparison, &self.comparison),
            (PromptKind::Standalone, &self.standalone),
        ] {
            if text.trim().is_empty() {
                return Err(AppError::invalid_config(format!(
                    "The {} prompt is empty",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn extraction(&self) -> &str {
        &self.extraction
    }

    pub fn standalone(&self) -> &str {
        &self.standalone
    }

    /// Comparison prompt with the cached layout text embedded verbatim
    pub fn render_comparison(&self, layout: &ReferenceLayout) -> String {
        self.comparison
            .replace(REFERENCE_LAYOUT_PLACEHOLDER, &layout.extracted_layout)
    }
}
