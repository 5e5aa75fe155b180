//! Core Module - Reference caching & audit logic
//!
//! Reference store (leaf) -> layout extractor -> audit orchestrator.

pub mod auditor;
pub mod compliance;
pub mod extractor;
pub mod prompts;
pub mod reference_store;

pub use auditor::*;
pub use compliance::*;
pub use extractor::*;
pub use prompts::*;
pub use reference_store::*;
