//! Constants Module - Single Source of Truth
//!
//! File names, defaults and marker words used across the service.
//! Other modules import from here instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "shelf-eye-agent";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound model requests
pub const USER_AGENT: &str = concat!("ShelfEye/", env!("CARGO_PKG_VERSION"));

// ============================================
// REFERENCE STORE LAYOUT
// ============================================

/// Default base directory of the reference slot
pub const DEFAULT_REFERENCE_DIR: &str = "backend_reference";

/// Reference image file inside the reference directory
pub const REFERENCE_IMAGE_FILE: &str = "correct_shelf.jpg";

/// Cached layout file inside the reference directory
pub const REFERENCE_LAYOUT_FILE: &str = "layout.json";

/// Standard prices file inside the reference directory
pub const STANDARD_PRICES_FILE: &str = "standard_prices.json";

/// MIME type assumed when the stored reference image cannot be sniffed
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

// ============================================
// MODEL DEFAULTS
// ============================================

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default Generative Language API base URL
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ============================================
// HTTP DEFAULTS
// ============================================

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8080;

/// Default upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// Multipart field carrying the uploaded photo
pub const UPLOAD_FIELD: &str = "file";

// ============================================
// COMPLIANCE
// ============================================

/// Words whose presence in the model's report marks the shelf as compliant.
/// Compared against the upper-cased report.
pub const COMPLIANCE_MARKERS: [&str; 2] = ["EXEMPLARY", "PERFECT"];

// ============================================
// PROMPT TEMPLATES
// ============================================

/// Placeholder replaced by the cached reference layout text
pub const REFERENCE_LAYOUT_PLACEHOLDER: &str = "{reference_layout}";

/// Override file names looked up in the prompt directory
pub const EXTRACTION_PROMPT_FILE: &str = "reference_extraction.txt";
pub const COMPARISON_PROMPT_FILE: &str = "comparison.txt";
pub const STANDALONE_PROMPT_FILE: &str = "standalone.txt";
