//! Reference Store
//!
//! One slot for the reference shelf photo and one for its derived layout.
//! Both are overwritten wholesale; there is no versioning and no locking.
//! Concurrent writers race and the last write wins, which is acceptable
//! only because the layout is derived data.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult};
use crate::models::types::ReferenceLayout;
use crate::utils::constants::{FALLBACK_IMAGE_MIME, REFERENCE_IMAGE_FILE, REFERENCE_LAYOUT_FILE};

/// Storage for the reference image and its cached layout
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// True iff a reference image has been persisted
    async fn image_exists(&self) -> AppResult<bool>;

    /// Raw bytes of the reference image, if any
    async fn load_image(&self) -> AppResult<Option<Vec<u8>>>;

    /// Cached layout. `Ok(None)` when nothing is cached,
    /// `Err(MalformedState)` when the cached content does not parse.
    async fn load_layout(&self) -> AppResult<Option<ReferenceLayout>>;

    /// Replace the reference image
    async fn save_image(&self, bytes: &[u8]) -> AppResult<()>;

    /// Replace the cached layout
    async fn save_layout(&self, layout: &ReferenceLayout) -> AppResult<()>;
}

/// Distinguishes temp files of writers in the same process
static TEMP_FILE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path for `target`, unique per call
fn temp_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TEMP_FILE_SEQ.fetch_add(1, Ordering::Relaxed)
    ))
}

/// Best-effort MIME type of a stored reference image
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(FALLBACK_IMAGE_MIME)
}

// ============================================
// File-backed store
// ============================================

/// Reference slot on local disk under a configurable base directory
#[derive(Debug, Clone)]
pub struct FileReferenceStore {
    base_dir: PathBuf,
}

impl FileReferenceStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn image_path(&self) -> PathBuf {
        self.base_dir.join(REFERENCE_IMAGE_FILE)
    }

    pub fn layout_path(&self) -> PathBuf {
        self.base_dir.join(REFERENCE_LAYOUT_FILE)
    }

    /// Write to a sibling temp file, then rename over the target.
    async fn replace_file(&self, target: &Path, bytes: &[u8]) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            AppError::storage(format!("Failed to create {}", self.base_dir.display()), e)
        })?;

        let tmp = temp_path(target);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}", tmp.display()), e))?;

        if let Err(e) = tokio::fs::rename(&tmp, target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(AppError::storage(
                format!("Failed to replace {}", target.display()),
                e,
            ));
        }

        debug!("💾 Replaced {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }
}

#[async_trait]
impl ReferenceStore for FileReferenceStore {
    async fn image_exists(&self) -> AppResult<bool> {
        let path = self.image_path();
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::storage(format!("Failed to stat {}", path.display()), e))
    }

    async fn load_image(&self) -> AppResult<Option<Vec<u8>>> {
        let path = self.image_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage(format!("Failed to read {}", path.display()), e)),
        }
    }

    async fn load_layout(&self) -> AppResult<Option<ReferenceLayout>> {
        let path = self.layout_path();
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::storage(format!("Failed to read {}", path.display()), e))
            }
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AppError::malformed_state(format!("Cached layout {} is malformed", path.display()), e))
    }

    async fn save_image(&self, bytes: &[u8]) -> AppResult<()> {
        self.replace_file(&self.image_path(), bytes).await?;
        info!("🖼️ Reference image saved ({} bytes)", bytes.len());
        Ok(())
    }

    async fn save_layout(&self, layout: &ReferenceLayout) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(layout)?;
        self.replace_file(&self.layout_path(), &json).await?;
        info!("💾 Reference layout saved ({} chars)", layout.extracted_layout.len());
        Ok(())
    }
}

// ============================================
// In-memory store
// ============================================

#[derive(Debug, Default)]
struct MemorySlots {
    image: Option<Vec<u8>>,
    layout: Option<ReferenceLayout>,
}

/// Process-local store, used by tests and embedders that need no disk
#[derive(Debug, Default)]
pub struct MemoryReferenceStore {
    slots: RwLock<MemorySlots>,
}

impl MemoryReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.write().image = Some(bytes.into());
        store
    }

    pub fn with_layout(layout: ReferenceLayout) -> Self {
        let store = Self::new();
        store.write().layout = Some(layout);
        store
    }

    // A poisoned lock still holds whole slot values, so keep using it
    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemorySlots> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemorySlots> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReferenceStore for MemoryReferenceStore {
    async fn image_exists(&self) -> AppResult<bool> {
        Ok(self.read().image.is_some())
    }

    async fn load_image(&self) -> AppResult<Option<Vec<u8>>> {
        Ok(self.read().image.clone())
    }

    async fn load_layout(&self) -> AppResult<Option<ReferenceLayout>> {
        Ok(self.read().layout.clone())
    }

    async fn save_image(&self, bytes: &[u8]) -> AppResult<()> {
        self.write().image = Some(bytes.to_vec());
        Ok(())
    }

    async fn save_layout(&self, layout: &ReferenceLayout) -> AppResult<()> {
        self.write().layout = Some(layout.clone());
        Ok(())
    }
}
