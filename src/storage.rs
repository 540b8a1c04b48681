use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

/// UploadKind
///
/// What kind of media an upload endpoint accepts. Each kind carries its own
/// MIME allow-list and size ceiling; everything outside the list is a 415,
/// everything over the ceiling a 413.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Image => 5 * 1024 * 1024,
            UploadKind::Audio => 25 * 1024 * 1024,
        }
    }

    pub fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => &["image/png", "image/jpeg"],
            UploadKind::Audio => &["audio/mpeg", "audio/mp4", "audio/wav"],
        }
    }

    pub fn accepts(&self, content_type: &str) -> bool {
        self.allowed_types().contains(&content_type)
    }

    /// The canonical file extension for an accepted MIME type.
    pub fn extension_for(&self, content_type: &str) -> Option<&'static str> {
        match content_type {
            "image/png" => Some("png"),
            "image/jpeg" => Some("jpg"),
            "audio/mpeg" => Some("mp3"),
            "audio/mp4" => Some("m4a"),
            "audio/wav" => Some("wav"),
            _ => None,
        }
    }
}

/// Strips an original filename down to a safe stem: everything outside
/// `[A-Za-z0-9_-]` becomes `_`, and any directory components are discarded.
pub fn sanitize_stem(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);
    let stem = name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name);

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Builds the stored filename: sanitized stem, a millisecond timestamp for
/// uniqueness, and the extension derived from the MIME type.
pub fn unique_filename(original: &str, extension: &str, millis: i64) -> String {
    format!("{}-{}.{}", sanitize_stem(original), millis, extension)
}

/// UploadStore
///
/// Contract for persisting uploaded files. The disk implementation below is
/// used in production; tests swap in [`MockUploadStore`] so upload handlers
/// can be exercised without touching the filesystem.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persists `bytes` under `filename` and returns nothing; the public URL
    /// is assembled by the handler from the request host.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), String>;
}

/// The concrete type used to share the upload store across application state.
pub type UploadStoreState = Arc<dyn UploadStore>;

/// LocalDiskStore
///
/// Writes uploads into the configured directory, which the router also
/// serves back under `/uploads`. The directory is created on first use.
#[derive(Clone)]
pub struct LocalDiskStore {
    dir: PathBuf,
}

impl LocalDiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl UploadStore for LocalDiskStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| format!("failed to create uploads dir: {e}"))?;

        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("failed to write upload: {e}"))
    }
}

/// MockUploadStore
///
/// Records saved filenames in memory and can be told to fail, so tests can
/// assert both the happy path and the 500 path of the upload handlers.
#[derive(Clone, Default)]
pub struct MockUploadStore {
    pub should_fail: bool,
    pub saved: Arc<Mutex<Vec<String>>>,
}

impl MockUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl UploadStore for MockUploadStore {
    async fn save(&self, filename: &str, _bytes: &[u8]) -> Result<(), String> {
        if self.should_fail {
            return Err("mock store failure".to_string());
        }
        self.saved.lock().await.push(filename.to_string());
        Ok(())
    }
}
