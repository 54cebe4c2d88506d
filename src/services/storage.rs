//! Local disk storage for uploaded attachment files.
//!
//! Files live flat under the configured upload directory as
//! `{uuid}_{sanitized original name}` so records can keep the original
//! filename while disk names never collide.

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Upload extensions accepted by the API.
const ALLOWED_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "pdf", "doc", "docx", "txt"];

/// Attachment file store rooted at one directory.
#[derive(Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    pub fn new(root: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&root).map_err(|e| {
            AppError::FileSystem(format!(
                "Failed to create upload directory {}: {}",
                root.display(),
                e
            ))
        })?;
        info!("attachment store ready at {}", root.display());
        Ok(AttachmentStore { root })
    }

    /// Lowercased extension of a filename, if it has one.
    pub fn extension(filename: &str) -> Option<String> {
        let (_, ext) = filename.rsplit_once('.')?;
        if ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }

    /// Whether the filename carries an accepted upload extension.
    pub fn allowed_filename(filename: &str) -> bool {
        match Self::extension(filename) {
            Some(ext) => ALLOWED_EXTENSIONS.contains(&ext.as_str()),
            None => false,
        }
    }

    /// Reduce a client-supplied filename to a safe disk name component:
    /// path prefixes go, whitespace becomes underscores, anything outside
    /// `[A-Za-z0-9._-]` is dropped. Can return an empty string.
    pub fn sanitize_filename(filename: &str) -> String {
        let base = filename.rsplit(['/', '\\']).next().unwrap_or("");
        let cleaned: String = base
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        cleaned.trim_start_matches('.').to_string()
    }

    /// Disk name for a sanitized filename: a fresh UUID prefix keeps
    /// repeated uploads of the same name apart.
    pub fn disk_name(sanitized: &str) -> String {
        format!("{}_{}", Uuid::new_v4(), sanitized)
    }

    /// Content type served for a stored extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Absolute path of a stored file.
    pub fn path_of(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }

    /// Write file bytes under `stored_name`.
    pub async fn save(&self, stored_name: &str, data: &[u8]) -> AppResult<()> {
        let path = self.path_of(stored_name);
        fs::write(&path, data)
            .await
            .map_err(|e| AppError::FileSystem(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// Read a stored file back; `None` when it is gone from disk.
    pub async fn read(&self, stored_name: &str) -> AppResult<Option<Vec<u8>>> {
        let path = self.path_of(stored_name);
        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::FileSystem(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Delete a stored file. A file already gone is not an error; the
    /// record it belonged to is what matters.
    pub async fn remove(&self, stored_name: &str) -> AppResult<()> {
        let path = self.path_of(stored_name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("attachment file {} already absent", path.display());
                Ok(())
            }
            Err(e) => Err(AppError::FileSystem(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
