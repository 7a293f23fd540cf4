//! Thumbnail storage on a local filesystem root.
//!
//! Assets are addressed by an opaque key assigned at store time, so the
//! record layer never sees physical paths. Keys are UUIDv7 plus the
//! sanitized extension of the uploaded filename; two uploads sharing an
//! original filename can therefore never overwrite each other, unlike
//! schemes that reuse the caller-supplied name as the storage key.

use std::path::{Path, PathBuf};

use manuals_core::error::CoreError;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Public URL prefix under which stored assets are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Longest extension carried over from an uploaded filename.
const MAX_EXT_LEN: usize = 8;

/// Content storage for thumbnail files under a single root directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Create a store over the given root directory.
    ///
    /// The directory is created lazily on first write; call [`validate`]
    /// at startup to surface filesystem problems early.
    ///
    /// [`validate`]: AssetStore::validate
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory assets are stored under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The public serving path for a stored asset key.
    pub fn public_path(key: &str) -> String {
        format!("{PUBLIC_PREFIX}/{key}")
    }

    /// Round-trip write/read/delete self-check on the storage root.
    ///
    /// Run once at startup so permission errors and missing mounts fail
    /// the process instead of the first upload.
    pub async fn validate(&self) -> Result<(), CoreError> {
        let probe = self.root.join(".health-check");
        let data = b"asset-store-health-check";

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_err("create storage root", &self.root, e))?;
        fs::write(&probe, data)
            .await
            .map_err(|e| storage_err("write probe", &probe, e))?;
        let read_back = fs::read(&probe)
            .await
            .map_err(|e| storage_err("read probe", &probe, e))?;
        if read_back != data {
            return Err(CoreError::Storage(format!(
                "storage root {} failed read-back check",
                self.root.display()
            )));
        }
        fs::remove_file(&probe)
            .await
            .map_err(|e| storage_err("remove probe", &probe, e))?;

        Ok(())
    }

    /// Persist content, returning the assigned asset key.
    ///
    /// The write is atomic: content goes to a temp file which is renamed
    /// into place, so a crash mid-write never leaves a half-written asset
    /// under a resolvable key.
    pub async fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, CoreError> {
        let key = new_key(suggested_name);
        let dest = self.root.join(&key);
        let temp = self.root.join(format!("{key}.tmp"));

        tracing::debug!(asset_key = %key, size = bytes.len(), "Storing asset");

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| storage_err("create storage root", &self.root, e))?;

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| storage_err("create temp file", &temp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| storage_err("write asset", &temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_err("sync asset", &temp, e))?;
        drop(file);

        fs::rename(&temp, &dest)
            .await
            .map_err(|e| storage_err("rename asset into place", &dest, e))?;

        Ok(key)
    }

    /// Resolve a key to the on-disk path of an existing asset.
    ///
    /// Returns `None` for unknown keys and for anything that is not a
    /// plain key (path separators, `..`).
    pub async fn resolve(&self, key: &str) -> Option<PathBuf> {
        if !is_valid_key(key) {
            return None;
        }
        let path = self.root.join(key);
        match fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Remove an asset if present.
    ///
    /// Deleting a nonexistent asset is not an error: it returns `Ok(false)`.
    pub async fn delete(&self, key: &str) -> Result<bool, CoreError> {
        if !is_valid_key(key) {
            return Ok(false);
        }
        let path = self.root.join(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(asset_key = %key, "Asset deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(storage_err("delete asset", &path, e)),
        }
    }
}

/// Assign a fresh key: UUIDv7 plus the sanitized extension of the
/// suggested filename (kept so served content gets a sensible MIME type).
fn new_key(suggested_name: &str) -> String {
    let id = Uuid::now_v7();
    match sanitized_extension(suggested_name) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

fn sanitized_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > MAX_EXT_LEN || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// A key must be a single path component with no traversal.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['/', '\\']) && key != "." && key != ".."
}

fn storage_err(action: &str, path: &Path, err: std::io::Error) -> CoreError {
    tracing::warn!(path = %path.display(), error = %err, "Asset store I/O failure: {action}");
    CoreError::Storage(format!("{action} ({}): {err}", path.display()))
}
