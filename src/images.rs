//! Product image storage: local disk behind a stable `/media/...` reference.

use std::path::PathBuf;

use uuid::Uuid;

use crate::error::{Result, ShopError};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Enforces the extension allow-list before the blob ever reaches the
/// store. Returns the normalized (lowercase) extension.
pub fn validate_extension(filename: &str) -> Result<String> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .ok_or_else(|| ShopError::Validation("image file has no extension".into()))?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ShopError::Validation(format!(
            "unsupported image type .{ext}; allowed: png, jpg, jpeg, gif"
        )));
    }
    Ok(ext)
}

#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes the blob under a fresh name and returns its reference string.
    /// The caller must have validated the extension already.
    pub async fn save(&self, ext: &str, bytes: &[u8]) -> Result<String> {
        let name = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ShopError::Internal(format!("image store unavailable: {e}")))?;
        tokio::fs::write(self.root.join(&name), bytes)
            .await
            .map_err(|e| ShopError::Internal(format!("image write failed: {e}")))?;
        Ok(format!("/media/{name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_allow_list() {
        assert_eq!(validate_extension("photo.PNG").unwrap(), "png");
        assert_eq!(validate_extension("a.b.jpeg").unwrap(), "jpeg");
        assert!(validate_extension("script.exe").is_err());
        assert!(validate_extension("noextension").is_err());
    }
}
