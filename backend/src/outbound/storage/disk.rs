//! Disk-backed `AttachmentStore` adapter.
//!
//! Files are written under a configured root directory with a
//! timestamp-prefixed name, mirroring the layout the static `/uploads`
//! route serves from. The recorded `file_path` is the server-relative
//! path of the written file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::domain::ports::{AttachmentStore, AttachmentStoreError};
use crate::domain::{AttachmentUpload, StoredAttachment};

/// Attachment store writing files beneath a single root directory.
#[derive(Clone)]
pub struct DiskAttachmentStore {
    root: PathBuf,
}

impl DiskAttachmentStore {
    /// Create a store rooted at `root`; the directory is created on the
    /// first write if missing.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory components are dropped and anything outside a conservative
/// character set becomes `_`, so the stored name can be served back
/// verbatim under the static prefix.
fn sanitize_file_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map_or("attachment", |name| name.to_str().unwrap_or("attachment"));
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "attachment".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[async_trait]
impl AttachmentStore for DiskAttachmentStore {
    async fn store(
        &self,
        upload: AttachmentUpload,
    ) -> Result<StoredAttachment, AttachmentStoreError> {
        let file_size = i64::try_from(upload.bytes.len())
            .map_err(|_| AttachmentStoreError::write("attachment exceeds representable size"))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AttachmentStoreError::write(e.to_string()))?;

        let stored_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&upload.original_name)
        );
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| AttachmentStoreError::write(e.to_string()))?;

        debug!(path = %path.display(), size = file_size, "attachment written");
        Ok(StoredAttachment {
            file_name: upload.original_name,
            file_path: path.display().to_string(),
            file_type: upload.content_type,
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.png", "photo.png")]
    #[case("../../etc/passwd", "passwd")]
    #[case("my report (final).pdf", "my_report__final_.pdf")]
    #[case(".hidden", "hidden")]
    #[case("", "attachment")]
    fn file_names_are_reduced_to_safe_components(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_file_name(input), expected);
    }

    #[tokio::test]
    async fn store_writes_bytes_and_records_metadata() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DiskAttachmentStore::new(dir.path());

        let stored = store
            .store(AttachmentUpload {
                original_name: "photo.png".to_owned(),
                content_type: "image/png".to_owned(),
                bytes: vec![1, 2, 3, 4],
            })
            .await
            .expect("store");

        assert_eq!(stored.file_name, "photo.png");
        assert_eq!(stored.file_type, "image/png");
        assert_eq!(stored.file_size, 4);
        let written = tokio::fs::read(&stored.file_path).await.expect("read back");
        assert_eq!(written, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn store_creates_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("uploads");
        let store = DiskAttachmentStore::new(&nested);

        store
            .store(AttachmentUpload {
                original_name: "note.pdf".to_owned(),
                content_type: "application/pdf".to_owned(),
                bytes: vec![0; 16],
            })
            .await
            .expect("store");

        assert!(nested.is_dir());
    }
}
