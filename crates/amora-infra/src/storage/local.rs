//! Local media store.
//!
//! Implements `ObjectStore` on the local filesystem. Uploads are accepted only
//! with credentials the shared signer verifies and that are no older than
//! [`MAX_SIGNATURE_AGE_SECS`]. Files land under `{root}/{folder}/` and are
//! addressed through a public base URL.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use amora_core::storage::object_store::{ObjectStore, ObjectUpload, UploadCredentials};
use amora_types::error::ObjectStoreError;

use crate::crypto::signer::HmacUploadSigner;

/// Signatures older than this are refused.
pub const MAX_SIGNATURE_AGE_SECS: i64 = 3600;

/// Filesystem-backed media host.
#[derive(Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
    verifier: HmacUploadSigner,
}

impl LocalObjectStore {
    /// - `root`: directory files are written under
    /// - `public_base_url`: prefix for returned URLs; `None` gives `file://` URLs
    /// - `verifier`: must share the secret of the signer producing credentials
    pub fn new(root: PathBuf, public_base_url: Option<String>, verifier: HmacUploadSigner) -> Self {
        let public_base_url = public_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("file://{}", root.display()));
        Self {
            root,
            public_base_url,
            verifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_freshness(&self, credentials: &UploadCredentials) -> Result<(), ObjectStoreError> {
        let age = Utc::now().timestamp() - credentials.timestamp;
        if age > MAX_SIGNATURE_AGE_SECS {
            return Err(ObjectStoreError::InvalidCredentials(format!(
                "signature expired {age}s ago"
            )));
        }
        Ok(())
    }
}

/// Keep the final path component and replace anything outside
/// `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

impl ObjectStore for LocalObjectStore {
    async fn upload_signed(
        &self,
        upload: &ObjectUpload,
        credentials: &UploadCredentials,
    ) -> Result<String, ObjectStoreError> {
        self.verifier.verify(&upload.folder, credentials)?;
        self.check_freshness(credentials)?;

        let folder = sanitize_file_name(&upload.folder);
        let name = format!("{}-{}", Uuid::now_v7(), sanitize_file_name(&upload.file_name));
        let dir = self.root.join(&folder);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ObjectStoreError::Io(e.to_string()))?;
        tokio::fs::write(dir.join(&name), &upload.bytes)
            .await
            .map_err(|e| ObjectStoreError::Io(e.to_string()))?;

        tracing::debug!(folder = %folder, name = %name, bytes = upload.bytes.len(), "media stored");
        Ok(format!("{}/{folder}/{name}", self.public_base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amora_core::storage::object_store::UploadSigner;
    use amora_types::content::MediaType;

    fn upload() -> ObjectUpload {
        ObjectUpload {
            folder: "amora".to_string(),
            file_name: "../../etc/sunset photo.jpg".to_string(),
            media_type: MediaType::Image,
            bytes: b"jpeg-bytes".to_vec(),
        }
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my clip (1).mp4"), "my_clip__1_.mp4");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn test_signed_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let signer = HmacUploadSigner::new("key", "secret");
        let store = LocalObjectStore::new(
            dir.path().to_path_buf(),
            Some("https://media.test/".to_string()),
            signer.clone(),
        );

        let creds = signer.sign("amora").unwrap();
        let url = store.upload_signed(&upload(), &creds).await.unwrap();

        assert!(url.starts_with("https://media.test/amora/"));
        assert!(url.ends_with("-sunset_photo.jpg"));

        let name = url.rsplit('/').next().unwrap();
        let stored = tokio::fs::read(dir.path().join("amora").join(name)).await.unwrap();
        assert_eq!(stored, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_default_url_is_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let signer = HmacUploadSigner::new("key", "secret");
        let store = LocalObjectStore::new(dir.path().to_path_buf(), None, signer.clone());

        let url = store
            .upload_signed(&upload(), &signer.sign("amora").unwrap())
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
    }

    #[tokio::test]
    async fn test_rejects_foreign_signature() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(
            dir.path().to_path_buf(),
            None,
            HmacUploadSigner::new("key", "secret"),
        );
        let forged = HmacUploadSigner::new("key", "other-secret")
            .sign("amora")
            .unwrap();

        let err = store.upload_signed(&upload(), &forged).await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::SignatureMismatch));
        assert!(!dir.path().join("amora").exists());
    }

    #[tokio::test]
    async fn test_rejects_expired_signature() {
        let dir = tempfile::tempdir().unwrap();
        let signer = HmacUploadSigner::new("key", "secret");
        let store = LocalObjectStore::new(dir.path().to_path_buf(), None, signer.clone());

        let old = Utc::now().timestamp() - MAX_SIGNATURE_AGE_SECS - 10;
        let creds = signer.sign_at("amora", old).unwrap();

        let err = store.upload_signed(&upload(), &creds).await.unwrap_err();
        assert!(matches!(err, ObjectStoreError::InvalidCredentials(_)));
    }
}
