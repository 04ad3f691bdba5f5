//! Object store and upload signing traits.
//!
//! Uploads go to an external media host that only accepts signed requests.
//! Signing and uploading are separate ports so the core can gate an upload
//! before any credential is produced. Implementations live in amora-infra.

use amora_types::content::MediaType;
use amora_types::error::ObjectStoreError;

/// Credentials attached to a signed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    pub api_key: String,
    /// Unix seconds the signature was produced at.
    pub timestamp: i64,
    /// Hex signature over the upload parameters.
    pub signature: String,
}

/// A file ready to be handed to the object store.
#[derive(Debug, Clone)]
pub struct ObjectUpload {
    pub folder: String,
    pub file_name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

/// Produces credentials for a signed upload into `folder`.
pub trait UploadSigner: Send + Sync {
    fn sign(&self, folder: &str) -> Result<UploadCredentials, ObjectStoreError>;
}

/// Trait for the external media host.
pub trait ObjectStore: Send + Sync {
    /// Store the object and return its public URL.
    fn upload_signed(
        &self,
        upload: &ObjectUpload,
        credentials: &UploadCredentials,
    ) -> impl std::future::Future<Output = Result<String, ObjectStoreError>> + Send;
}
