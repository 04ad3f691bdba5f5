//! HMAC-SHA256 upload signing.
//!
//! The media host accepts an upload only with a signature over its
//! parameters: `folder=<folder>&timestamp=<unix seconds>`, keyed by the API
//! secret and hex encoded.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use amora_core::storage::object_store::{UploadCredentials, UploadSigner};
use amora_types::error::ObjectStoreError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies upload parameters with a shared secret.
#[derive(Clone)]
pub struct HmacUploadSigner {
    api_key: String,
    api_secret: String,
}

impl HmacUploadSigner {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign `folder` at an explicit timestamp.
    pub fn sign_at(
        &self,
        folder: &str,
        timestamp: i64,
    ) -> Result<UploadCredentials, ObjectStoreError> {
        let mac = self.mac(folder, timestamp)?;
        let signature = hex_encode(&mac.finalize().into_bytes());
        Ok(UploadCredentials {
            api_key: self.api_key.clone(),
            timestamp,
            signature,
        })
    }

    /// Constant-time check of `credentials` for an upload into `folder`.
    pub fn verify(
        &self,
        folder: &str,
        credentials: &UploadCredentials,
    ) -> Result<(), ObjectStoreError> {
        if credentials.api_key != self.api_key {
            return Err(ObjectStoreError::InvalidCredentials(
                "unknown api key".to_string(),
            ));
        }
        let expected =
            hex_decode(&credentials.signature).ok_or(ObjectStoreError::SignatureMismatch)?;
        self.mac(folder, credentials.timestamp)?
            .verify_slice(&expected)
            .map_err(|_| ObjectStoreError::SignatureMismatch)
    }

    fn mac(&self, folder: &str, timestamp: i64) -> Result<HmacSha256, ObjectStoreError> {
        if self.api_secret.is_empty() {
            return Err(ObjectStoreError::InvalidCredentials(
                "api secret is not configured".to_string(),
            ));
        }
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| ObjectStoreError::InvalidCredentials(e.to_string()))?;
        mac.update(string_to_sign(folder, timestamp).as_bytes());
        Ok(mac)
    }
}

impl UploadSigner for HmacUploadSigner {
    fn sign(&self, folder: &str) -> Result<UploadCredentials, ObjectStoreError> {
        self.sign_at(folder, Utc::now().timestamp())
    }
}

/// Parameters covered by the signature, in the host's canonical order.
pub fn string_to_sign(folder: &str, timestamp: i64) -> String {
    format!("folder={folder}&timestamp={timestamp}")
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}
