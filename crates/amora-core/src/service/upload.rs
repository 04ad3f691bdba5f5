//! Content upload service.
//!
//! Runs an upload end to end: validate the request, gate it against the
//! creator's plan and rolling usage, sign and push the bytes to the object
//! store, then record a `content` document pointing at the public URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

use amora_types::content::{CONTENT_COLLECTION, ContentAsset, MediaType};
use amora_types::error::UploadError;
use amora_types::plan::{PlanFeature, PlanTier};
use amora_types::upload::{Rejection, UploadCandidate, UploadDecision};

use crate::quota::UploadQuotaGate;
use crate::quota::usage::load_usage;
use crate::repository::document::DocumentStore;
use crate::storage::object_store::{ObjectStore, ObjectUpload, UploadSigner};

use super::plan::resolve_plan;

/// A creator's request to publish one file.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub creator_id: String,
    pub plan: PlanTier,
    pub title: String,
    pub file_name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
    /// Probed duration for videos. A video without one is rejected.
    pub duration_seconds: Option<f64>,
}

impl UploadRequest {
    pub fn candidate(&self) -> UploadCandidate {
        UploadCandidate {
            media_type: self.media_type,
            size_bytes: self.bytes.len() as u64,
            duration_seconds: self.duration_seconds,
        }
    }
}

/// Result of an upload that reached a policy decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded { asset: ContentAsset },
    Rejected { rejection: Rejection },
}

/// Service orchestrating gated uploads.
///
/// Generic over the document store, object store, and signer so that
/// amora-core never depends on amora-infra.
pub struct UploadService<D: DocumentStore, O: ObjectStore, G: UploadSigner> {
    documents: D,
    objects: O,
    signer: G,
    folder: String,
}

impl<D: DocumentStore, O: ObjectStore, G: UploadSigner> UploadService<D, O, G> {
    /// - `documents`: content records and usage reads
    /// - `objects`: the media host
    /// - `signer`: produces upload credentials
    /// - `folder`: media host folder uploads land in
    pub fn new(documents: D, objects: O, signer: G, folder: impl Into<String>) -> Self {
        Self {
            documents,
            objects,
            signer,
            folder: folder.into(),
        }
    }

    pub fn documents(&self) -> &D {
        &self.documents
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// The plan currently on record for `creator_id`.
    pub async fn resolve_plan(&self, creator_id: &str) -> Result<PlanTier, UploadError> {
        Ok(resolve_plan(&self.documents, creator_id).await?)
    }

    /// Gate a candidate without uploading anything.
    pub async fn check(
        &self,
        creator_id: &str,
        plan: PlanTier,
        candidate: &UploadCandidate,
        now: DateTime<Utc>,
    ) -> UploadDecision {
        UploadQuotaGate::evaluate_with_lookup(candidate, plan.limits(), || {
            load_usage(&self.documents, creator_id, now)
        })
        .await
    }

    /// Validate, gate, upload, and record a file.
    ///
    /// A policy refusal is `Ok(UploadOutcome::Rejected)`. A usage lookup
    /// failure is `Err(UploadError::UsageUnavailable)`, never a rejection.
    pub async fn upload(
        &self,
        request: UploadRequest,
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome, UploadError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(UploadError::Validation("title cannot be empty".to_string()));
        }
        if request.bytes.is_empty() {
            return Err(UploadError::Validation("no file selected".to_string()));
        }
        if request.creator_id.trim().is_empty() {
            return Err(UploadError::Validation("creator id cannot be empty".to_string()));
        }

        let candidate = request.candidate();
        match self.check(&request.creator_id, request.plan, &candidate, now).await {
            UploadDecision::Allowed => {}
            UploadDecision::Rejected(rejection) => {
                tracing::info!(
                    creator_id = %request.creator_id,
                    plan = %request.plan,
                    code = rejection.code(),
                    "upload rejected"
                );
                return Ok(UploadOutcome::Rejected { rejection });
            }
            UploadDecision::Unavailable { reason } => {
                return Err(UploadError::UsageUnavailable(reason));
            }
        }

        let limits = request.plan.limits();
        let credentials = self.signer.sign(&self.folder)?;
        let upload = ObjectUpload {
            folder: self.folder.clone(),
            file_name: request.file_name.clone(),
            media_type: request.media_type,
            bytes: request.bytes,
        };
        let url = self.objects.upload_signed(&upload, &credentials).await?;

        let mut asset = ContentAsset {
            id: String::new(),
            creator_id: request.creator_id,
            created_at: now,
            media_type: request.media_type,
            url,
            title: title.to_string(),
            views: 0,
            likes: 0,
            in_explore: limits.has_feature(PlanFeature::Explore),
            size_bytes: candidate.size_bytes,
            duration_seconds: request.duration_seconds,
            watermarked: request.media_type == MediaType::Image
                && limits.has_feature(PlanFeature::Watermark),
        };

        let fields = asset
            .to_fields()
            .map_err(|e| UploadError::Validation(format!("content record: {e}")))?;
        asset.id = self
            .documents
            .create_document(CONTENT_COLLECTION, fields)
            .await?;

        tracing::info!(
            id = %asset.id,
            creator_id = %asset.creator_id,
            media_type = %asset.media_type,
            size_bytes = asset.size_bytes,
            "content uploaded"
        );
        Ok(UploadOutcome::Uploaded { asset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use chrono::{TimeDelta, TimeZone};
    use serde_json::{Map, Value};

    use amora_types::content::Document;
    use amora_types::error::{ObjectStoreError, StoreError};
    use amora_types::upload::BYTES_PER_MB;

    use crate::repository::document::Query;
    use crate::storage::object_store::UploadCredentials;

    #[derive(Clone, Default)]
    struct MockDocuments {
        docs: Arc<Mutex<Vec<Document>>>,
        fail_reads: bool,
    }

    impl DocumentStore for MockDocuments {
        fn query(
            &self,
            query: &Query,
        ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send {
            let result = if self.fail_reads {
                Err(StoreError::Network("offline".to_string()))
            } else {
                let docs = self.docs.lock().unwrap();
                Ok(docs
                    .iter()
                    .filter(|d| d.collection == query.collection)
                    .filter(|d| {
                        query
                            .filters
                            .iter()
                            .all(|f| d.get(&f.field) == Some(&f.value))
                    })
                    .cloned()
                    .collect())
            };
            async move { result }
        }

        fn create_document(
            &self,
            collection: &str,
            fields: Map<String, Value>,
        ) -> impl Future<Output = Result<String, StoreError>> + Send {
            let mut docs = self.docs.lock().unwrap();
            let id = format!("doc-{}", docs.len() + 1);
            docs.push(Document::new(id.clone(), collection, fields));
            async move { Ok(id) }
        }

        fn get_document(
            &self,
            collection: &str,
            id: &str,
        ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send {
            let found = self
                .docs
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.collection == collection && d.id == id)
                .cloned();
            async move { Ok(found) }
        }
    }

    #[derive(Clone, Default)]
    struct MockObjects {
        uploads: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ObjectStore for MockObjects {
        fn upload_signed(
            &self,
            upload: &ObjectUpload,
            credentials: &UploadCredentials,
        ) -> impl Future<Output = Result<String, ObjectStoreError>> + Send {
            let result = if credentials.signature == "good" {
                self.uploads
                    .lock()
                    .unwrap()
                    .push((upload.folder.clone(), upload.file_name.clone()));
                Ok(format!(
                    "https://media.test/{}/{}",
                    upload.folder, upload.file_name
                ))
            } else {
                Err(ObjectStoreError::SignatureMismatch)
            };
            async move { result }
        }
    }

    struct MockSigner {
        signature: &'static str,
    }

    impl UploadSigner for MockSigner {
        fn sign(&self, _folder: &str) -> Result<UploadCredentials, ObjectStoreError> {
            Ok(UploadCredentials {
                api_key: "key".to_string(),
                timestamp: 1_700_000_000,
                signature: self.signature.to_string(),
            })
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn service(
        documents: MockDocuments,
        objects: MockObjects,
    ) -> UploadService<MockDocuments, MockObjects, MockSigner> {
        UploadService::new(documents, objects, MockSigner { signature: "good" }, "amora")
    }

    fn image_request(plan: PlanTier, size_bytes: usize) -> UploadRequest {
        UploadRequest {
            creator_id: "user-1".to_string(),
            plan,
            title: "Golden hour".to_string(),
            file_name: "sunset.jpg".to_string(),
            media_type: MediaType::Image,
            bytes: vec![0u8; size_bytes],
            duration_seconds: None,
        }
    }

    fn seed_images(documents: &MockDocuments, count: usize, at: DateTime<Utc>) {
        for i in 0..count {
            let asset = ContentAsset {
                id: String::new(),
                creator_id: "user-1".to_string(),
                created_at: at,
                media_type: MediaType::Image,
                url: format!("https://media.test/amora/{i}.jpg"),
                title: format!("old {i}"),
                views: 0,
                likes: 0,
                in_explore: false,
                size_bytes: 10,
                duration_seconds: None,
                watermarked: true,
            };
            documents.docs.lock().unwrap().push(Document::new(
                format!("seed-{i}"),
                CONTENT_COLLECTION,
                asset.to_fields().unwrap(),
            ));
        }
    }

    #[tokio::test]
    async fn test_upload_records_content() {
        let documents = MockDocuments::default();
        let objects = MockObjects::default();
        let svc = service(documents.clone(), objects.clone());

        let outcome = svc.upload(image_request(PlanTier::Pro, 1024), now()).await.unwrap();
        let UploadOutcome::Uploaded { asset } = outcome else {
            panic!("expected upload, got {outcome:?}");
        };

        assert_eq!(asset.id, "doc-1");
        assert_eq!(asset.url, "https://media.test/amora/sunset.jpg");
        assert!(asset.in_explore);
        assert!(!asset.watermarked);
        assert_eq!(objects.uploads.lock().unwrap().len(), 1);

        let stored = svc
            .documents()
            .get_document(CONTENT_COLLECTION, "doc-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ContentAsset::from_document(&stored).unwrap(), asset);
    }

    #[tokio::test]
    async fn test_free_plan_images_are_watermarked() {
        let svc = service(MockDocuments::default(), MockObjects::default());
        let outcome = svc.upload(image_request(PlanTier::Free, 1024), now()).await.unwrap();
        let UploadOutcome::Uploaded { asset } = outcome else {
            panic!("expected upload");
        };
        assert!(asset.watermarked);
        assert!(!asset.in_explore);
    }

    #[tokio::test]
    async fn test_free_videos_are_not_watermarked() {
        let svc = service(MockDocuments::default(), MockObjects::default());
        let request = UploadRequest {
            media_type: MediaType::Video,
            file_name: "clip.mp4".to_string(),
            duration_seconds: Some(30.0),
            ..image_request(PlanTier::Free, 2048)
        };
        let outcome = svc.upload(request, now()).await.unwrap();
        let UploadOutcome::Uploaded { asset } = outcome else {
            panic!("expected upload");
        };
        assert!(!asset.watermarked);
        assert_eq!(asset.duration_seconds, Some(30.0));
    }

    #[tokio::test]
    async fn test_video_without_duration_is_rejected() {
        let objects = MockObjects::default();
        let svc = service(MockDocuments::default(), objects.clone());

        for duration_seconds in [None, Some(f64::NAN)] {
            let request = UploadRequest {
                media_type: MediaType::Video,
                file_name: "long.mp4".to_string(),
                duration_seconds,
                ..image_request(PlanTier::Elite, 2048)
            };
            let outcome = svc.upload(request, now()).await.unwrap();
            assert!(matches!(
                outcome,
                UploadOutcome::Rejected {
                    rejection: Rejection::DurationUnknown
                }
            ));
        }
        assert!(objects.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let svc = service(MockDocuments::default(), MockObjects::default());

        let mut blank_title = image_request(PlanTier::Free, 10);
        blank_title.title = "   ".to_string();
        assert!(matches!(
            svc.upload(blank_title, now()).await,
            Err(UploadError::Validation(_))
        ));

        let empty_file = image_request(PlanTier::Free, 0);
        assert!(matches!(
            svc.upload(empty_file, now()).await,
            Err(UploadError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_without_upload() {
        let objects = MockObjects::default();
        let svc = service(MockDocuments::default(), objects.clone());

        let request = image_request(PlanTier::Free, (6 * BYTES_PER_MB) as usize);
        let outcome = svc.upload(request, now()).await.unwrap();

        assert!(matches!(
            outcome,
            UploadOutcome::Rejected {
                rejection: Rejection::SizeExceeded { limit_mb: 5, .. }
            }
        ));
        assert!(objects.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_weekly_quota_counts_recent_uploads_only() {
        let documents = MockDocuments::default();
        seed_images(&documents, 5, now() - TimeDelta::days(8));
        let svc = service(documents.clone(), MockObjects::default());

        // Old uploads are outside the window.
        let outcome = svc.upload(image_request(PlanTier::Free, 10), now()).await.unwrap();
        assert!(matches!(outcome, UploadOutcome::Uploaded { .. }));

        seed_images(&documents, 4, now() - TimeDelta::days(1));
        let outcome = svc.upload(image_request(PlanTier::Free, 10), now()).await.unwrap();
        assert!(matches!(
            outcome,
            UploadOutcome::Rejected {
                rejection: Rejection::QuotaExceeded { limit: 5, remaining: 0, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_usage_lookup_failure_is_not_a_rejection() {
        let documents = MockDocuments {
            fail_reads: true,
            ..Default::default()
        };
        let objects = MockObjects::default();
        let svc = service(documents, objects.clone());

        let result = svc.upload(image_request(PlanTier::Pro, 10), now()).await;
        assert!(matches!(result, Err(UploadError::UsageUnavailable(_))));
        assert!(objects.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_signature_failure_surfaces_object_store_error() {
        let documents = MockDocuments::default();
        let svc = UploadService::new(
            documents.clone(),
            MockObjects::default(),
            MockSigner { signature: "bad" },
            "amora",
        );

        let result = svc.upload(image_request(PlanTier::Pro, 10), now()).await;
        assert!(matches!(
            result,
            Err(UploadError::ObjectStore(ObjectStoreError::SignatureMismatch))
        ));
        assert!(documents.docs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_plan_reads_user_records() {
        let documents = MockDocuments::default();
        let svc = service(documents.clone(), MockObjects::default());
        assert_eq!(svc.resolve_plan("user-1").await.unwrap(), PlanTier::Free);

        crate::service::plan::assign_plan(svc.documents(), "user-1", PlanTier::Creator, now())
            .await
            .unwrap();
        assert_eq!(svc.resolve_plan("user-1").await.unwrap(), PlanTier::Creator);
    }

    #[tokio::test]
    async fn test_check_unlimited_plan_ignores_usage() {
        let documents = MockDocuments::default();
        seed_images(&documents, 50, now() - TimeDelta::hours(1));
        let svc = service(documents, MockObjects::default());

        let decision = svc
            .check("user-1", PlanTier::Elite, &UploadCandidate::image(1024), now())
            .await;
        assert_eq!(decision, UploadDecision::Allowed);
    }
}
