//! Application state wiring all services together.
//!
//! Services are generic over the port traits; AppState pins them to the
//! concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use amora_core::fetch::ResilientCollectionFetcher;
use amora_core::service::upload::UploadService;
use amora_infra::config::load_config;
use amora_infra::crypto::signer::HmacUploadSigner;
use amora_infra::filesystem::{media_dir, resolve_data_dir};
use amora_infra::notification::FilePermissionProbe;
use amora_infra::sqlite::document::SqliteDocumentStore;
use amora_infra::sqlite::pool::{DatabasePool, database_path, database_url};
use amora_infra::storage::local::LocalObjectStore;
use amora_types::config::AmoraConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteUploadService =
    UploadService<SqliteDocumentStore, LocalObjectStore, HmacUploadSigner>;

pub type ConcreteFetcher = ResilientCollectionFetcher<SqliteDocumentStore>;

/// Key used when no upload API key is configured.
const LOCAL_API_KEY: &str = "local";

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub config: AmoraConfig,
    pub data_dir: PathBuf,
    pub documents: SqliteDocumentStore,
    pub fetcher: Arc<ConcreteFetcher>,
    pub upload_service: Arc<ConcreteUploadService>,
    pub permission_probe: FilePermissionProbe,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;
        Self::init_with(data_dir, config).await
    }

    /// Initialize against an explicit data directory and config.
    pub async fn init_with(data_dir: PathBuf, config: AmoraConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let documents = SqliteDocumentStore::new(db_pool);

        let signer = build_signer(&config);
        let object_store = LocalObjectStore::new(
            media_dir(&data_dir),
            config.uploads.public_base_url.clone(),
            signer.clone(),
        );
        let upload_service = UploadService::new(
            documents.clone(),
            object_store,
            signer,
            config.uploads.folder.clone(),
        );

        Ok(Self {
            fetcher: Arc::new(ResilientCollectionFetcher::new(documents.clone())),
            upload_service: Arc::new(upload_service),
            permission_probe: FilePermissionProbe::new(&data_dir),
            documents,
            data_dir,
            config,
        })
    }

    pub fn media_dir(&self) -> PathBuf {
        media_dir(&self.data_dir)
    }

    pub fn database_path(&self) -> PathBuf {
        database_path(&self.data_dir)
    }
}

/// Signer for the configured credentials.
///
/// Without a configured secret, uploads are signed with a per-process secret
/// shared only with the local media store.
fn build_signer(config: &AmoraConfig) -> HmacUploadSigner {
    let api_key = if config.uploads.api_key.is_empty() {
        LOCAL_API_KEY.to_string()
    } else {
        config.uploads.api_key.clone()
    };

    if config.uploads.api_secret.is_empty() {
        tracing::debug!("no upload secret configured, using a per-process secret");
        HmacUploadSigner::new(api_key, uuid::Uuid::now_v7().simple().to_string())
    } else {
        HmacUploadSigner::new(api_key, config.uploads.api_secret.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use amora_core::fetch::{FeedKind, FetchPath};
    use amora_core::service::plan::assign_plan;
    use amora_core::service::upload::{UploadOutcome, UploadRequest};
    use amora_types::content::MediaType;
    use amora_types::plan::PlanTier;
    use amora_types::upload::Rejection;

    async fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init_with(dir.path().to_path_buf(), AmoraConfig::default())
            .await
            .unwrap();
        (state, dir)
    }

    fn request(user: &str, title: &str) -> UploadRequest {
        UploadRequest {
            creator_id: user.to_string(),
            plan: PlanTier::Free,
            title: title.to_string(),
            file_name: format!("{title}.jpg"),
            media_type: MediaType::Image,
            bytes: vec![7u8; 2048],
            duration_seconds: None,
        }
    }

    #[tokio::test]
    async fn upload_lands_in_media_dir_and_hero_feed() {
        let (state, _dir) = test_state().await;

        let outcome = state
            .upload_service
            .upload(request("ana", "first"), Utc::now())
            .await
            .unwrap();
        let UploadOutcome::Uploaded { asset } = outcome else {
            panic!("expected upload");
        };
        assert!(asset.url.starts_with("file://"));
        assert!(asset.watermarked);

        let feed = state.fetcher.fetch_feed(FeedKind::Hero, None).await.unwrap();
        assert_eq!(feed.path, FetchPath::Ordered);
        assert_eq!(feed.documents.len(), 1);
        assert_eq!(feed.documents[0].id, asset.id);

        let mut entries = tokio::fs::read_dir(state.media_dir().join("amora")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn free_plan_quota_enforced_across_uploads() {
        let (state, _dir) = test_state().await;

        for i in 0..5 {
            let outcome = state
                .upload_service
                .upload(request("ben", &format!("pic{i}")), Utc::now())
                .await
                .unwrap();
            assert!(matches!(outcome, UploadOutcome::Uploaded { .. }));
        }

        let outcome = state
            .upload_service
            .upload(request("ben", "one-too-many"), Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            UploadOutcome::Rejected {
                rejection: Rejection::QuotaExceeded { limit: 5, .. }
            }
        ));

        // Another user's quota is untouched.
        let outcome = state
            .upload_service
            .upload(request("cai", "fresh"), Utc::now())
            .await
            .unwrap();
        assert!(matches!(outcome, UploadOutcome::Uploaded { .. }));
    }

    #[tokio::test]
    async fn explore_feed_falls_back_until_indexed() {
        let (state, _dir) = test_state().await;
        assign_plan(&state.documents, "dee", PlanTier::Pro, Utc::now())
            .await
            .unwrap();
        let plan = state.upload_service.resolve_plan("dee").await.unwrap();
        assert_eq!(plan, PlanTier::Pro);

        let mut req = request("dee", "explorable");
        req.plan = plan;
        state.upload_service.upload(req, Utc::now()).await.unwrap();

        let feed = state.fetcher.fetch_feed(FeedKind::Explore, None).await.unwrap();
        assert_eq!(feed.path, FetchPath::UnorderedAfterError);
        assert_eq!(feed.documents.len(), 1);

        state
            .documents
            .declare_index("content", &["inExplore"], "views")
            .await
            .unwrap();
        let feed = state.fetcher.fetch_feed(FeedKind::Explore, None).await.unwrap();
        assert_eq!(feed.path, FetchPath::Ordered);
        assert_eq!(feed.documents.len(), 1);
    }

    #[test]
    fn signer_falls_back_to_local_key() {
        let signer = build_signer(&AmoraConfig::default());
        assert_eq!(signer.api_key(), "local");
    }
}
