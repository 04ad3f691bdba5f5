//! Ordered-then-unordered collection reads.
//!
//! 1. Ordered query (order field descending, limited).
//! 2. Empty result: plain limited scan. Recovers documents that lack the
//!    order field, which ordered queries never match.
//! 3. Error (missing index, permission, network): log it and run the same
//!    plain scan.
//!
//! Only a failure of the plain scan reaches the caller, as
//! [`FetchError::Unavailable`]. An empty result is a valid answer.

use std::fmt;

use tokio_util::sync::CancellationToken;

use amora_types::content::Document;
use amora_types::error::FetchError;

use crate::repository::document::{DocumentStore, OrderBy, Query};

use super::feed::FeedKind;

/// Which step produced a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    Ordered,
    /// The ordered query matched nothing.
    UnorderedAfterEmpty,
    /// The ordered query failed.
    UnorderedAfterError,
}

impl FetchPath {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, FetchPath::Ordered)
    }
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPath::Ordered => write!(f, "ordered"),
            FetchPath::UnorderedAfterEmpty => write!(f, "unordered (ordered query empty)"),
            FetchPath::UnorderedAfterError => write!(f, "unordered (ordered query failed)"),
        }
    }
}

/// Documents returned by a fetch and the step that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub documents: Vec<Document>,
    pub path: FetchPath,
}

/// Shared read strategy for content listing screens.
pub struct ResilientCollectionFetcher<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ResilientCollectionFetcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch up to `max_results` documents of `collection`, newest/highest
    /// `order_field` first when possible.
    pub async fn fetch(
        &self,
        collection: &str,
        order_field: &str,
        max_results: u32,
    ) -> Result<Vec<Document>, FetchError> {
        let base = Query::collection(collection).limit(max_results);
        let outcome = self.fetch_query(&base, &OrderBy::desc(order_field)).await?;
        Ok(outcome.documents)
    }

    /// Run the fallback chain for `base` (collection, filters, limit) with
    /// `order_by` applied to the first step only.
    pub async fn fetch_query(
        &self,
        base: &Query,
        order_by: &OrderBy,
    ) -> Result<FetchOutcome, FetchError> {
        let ordered = base.unordered().order_by(order_by.clone());

        let path = match self.store.query(&ordered).await {
            Ok(documents) if !documents.is_empty() => {
                return Ok(FetchOutcome {
                    documents,
                    path: FetchPath::Ordered,
                });
            }
            Ok(_) => {
                tracing::debug!(
                    collection = %base.collection,
                    order_field = %order_by.field,
                    "ordered query empty, falling back to unordered scan"
                );
                FetchPath::UnorderedAfterEmpty
            }
            Err(e) => {
                tracing::warn!(
                    collection = %base.collection,
                    order_field = %order_by.field,
                    error = %e,
                    "ordered query failed, falling back to unordered scan"
                );
                FetchPath::UnorderedAfterError
            }
        };

        let documents = self
            .store
            .query(&base.unordered())
            .await
            .map_err(|source| {
                tracing::error!(
                    collection = %base.collection,
                    error = %source,
                    "unordered scan failed, content unavailable"
                );
                FetchError::Unavailable {
                    collection: base.collection.clone(),
                    source,
                }
            })?;

        Ok(FetchOutcome { documents, path })
    }

    /// Like [`fetch_query`](Self::fetch_query), abandoned as soon as
    /// `cancel` fires. A cancelled fetch never yields documents.
    pub async fn fetch_cancellable(
        &self,
        base: &Query,
        order_by: &OrderBy,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetch_query(base, order_by) => result,
        }
    }

    /// Fetch one of the named listing feeds.
    pub async fn fetch_feed(
        &self,
        feed: FeedKind,
        max_results: Option<u32>,
    ) -> Result<FetchOutcome, FetchError> {
        let (base, order_by) = feed.query(max_results);
        let outcome = self.fetch_query(&base, &order_by).await?;
        tracing::debug!(
            %feed,
            count = outcome.documents.len(),
            path = %outcome.path,
            "feed fetched"
        );
        Ok(outcome)
    }
}
