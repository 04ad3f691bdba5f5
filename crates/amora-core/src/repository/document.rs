//! Document store trait definition.
//!
//! Models the subset of a managed document database Amora relies on:
//! equality filters, a single ordering clause, a result cap, and document
//! creation. Implementations live in amora-infra.

use serde_json::{Map, Value};

use amora_types::content::Document;
use amora_types::error::StoreError;

use super::SortOrder;

/// An equality filter (`field == value`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// A single ordering clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub order: SortOrder,
}

impl OrderBy {
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }
}

/// A query against one collection.
///
/// An ordered query only matches documents that carry the order field,
/// mirroring how managed document stores treat ordering clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    /// Maximum number of documents. `None` scans the whole match set.
    pub limit: Option<u32>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The same query with its ordering clause removed.
    pub fn unordered(&self) -> Self {
        Self {
            order_by: None,
            ..self.clone()
        }
    }
}

/// Trait for the external document store.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait DocumentStore: Send + Sync {
    /// Run a query. Fails distinctly for a missing index, a permission
    /// problem, or a network problem.
    fn query(
        &self,
        query: &Query,
    ) -> impl std::future::Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Create a document and return its id.
    fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> impl std::future::Future<Output = Result<String, StoreError>> + Send;

    /// Fetch a single document by id.
    fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Document>, StoreError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_collects_clauses() {
        let query = Query::collection("content")
            .filter(Filter::eq("inExplore", true))
            .order_by(OrderBy::desc("views"))
            .limit(30);

        assert_eq!(query.collection, "content");
        assert_eq!(query.filters, vec![Filter::eq("inExplore", true)]);
        assert_eq!(query.order_by, Some(OrderBy::desc("views")));
        assert_eq!(query.limit, Some(30));
    }

    #[test]
    fn unordered_keeps_filters_and_limit() {
        let query = Query::collection("content")
            .filter(Filter::eq("creatorId", "u1"))
            .order_by(OrderBy::asc("createdAt"))
            .limit(5);
        let plain = query.unordered();

        assert!(plain.order_by.is_none());
        assert_eq!(plain.filters, query.filters);
        assert_eq!(plain.limit, Some(5));
    }
}
