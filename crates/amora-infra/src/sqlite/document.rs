//! SQLite document store implementation.
//!
//! Implements `DocumentStore` from `amora-core`. Each document is one row in
//! `documents` with its fields as a JSON object; filters and ordering go
//! through `json_extract`.
//!
//! Ordering mirrors a managed document database: documents lacking the
//! order field are excluded, and an ordered query that also filters on a
//! different field needs a declared composite index, otherwise it fails
//! with `StoreError::IndexMissing`.

use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::Row;
use uuid::Uuid;

use amora_core::repository::SortOrder;
use amora_core::repository::document::{DocumentStore, Query};
use amora_types::content::Document;
use amora_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `DocumentStore`.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: DatabasePool,
}

impl SqliteDocumentStore {
    /// Create a new document store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Declare a composite index so ordered queries on `collection` that
    /// filter on `filter_fields` and order by `order_field` are served.
    pub async fn declare_index(
        &self,
        collection: &str,
        filter_fields: &[&str],
        order_field: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO document_indexes (collection, filter_fields, order_field, created_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (collection, filter_fields, order_field) DO NOTHING"#,
        )
        .bind(collection)
        .bind(index_key(filter_fields.iter().copied()))
        .bind(order_field)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        tracing::info!(collection, order_field, "composite index declared");
        Ok(())
    }

    /// Count documents in a collection.
    pub async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;
        let n: i64 = row.try_get("n").map_err(map_sqlx_error)?;
        Ok(n as u64)
    }

    /// Fails with `IndexMissing` when `query` needs an undeclared index.
    async fn require_index(&self, query: &Query) -> Result<(), StoreError> {
        let Some(order) = &query.order_by else {
            return Ok(());
        };
        let filter_fields: Vec<&str> = query
            .filters
            .iter()
            .map(|f| f.field.as_str())
            .filter(|field| *field != order.field)
            .collect();
        if filter_fields.is_empty() {
            return Ok(());
        }

        let key = index_key(filter_fields.iter().copied());
        let found = sqlx::query(
            "SELECT 1 FROM document_indexes WHERE collection = ? AND filter_fields = ? AND order_field = ?",
        )
        .bind(&query.collection)
        .bind(&key)
        .bind(&order.field)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_error)?;

        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::IndexMissing(format!(
                "{}({key}, {} {})",
                query.collection,
                order.field,
                direction(order.order).to_lowercase()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// SQL parameter for a JSON scalar, matching what `json_extract` returns.
enum Bind {
    Text(String),
    Int(i64),
    Real(f64),
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

fn index_key<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut fields: Vec<&str> = fields.collect();
    fields.sort_unstable();
    fields.dedup();
    fields.join(",")
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(e) => StoreError::Network(e.to_string()),
        other @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
            StoreError::Network(other.to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Query(other.to_string()),
    }
}

/// Build the SELECT for `query`. Returns the SQL and its parameters in order.
fn build_select(query: &Query) -> (String, Vec<Bind>) {
    let mut sql = String::from("SELECT id, collection, fields FROM documents WHERE collection = ?");
    let mut binds = vec![Bind::Text(query.collection.clone())];

    for filter in &query.filters {
        let path = json_path(&filter.field);
        match &filter.value {
            Value::Null => {
                sql.push_str(" AND json_extract(fields, ?) IS NULL");
                binds.push(Bind::Text(path));
            }
            Value::Bool(b) => {
                sql.push_str(" AND json_extract(fields, ?) = ?");
                binds.push(Bind::Text(path));
                binds.push(Bind::Int(i64::from(*b)));
            }
            Value::Number(n) => {
                sql.push_str(" AND json_extract(fields, ?) = ?");
                binds.push(Bind::Text(path));
                match n.as_i64() {
                    Some(i) => binds.push(Bind::Int(i)),
                    None => binds.push(Bind::Real(n.as_f64().unwrap_or(f64::NAN))),
                }
            }
            Value::String(s) => {
                sql.push_str(" AND json_extract(fields, ?) = ?");
                binds.push(Bind::Text(path));
                binds.push(Bind::Text(s.clone()));
            }
            composite => {
                sql.push_str(" AND json(json_extract(fields, ?)) = json(?)");
                binds.push(Bind::Text(path));
                binds.push(Bind::Text(composite.to_string()));
            }
        }
    }

    match &query.order_by {
        Some(order) => {
            let path = json_path(&order.field);
            sql.push_str(" AND json_extract(fields, ?) IS NOT NULL");
            binds.push(Bind::Text(path.clone()));
            sql.push_str(&format!(
                " ORDER BY json_extract(fields, ?) {}, rowid",
                direction(order.order)
            ));
            binds.push(Bind::Text(path));
        }
        None => sql.push_str(" ORDER BY rowid"),
    }

    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        binds.push(Bind::Int(i64::from(limit)));
    }

    (sql, binds)
}

fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<Document, StoreError> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let collection: String = row.try_get("collection").map_err(map_sqlx_error)?;
    let raw: String = row.try_get("fields").map_err(map_sqlx_error)?;
    let fields: Map<String, Value> = serde_json::from_str(&raw)
        .map_err(|e| StoreError::Query(format!("invalid document JSON for {id}: {e}")))?;
    Ok(Document::new(id, collection, fields))
}

// ---------------------------------------------------------------------------
// DocumentStore implementation
// ---------------------------------------------------------------------------

impl DocumentStore for SqliteDocumentStore {
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.require_index(query).await?;

        let (sql, binds) = build_select(query);
        let mut q = sqlx::query(&sql);
        for bind in binds {
            q = match bind {
                Bind::Text(s) => q.bind(s),
                Bind::Int(i) => q.bind(i),
                Bind::Real(f) => q.bind(f),
            };
        }

        let rows = q
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;
        rows.iter().map(row_to_document).collect()
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let id = Uuid::now_v7().to_string();
        let raw = serde_json::to_string(&fields)
            .map_err(|e| StoreError::Query(format!("failed to serialize fields: {e}")))?;

        sqlx::query(
            "INSERT INTO documents (id, collection, fields, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(collection)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(collection, id = %id, "document created");
        Ok(id)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, collection, fields FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_document).transpose()
    }
}
