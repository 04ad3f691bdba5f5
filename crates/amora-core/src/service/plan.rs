//! Plan records.
//!
//! A user's plan lives on documents in the `users` collection
//! (`{ uid, plan, updatedAt }`). Assigning a plan appends a record; the most
//! recently updated one wins. A user without records is on the free plan.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use amora_types::error::StoreError;
use amora_types::plan::{PlanTier, USERS_COLLECTION};

use crate::repository::document::{DocumentStore, Filter, Query};

/// Resolve the plan tier for `uid`.
pub async fn resolve_plan<S: DocumentStore>(store: &S, uid: &str) -> Result<PlanTier, StoreError> {
    let query = Query::collection(USERS_COLLECTION).filter(Filter::eq("uid", uid));
    let records = store.query(&query).await?;

    let latest = records
        .iter()
        .max_by_key(|doc| doc.get("updatedAt").and_then(Value::as_i64).unwrap_or(i64::MIN));
    let plan = PlanTier::from_record(latest.and_then(|doc| doc.get("plan")).and_then(Value::as_str));

    tracing::debug!(uid, %plan, records = records.len(), "plan resolved");
    Ok(plan)
}

/// Record `tier` as the current plan for `uid`.
pub async fn assign_plan<S: DocumentStore>(
    store: &S,
    uid: &str,
    tier: PlanTier,
    now: DateTime<Utc>,
) -> Result<String, StoreError> {
    let mut fields = Map::new();
    fields.insert("uid".to_string(), json!(uid));
    fields.insert("plan".to_string(), json!(tier.to_string()));
    fields.insert("updatedAt".to_string(), json!(now.timestamp_millis()));

    let id = store.create_document(USERS_COLLECTION, fields).await?;
    tracing::info!(uid, plan = %tier, "plan assigned");
    Ok(id)
}
