//! Content types.
//!
//! Content assets are owned by the external document store. Amora only reads
//! and writes them through store calls, so the on-store shape (camelCase
//! field names, millisecond timestamps) is fixed here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use std::fmt;
use std::str::FromStr;

/// Collection holding gallery and feed content.
pub const CONTENT_COLLECTION: &str = "content";

/// Collection holding story clips.
pub const STORIES_COLLECTION: &str = "stories";

/// Kind of media in an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            other => Err(format!("invalid media type: '{other}'")),
        }
    }
}

/// An opaque document-store record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, collection: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            collection: collection.into(),
            fields,
        }
    }

    /// Look up a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Whether the document carries a non-null value for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_null())
    }
}

/// A piece of uploaded content as stored in the `content` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAsset {
    /// Document id; assigned by the store, never written as a field.
    #[serde(skip)]
    pub id: String,
    pub creator_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub media_type: MediaType,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub in_explore: bool,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub watermarked: bool,
}

impl ContentAsset {
    /// Serialize into document fields (the id is not a field).
    pub fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "content asset serialized to non-object: {other}"
            ))),
        }
    }

    /// Read an asset back from a store document.
    pub fn from_document(doc: &Document) -> Result<Self, serde_json::Error> {
        let mut asset: ContentAsset = serde_json::from_value(Value::Object(doc.fields.clone()))?;
        asset.id = doc.id.clone();
        Ok(asset)
    }
}
