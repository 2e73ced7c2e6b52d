//! Narrow interfaces the lifecycle hooks use to reach the outside world.
//!
//! Every hook receives its collaborators explicitly; default implementations
//! live in [`super::records`], [`super::files`], [`super::hashing`] and
//! [`super::fetch`].

use crate::errors::ServiceError;
use crate::models::StoredFile;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;

/// Field equality filters; a `None` value matches unset fields
pub type Filters = BTreeMap<String, Option<String>>;

/// Builds a single-field filter map
pub fn filter(field: &str, value: Option<&str>) -> Filters {
    let mut filters = Filters::new();
    filters.insert(field.to_string(), value.map(str::to_string));
    filters
}

/// Counts records of a doctype
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordCounter: Send + Sync {
    async fn count(&self, doctype: &str, filters: &Filters) -> Result<u64, ServiceError>;
}

/// Reads one field of one record
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FieldLookup: Send + Sync {
    /// Returns `None` when the record or the field value is missing
    async fn get_field_value(
        &self,
        doctype: &str,
        name: &str,
        fieldname: &str,
    ) -> Result<Option<String>, ServiceError>;
}

/// A request to persist file content
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFile {
    pub file_name: String,
    pub content: Bytes,
    pub attached_to_doctype: String,
    pub attached_to_name: String,
    /// `content` is base64 text (optionally a `data:` URI) to decode first
    pub decode: bool,
    pub is_private: bool,
}

/// Persists binary content and records it as a file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn save_file(&self, request: SaveFile) -> Result<StoredFile, ServiceError>;
}

/// Produces random hex-like strings
#[cfg_attr(test, mockall::automock)]
pub trait HashGenerator: Send + Sync {
    /// Returns exactly `length` characters
    fn generate_hash(&self, namespace: &str, length: usize) -> String;
}

/// Fetches remote content
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Bytes, ServiceError>;
}
