//! In-memory implementation of DataSource for testing and development

use crate::core::error::{ApiError, ApiResult, HttpError};
use crate::core::record::Record;
use crate::core::request::Request;
use crate::core::source::DataSource;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Records that carry their own string ID
pub trait Identified {
    fn id(&self) -> String;

    fn set_id(&mut self, id: String);
}

/// How new IDs are minted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// `"1"`, `"2"`, ...
    Sequential,
    /// Random UUID v4
    Uuid,
}

/// In-memory data source
///
/// Keeps records in insertion order behind an `RwLock`, so it is safe to
/// share across concurrent requests. Cloning yields another handle to the
/// same records.
///
/// `find_multiple` returns records in the order the IDs were requested and
/// skips IDs that are not stored.
pub struct InMemorySource<T> {
    records: Arc<RwLock<IndexMap<String, T>>>,
    next_id: Arc<AtomicU64>,
    ids: IdStrategy,
}

impl<T> Clone for InMemorySource<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            next_id: Arc::clone(&self.next_id),
            ids: self.ids,
        }
    }
}

impl<T: Record + Clone + Identified> InMemorySource<T> {
    /// Create an empty source with sequential IDs
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            ids: IdStrategy::Sequential,
        }
    }

    /// Mint UUID v4 IDs instead of sequential ones
    pub fn with_uuid_ids(mut self) -> Self {
        self.ids = IdStrategy::Uuid;
        self
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mint_id(&self) -> String {
        match self.ids {
            IdStrategy::Sequential => self.next_id.fetch_add(1, Ordering::Relaxed).to_string(),
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }

    fn not_found(id: &str) -> ApiError {
        HttpError::not_found(format!(
            "{} with id '{}' not found",
            T::type_name().to_lowercase(),
            id
        ))
        .into()
    }
}

impl<T: Record + Clone + Identified> Default for InMemorySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::internal(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl<T: Record + Clone + Identified> DataSource<T> for InMemorySource<T> {
    async fn find_all(&self, _request: &Request) -> ApiResult<Vec<T>> {
        let records = self.records.read().map_err(poisoned)?;

        Ok(records.values().cloned().collect())
    }

    async fn find_one(&self, id: &str, _request: &Request) -> ApiResult<T> {
        let records = self.records.read().map_err(poisoned)?;

        records.get(id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn find_multiple(&self, ids: &[String], _request: &Request) -> ApiResult<Vec<T>> {
        let records = self.records.read().map_err(poisoned)?;

        Ok(ids
            .iter()
            .filter_map(|id| records.get(id).cloned())
            .collect())
    }

    async fn create(&self, mut record: T) -> ApiResult<String> {
        let id = self.mint_id();
        record.set_id(id.clone());

        let mut records = self.records.write().map_err(poisoned)?;
        records.insert(id.clone(), record);

        Ok(id)
    }

    async fn update(&self, record: T) -> ApiResult<()> {
        let id = record.id();
        let mut records = self.records.write().map_err(poisoned)?;

        let slot = records.get_mut(&id).ok_or_else(|| Self::not_found(&id))?;
        *slot = record;

        Ok(())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut records = self.records.write().map_err(poisoned)?;

        records
            .shift_remove(id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
