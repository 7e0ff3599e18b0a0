// store/mod.rs - persistence boundary for entity instances
//
// Handlers only see `EntityStore`; `MemoryStore` is the in-process backend.
// Documents live in one collection per root type, so a query for a type sees
// instances of all its specializations.

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Instance;
use crate::filter::{FilterData, FilterError};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate value for unique field '{field}'")]
    Duplicate { field: String },

    #[error("no stored instance with id '{id}'")]
    NotFound { id: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<FilterError> for StoreError {
    fn from(err: FilterError) -> Self {
        StoreError::InvalidQuery(err.to_string())
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Persist a new instance. Fails with `Duplicate` on an id or unique
    /// attribute collision.
    async fn insert(&self, instance: &Instance) -> Result<(), StoreError>;

    /// Replace the stored instance with the same id. Fails with `NotFound`
    /// when it is no longer stored.
    async fn update(&self, instance: &Instance) -> Result<(), StoreError>;

    async fn find(&self, filter: &FilterData) -> Result<Vec<Instance>, StoreError>;

    async fn find_one(&self, filter: &FilterData) -> Result<Option<Instance>, StoreError> {
        let mut filter = filter.clone();
        filter.limit = Some(1);
        Ok(self.find(&filter).await?.into_iter().next())
    }

    /// Remove the instance; returns whether anything was removed.
    async fn delete(&self, instance: &Instance) -> Result<bool, StoreError>;
}
