use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error as ThisError;

/// Store failures a caller needs to tell apart from plain
/// persistence trouble. They travel inside `anyhow::Error`
/// and are recovered with `downcast_ref`.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("a recurring charge already exists for this member and period")]
    DuplicateCharge,
}

#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

#[async_trait]
pub trait Insert<T> {
    async fn insert(&self, item: T) -> Result<T>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Key;
    async fn retrieve(&self, key: Self::Key) -> Result<T>;
}
