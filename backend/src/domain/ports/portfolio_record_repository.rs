//! Port for the four owner-scoped portfolio collections.
//!
//! One trait serves every [`PortfolioRecord`]. The owner is a mandatory
//! argument of every method, so adapters must put the ownership filter in
//! the query itself.

use async_trait::async_trait;

use crate::domain::{PortfolioRecord, RecordId, UserId};

use super::PortfolioPersistenceError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioRecordRepository<R: PortfolioRecord>: Send + Sync {
    /// Every record owned by `owner`, in no particular order.
    async fn list(&self, owner: &UserId) -> Result<Vec<R>, PortfolioPersistenceError>;

    /// One record, provided `owner` owns it.
    async fn find(&self, owner: &UserId, id: &RecordId)
    -> Result<Option<R>, PortfolioPersistenceError>;

    /// Attach a new record to the owner's profile.
    async fn insert(&self, owner: &UserId, draft: &R::Draft)
    -> Result<R, PortfolioPersistenceError>;

    /// Overwrite a record the owner owns; `None` when there is no such row.
    async fn update(
        &self,
        owner: &UserId,
        id: &RecordId,
        draft: &R::Draft,
    ) -> Result<Option<R>, PortfolioPersistenceError>;

    /// Remove a record the owner owns. Returns `false` when nothing matched.
    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<bool, PortfolioPersistenceError>;
}
