//! Driving port shared by the skill, project, experience and education
//! collections.

use async_trait::async_trait;

use crate::domain::{Error, PortfolioRecord, RecordId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortfolioCollection<R: PortfolioRecord>: Send + Sync {
    /// The owner's records in the collection's listing order.
    async fn list(&self, owner: &UserId) -> Result<Vec<R>, Error>;

    /// Validate `input` as a complete record and attach it to the owner.
    async fn create(&self, owner: &UserId, input: R::Input) -> Result<R, Error>;

    async fn get(&self, owner: &UserId, id: &RecordId) -> Result<R, Error>;

    /// Full update: `input` must describe a complete record.
    async fn replace(&self, owner: &UserId, id: &RecordId, input: R::Input) -> Result<R, Error>;

    /// Partial update: `input` is laid over the stored record first.
    async fn patch(&self, owner: &UserId, id: &RecordId, input: R::Input) -> Result<R, Error>;

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), Error>;
}
