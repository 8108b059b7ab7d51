//! Generic service for the owner-scoped portfolio collections.
//!
//! One implementation serves skills, projects, experiences and education.
//! Ownership is never checked here: the repository filters every query by
//! owner, so a foreign id simply finds nothing.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    PortfolioCollection, PortfolioPersistenceError, PortfolioRecordRepository,
};
use crate::domain::{Error, PortfolioRecord, RecordId, UserId};

pub(crate) fn map_portfolio_error(error: PortfolioPersistenceError) -> Error {
    match error {
        PortfolioPersistenceError::Connection { message } => {
            Error::store_unavailable("portfolio", &message)
        }
        PortfolioPersistenceError::Query { message } => {
            Error::internal(format!("portfolio repository error: {message}"))
        }
        PortfolioPersistenceError::ProfileMissing => {
            Error::not_found("portfolio profile not found")
        }
    }
}

fn record_not_found<R: PortfolioRecord>() -> Error {
    Error::not_found(format!("{} not found", R::KIND))
}

/// Service implementing [`PortfolioCollection`] for one record type.
pub struct PortfolioCollectionService<R, Repo> {
    repo: Arc<Repo>,
    record: PhantomData<fn() -> R>,
}

impl<R, Repo> Clone for PortfolioCollectionService<R, Repo> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            record: PhantomData,
        }
    }
}

impl<R, Repo> PortfolioCollectionService<R, Repo> {
    pub fn new(repo: Arc<Repo>) -> Self {
        Self {
            repo,
            record: PhantomData,
        }
    }
}

impl<R, Repo> PortfolioCollectionService<R, Repo>
where
    R: PortfolioRecord,
    Repo: PortfolioRecordRepository<R>,
{
    async fn existing(&self, owner: &UserId, id: &RecordId) -> Result<R, Error> {
        self.repo
            .find(owner, id)
            .await
            .map_err(map_portfolio_error)?
            .ok_or_else(record_not_found::<R>)
    }

    async fn store(&self, owner: &UserId, id: &RecordId, draft: &R::Draft) -> Result<R, Error> {
        self.repo
            .update(owner, id, draft)
            .await
            .map_err(map_portfolio_error)?
            .ok_or_else(record_not_found::<R>)
    }
}

#[async_trait]
impl<R, Repo> PortfolioCollection<R> for PortfolioCollectionService<R, Repo>
where
    R: PortfolioRecord,
    Repo: PortfolioRecordRepository<R>,
{
    async fn list(&self, owner: &UserId) -> Result<Vec<R>, Error> {
        let mut records = self.repo.list(owner).await.map_err(map_portfolio_error)?;
        records.sort_by(R::listing_order);
        Ok(records)
    }

    async fn create(&self, owner: &UserId, input: R::Input) -> Result<R, Error> {
        let draft = R::validate(input)?;
        let record = self
            .repo
            .insert(owner, &draft)
            .await
            .map_err(map_portfolio_error)?;
        debug!(owner = %owner, kind = %R::KIND, id = %record.id(), "created portfolio record");
        Ok(record)
    }

    async fn get(&self, owner: &UserId, id: &RecordId) -> Result<R, Error> {
        self.existing(owner, id).await
    }

    async fn replace(&self, owner: &UserId, id: &RecordId, input: R::Input) -> Result<R, Error> {
        // Validation errors win over a missing record only once the record
        // is known to be ours, so foreign ids never leak validation detail.
        self.existing(owner, id).await?;
        let draft = R::validate(input)?;
        self.store(owner, id, &draft).await
    }

    async fn patch(&self, owner: &UserId, id: &RecordId, input: R::Input) -> Result<R, Error> {
        let current = self.existing(owner, id).await?;
        let merged = R::overlay(input, R::to_input(&current.draft()));
        let draft = R::validate(merged)?;
        if draft == current.draft() {
            return Ok(current);
        }
        self.store(owner, id, &draft).await
    }

    async fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), Error> {
        let deleted = self
            .repo
            .delete(owner, id)
            .await
            .map_err(map_portfolio_error)?;
        if deleted {
            debug!(owner = %owner, kind = %R::KIND, id = %id, "deleted portfolio record");
            Ok(())
        } else {
            Err(record_not_found::<R>())
        }
    }
}
