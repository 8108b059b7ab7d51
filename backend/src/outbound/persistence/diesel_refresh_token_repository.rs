//! PostgreSQL-backed refresh token ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RefreshTokenPersistenceError, RefreshTokenRepository};
use crate::domain::{RefreshTokenId, RefreshTokenRecord, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::RefreshTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::refresh_tokens;

/// Diesel-backed implementation of the [`RefreshTokenRepository`] port.
#[derive(Clone)]
pub struct DieselRefreshTokenRepository {
    pool: DbPool,
}

impl DieselRefreshTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RefreshTokenPersistenceError {
    map_basic_pool_error(error, RefreshTokenPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RefreshTokenPersistenceError {
    map_basic_diesel_error(
        error,
        RefreshTokenPersistenceError::query,
        RefreshTokenPersistenceError::connection,
    )
}

impl From<&RefreshTokenRecord> for RefreshTokenRow {
    fn from(record: &RefreshTokenRecord) -> Self {
        Self {
            jti: *record.id.as_uuid(),
            user_id: *record.user_id.as_uuid(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            revoked_at: record.revoked_at,
        }
    }
}

impl From<RefreshTokenRow> for RefreshTokenRecord {
    fn from(row: RefreshTokenRow) -> Self {
        Self {
            id: RefreshTokenId::from(row.jti),
            user_id: UserId::from(row.user_id),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for DieselRefreshTokenRepository {
    async fn record(&self, token: &RefreshTokenRecord) -> Result<(), RefreshTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(refresh_tokens::table)
            .values(RefreshTokenRow::from(token))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(
        &self,
        id: &RefreshTokenId,
    ) -> Result<Option<RefreshTokenRecord>, RefreshTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RefreshTokenRow> = refresh_tokens::table
            .filter(refresh_tokens::jti.eq(id.as_uuid()))
            .select(RefreshTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(RefreshTokenRecord::from))
    }

    async fn revoke(
        &self,
        id: &RefreshTokenId,
        at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let revoked = diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::jti.eq(id.as_uuid()))
                .filter(refresh_tokens::revoked_at.is_null()),
        )
        .set(refresh_tokens::revoked_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(revoked > 0)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<usize, RefreshTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            refresh_tokens::table
                .filter(refresh_tokens::user_id.eq(user_id.as_uuid()))
                .filter(refresh_tokens::revoked_at.is_null()),
        )
        .set(refresh_tokens::revoked_at.eq(Some(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
