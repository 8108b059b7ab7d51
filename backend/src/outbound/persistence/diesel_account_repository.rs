//! PostgreSQL-backed `AccountRepository` implementation using Diesel ORM.
//!
//! Registration writes the identity row, its contact profile and its empty
//! portfolio profile in one transaction so no identity ever exists without
//! both profiles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    AccountPersistenceError, AccountRepository, NewAccount, StoredCredentials,
};
use crate::domain::{
    Account, AccountPatch, ContactDetails, EmailAddress, FullName, PasswordHash, ProfileId,
    ResetTokenDigest, User, UserId, Username,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, violated_unique_constraint,
};
use super::models::{
    ContactChangeset, ContactRow, CredentialRow, NewContactRow, NewPortfolioProfileRow,
    NewUserRow, UserChangeset, UserRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{identity_profiles, portfolio_profiles, users};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the [`AccountRepository`] port.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AccountPersistenceError {
    map_basic_pool_error(error, AccountPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AccountPersistenceError {
    match violated_unique_constraint(&error) {
        Some(USERNAME_CONSTRAINT) => return AccountPersistenceError::duplicate_username(),
        Some(EMAIL_CONSTRAINT) => return AccountPersistenceError::duplicate_email(),
        _ => {}
    }
    map_basic_diesel_error(
        error,
        AccountPersistenceError::query,
        AccountPersistenceError::connection,
    )
}

/// Rebuild a domain user from a stored row.
///
/// Rows were validated on the way in; a row that no longer validates is
/// reported as a query failure rather than silently altered.
pub(super) fn row_to_user(row: UserRow) -> Result<User, AccountPersistenceError> {
    let invalid = |field: &str, err: crate::domain::UserValidationError| {
        warn!(user_id = %row.id, field, error = %err, "stored user row failed validation");
        AccountPersistenceError::query(format!("stored {field} is invalid"))
    };
    let username = Username::new(&row.username).map_err(|err| invalid("username", err))?;
    let email = EmailAddress::new(&row.email).map_err(|err| invalid("email", err))?;
    let full_name = FullName::new(&row.full_name).map_err(|err| invalid("full name", err))?;
    Ok(User::new(
        UserId::from(row.id),
        username,
        email,
        full_name,
        row.created_at,
    ))
}

fn row_to_credentials(row: CredentialRow) -> Result<StoredCredentials, AccountPersistenceError> {
    Ok(StoredCredentials {
        user: row_to_user(row.user)?,
        password_hash: PasswordHash::from_phc(row.password_hash),
    })
}

fn row_to_contact(row: ContactRow) -> ContactDetails {
    ContactDetails {
        title: row.title,
        bio: row.bio,
        location: row.location,
        website: row.website,
        phone: row.phone,
    }
}

fn into_account(row: (UserRow, ContactDetails)) -> Result<Account, AccountPersistenceError> {
    let (user, contact) = row;
    Ok(Account {
        user: row_to_user(user)?,
        contact,
    })
}

/// Identity row joined with its contact profile. Usable inside transactions.
async fn load_account<C>(
    conn: &mut C,
    id: Uuid,
) -> Result<Option<(UserRow, ContactDetails)>, diesel::result::Error>
where
    C: AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let row: Option<(UserRow, Option<ContactRow>)> = users::table
        .left_join(identity_profiles::table)
        .filter(users::id.eq(id))
        .select((UserRow::as_select(), Option::<ContactRow>::as_select()))
        .first(conn)
        .await
        .optional()?;
    Ok(row.map(|(user, contact)| (user, contact.map(row_to_contact).unwrap_or_default())))
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn create(&self, account: &NewAccount) -> Result<Account, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *account.id.as_uuid();
        let new_user = NewUserRow {
            id,
            username: account.username.as_str(),
            email: account.email.as_str(),
            password_hash: account.password_hash.as_str(),
            full_name: account.full_name.as_str(),
        };

        let created = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&new_user)
                        .execute(conn)
                        .await?;
                    diesel::insert_into(identity_profiles::table)
                        .values(&NewContactRow { user_id: id })
                        .execute(conn)
                        .await?;
                    diesel::insert_into(portfolio_profiles::table)
                        .values(&NewPortfolioProfileRow {
                            id: *ProfileId::random().as_uuid(),
                            user_id: id,
                        })
                        .execute(conn)
                        .await?;
                    load_account(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        created
            .ok_or_else(|| AccountPersistenceError::query("created account could not be read back"))
            .and_then(into_account)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_account(&mut conn, *id.as_uuid())
            .await
            .map_err(map_diesel_error)?
            .map(into_account)
            .transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialRow> = users::table
            .filter(users::username.eq(username))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn username_taken(
        &self,
        username: &Username,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .filter(users::username.eq(username.as_str()))
            .select(users::id)
            .into_boxed();
        if let Some(except) = except {
            query = query.filter(users::id.ne(*except.as_uuid()));
        }
        let found: Option<Uuid> = query
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn email_taken(
        &self,
        email: &EmailAddress,
        except: Option<UserId>,
    ) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .filter(users::email.eq(email.as_str()))
            .select(users::id)
            .into_boxed();
        if let Some(except) = except {
            query = query.filter(users::id.ne(*except.as_uuid()));
        }
        let found: Option<Uuid> = query
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(found.is_some())
    }

    async fn update(
        &self,
        id: &UserId,
        patch: &AccountPatch,
    ) -> Result<Option<Account>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        let now = Utc::now();
        let identity = UserChangeset {
            username: patch.username.as_ref().map(Username::as_str),
            email: patch.email.as_ref().map(EmailAddress::as_str),
            full_name: patch.full_name.as_ref().map(FullName::as_str),
            updated_at: now,
        };
        let contact = ContactChangeset {
            title: patch.title.as_deref(),
            bio: patch.bio.as_deref(),
            location: patch.location.as_deref(),
            website: patch.website.as_deref(),
            phone: patch.phone.as_deref(),
            updated_at: now,
        };

        conn.transaction(|conn| {
            async move {
                let touched = diesel::update(users::table.filter(users::id.eq(id)))
                    .set(&identity)
                    .execute(conn)
                    .await?;
                if touched == 0 {
                    return Ok(None);
                }
                diesel::update(identity_profiles::table.filter(identity_profiles::user_id.eq(id)))
                    .set(&contact)
                    .execute(conn)
                    .await?;
                load_account(conn, id).await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?
        .map(into_account)
        .transpose()
    }

    async fn set_password(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::password_hash.eq(hash.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn store_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(identity_profiles::table.filter(identity_profiles::user_id.eq(id.as_uuid())))
            .set((
                identity_profiles::reset_token_digest.eq(Some(digest.as_str())),
                identity_profiles::reset_token_expires_at.eq(Some(expires_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn credentials_by_reset_token(
        &self,
        digest: &ResetTokenDigest,
        now: DateTime<Utc>,
    ) -> Result<Option<StoredCredentials>, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CredentialRow> = users::table
            .inner_join(identity_profiles::table)
            .filter(identity_profiles::reset_token_digest.eq(digest.as_str()))
            .filter(identity_profiles::reset_token_expires_at.gt(now))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_credentials).transpose()
    }

    async fn consume_reset_token(
        &self,
        id: &UserId,
        digest: &ResetTokenDigest,
        hash: &PasswordHash,
    ) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        let digest = digest.as_str().to_owned();
        let hash = hash.as_str().to_owned();

        conn.transaction(|conn| {
            async move {
                // Clearing the digest first makes a second confirm match no row.
                let cleared = diesel::update(
                    identity_profiles::table
                        .filter(identity_profiles::user_id.eq(id))
                        .filter(identity_profiles::reset_token_digest.eq(&digest)),
                )
                .set((
                    identity_profiles::reset_token_digest.eq(None::<String>),
                    identity_profiles::reset_token_expires_at.eq(None::<DateTime<Utc>>),
                ))
                .execute(conn)
                .await?;
                if cleared == 0 {
                    return Ok(false);
                }
                diesel::update(users::table.filter(users::id.eq(id)))
                    .set((
                        users::password_hash.eq(&hash),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)
                    .await?;
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, AccountPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for account repository error mapping.
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    use super::*;

    #[derive(Debug)]
    struct UniqueViolation(&'static str);

    impl DatabaseErrorInformation for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("users")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[rstest]
    #[case(USERNAME_CONSTRAINT, AccountPersistenceError::DuplicateUsername)]
    #[case(EMAIL_CONSTRAINT, AccountPersistenceError::DuplicateEmail)]
    fn unique_violations_map_to_duplicate_errors(
        #[case] constraint: &'static str,
        #[case] expected: AccountPersistenceError,
    ) {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(UniqueViolation(constraint)),
        );
        assert_eq!(map_diesel_error(error), expected);
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let mapped = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(mapped, AccountPersistenceError::Connection { .. }));
    }

    #[rstest]
    fn invalid_stored_rows_are_query_errors() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "has space".to_owned(),
            email: "a@x.com".to_owned(),
            full_name: String::new(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            row_to_user(row),
            Err(AccountPersistenceError::Query { .. })
        ));
    }
}
