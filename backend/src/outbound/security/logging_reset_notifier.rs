//! Reset notifier that records deliveries in the service log.
//!
//! Outbound mail is not wired up; operators see that a reset was requested
//! and when it lapses. The token itself is never written out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::ports::{ResetNotifier, ResetNotifierError};
use crate::domain::{ResetToken, User};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingResetNotifier;

#[async_trait]
impl ResetNotifier for LoggingResetNotifier {
    async fn deliver(
        &self,
        user: &User,
        _token: &ResetToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ResetNotifierError> {
        info!(
            user_id = %user.id(),
            %expires_at,
            "password reset token issued"
        );
        Ok(())
    }
}
