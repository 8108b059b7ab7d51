//! Port delivering password reset tokens to their owner.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ResetToken, User};

use super::define_port_error;

define_port_error! {
    /// Delivery failures raised by notifier adapters.
    pub enum ResetNotifierError {
        /// The message could not be handed off.
        Delivery { message: String } => "reset token delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetNotifier: Send + Sync {
    /// Deliver `token` to `user`. The token must not be logged or stored.
    async fn deliver(
        &self,
        user: &User,
        token: &ResetToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ResetNotifierError>;
}
