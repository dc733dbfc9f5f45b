use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::entity::account::{Account, AccountEnrichment, NewAccount};

/// Data access interface for SSO account reconciliation.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait AccountRepository: Send + Sync {
    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;

    /// Looks up the account by email, creating it when absent. Repeated
    /// sign-ins with the same email always resolve to the same row; the
    /// profile fields are only written at creation, an existing account
    /// comes back as stored.
    async fn find_or_create_account(&self, new_account: NewAccount) -> Result<Account, AppError>;

    /// Overwrites the billing columns with the outcome of this sign-in's
    /// lookup.
    async fn record_billing_snapshot(&self, enrichment: AccountEnrichment) -> Result<(), AppError>;
}
