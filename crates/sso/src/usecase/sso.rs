use std::sync::Arc;

use app_core::error::AppError;
use app_core::jwt::TokenManager;
use app_core::oauth::{SsoProvider, ZohoUserProfile};
use app_core::password::{Hasher, generate_placeholder};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::account::{AccountEnrichment, NewAccount};
use crate::domain::entity::subscription::{BillingSnapshot, Subscription};
use crate::domain::inout::prelude::*;
use crate::outbound::billing::BillingApi;
use crate::outbound::repository::AccountRepository;
use crate::outbound::state::StateStore;

const SSO_NOT_CONFIGURED_MSG: &str = "Single sign-on is not configured";
const ACCOUNT_NOT_FOUND_MSG: &str = "Account not found";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SsoUseCase: Send + Sync {
    async fn initiate(&self) -> Result<InitiateOutput, AppError>;
    async fn callback(&self, input: CallbackInput) -> Result<CallbackOutput, AppError>;
    async fn subscription_details(&self, account_id: i64) -> Result<SubscriptionDetailsOutput, AppError>;
}

pub struct SsoService {
    provider: Option<Arc<dyn SsoProvider>>,
    billing: Option<Arc<dyn BillingApi>>,
    states: Arc<dyn StateStore>,
    repo: Arc<dyn AccountRepository>,
    hasher: Arc<dyn Hasher>,
    token: Arc<dyn TokenManager>,
}

impl SsoService {
    pub fn new(
        provider: Option<Arc<dyn SsoProvider>>,
        billing: Option<Arc<dyn BillingApi>>,
        states: Arc<dyn StateStore>,
        repo: Arc<dyn AccountRepository>,
        hasher: Arc<dyn Hasher>,
        token: Arc<dyn TokenManager>,
    ) -> Self {
        Self { provider, billing, states, repo, hasher, token }
    }

    fn provider(&self) -> Result<&Arc<dyn SsoProvider>, AppError> {
        self.provider
            .as_ref()
            .ok_or_else(|| AppError::NotFound(SSO_NOT_CONFIGURED_MSG.to_string()))
    }

    /// Builds the account payload from the provider profile, falling back to
    /// the email address when the profile carries no display name.
    fn build_new_account(&self, profile: ZohoUserProfile) -> Result<NewAccount, AppError> {
        let display_name = profile
            .display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| profile.email.clone());

        Ok(NewAccount {
            email: profile.email,
            first_name: profile.first_name.unwrap_or_default(),
            last_name: profile.last_name.unwrap_or_default(),
            display_name,
            hashed_password: self.hasher.hash(&generate_placeholder())?,
        })
    }

    /// Chained billing lookup: customer by email, then subscriptions by
    /// customer id. Entirely best-effort; any failure, and the absence of a
    /// matching customer, resolve to `None` without touching the sign-in.
    async fn resolve_subscriptions(&self, access_token: &str, email: &str) -> Option<BillingSnapshot> {
        let billing = self.billing.as_ref()?;

        let customer = match billing.find_customer_by_email(access_token, email).await {
            Ok(Some(customer)) => customer,
            Ok(None) => {
                tracing::info!("No billing customer found for {email}");
                return None;
            },
            Err(err) => {
                tracing::warn!("Billing customer lookup for {email} failed: {err}");
                return None;
            },
        };

        match billing.list_subscriptions(access_token, &customer.customer_id).await {
            Ok(subscriptions) => Some(BillingSnapshot { customer_id: customer.customer_id, subscriptions }),
            Err(err) => {
                tracing::warn!("Subscription lookup for customer {} failed: {err}", customer.customer_id);
                None
            },
        }
    }
}

#[async_trait]
impl SsoUseCase for SsoService {
    async fn initiate(&self) -> Result<InitiateOutput, AppError> {
        let provider = self.provider()?;

        let state = Uuid::new_v4().to_string();
        self.states.issue(&state).await?;

        Ok(InitiateOutput { auth_url: provider.authorization_url(&state) })
    }

    async fn callback(&self, input: CallbackInput) -> Result<CallbackOutput, AppError> {
        input.validate()?;

        let provider = self.provider()?;

        if !self.states.verify(&input.state).await? {
            return Err(AppError::InvalidState);
        }

        let access_token = provider.exchange_code(input.code).await?;
        let profile = provider.fetch_profile(&access_token).await?;

        let snapshot = self.resolve_subscriptions(&access_token, &profile.email).await;

        let account = self.repo.find_or_create_account(self.build_new_account(profile)?).await?;

        // A lookup that resolved nothing writes nothing; the account keeps
        // whatever snapshot it already had.
        if let Some(snapshot) = snapshot {
            self.repo
                .record_billing_snapshot(AccountEnrichment {
                    account_id: account.id,
                    customer_id: snapshot.customer_id,
                    subscriptions: serde_json::to_value(&snapshot.subscriptions)?,
                    synced_at: Utc::now(),
                })
                .await?;
        }

        let session_token = self.token.create_session_token(account.id)?;

        Ok(CallbackOutput { session_token })
    }

    async fn subscription_details(&self, account_id: i64) -> Result<SubscriptionDetailsOutput, AppError> {
        let account = self
            .repo
            .find_account_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ACCOUNT_NOT_FOUND_MSG.to_string()))?;

        let subscriptions: Vec<Subscription> = match account.zoho_subscriptions {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };

        Ok(SubscriptionDetailsOutput {
            email: account.email,
            display_name: account.display_name,
            customer_id: account.zoho_customer_id,
            has_active_subscription: subscriptions.iter().any(|s| s.status.grants_access()),
            subscriptions,
            synced_at: account.subscription_synced_at,
        })
    }
}
