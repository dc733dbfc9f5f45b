use chrono::{DateTime, Utc};
use serde_json::Value;

/// Application account reconciled from an identity-provider sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub zoho_customer_id: Option<String>,
    pub zoho_subscriptions: Option<Value>,
    pub subscription_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile data used to create an account on first sign-in. A repeat
/// sign-in only reads the email; the stored profile fields stay untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    /// Hash of a random throwaway credential; SSO accounts never sign in by
    /// password.
    pub hashed_password: String,
}

/// Billing columns written back to the account when a sign-in resolved a
/// customer. A lookup that failed or found nothing writes nothing, leaving
/// any previously stored snapshot in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountEnrichment {
    pub account_id: i64,
    pub customer_id: String,
    pub subscriptions: Value,
    pub synced_at: DateTime<Utc>,
}
