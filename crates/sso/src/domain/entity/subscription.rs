use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a billing subscription as reported by Zoho Billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Live,
    Active,
    NonRenewing,
    Trial,
    Cancelled,
    Expired,
    Unpaid,
    Unknown,
}

impl SubscriptionStatus {
    /// Whether this status entitles the account to paid features.
    ///
    /// `NonRenewing` still counts: the subscription was cancelled but runs
    /// until the end of the already-paid term.
    pub fn grants_access(&self) -> bool {
        matches!(self, SubscriptionStatus::Live | SubscriptionStatus::Active | SubscriptionStatus::NonRenewing)
    }
}

impl From<String> for SubscriptionStatus {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "live" => SubscriptionStatus::Live,
            "active" => SubscriptionStatus::Active,
            "non_renewing" => SubscriptionStatus::NonRenewing,
            "trial" => SubscriptionStatus::Trial,
            "cancelled" => SubscriptionStatus::Cancelled,
            "expired" => SubscriptionStatus::Expired,
            "unpaid" => SubscriptionStatus::Unpaid,
            _ => SubscriptionStatus::Unknown,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionStatus::Live => "live",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::NonRenewing => "non_renewing",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Summary of one subscription belonging to a billing customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_id: String,
    pub name: String,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub amount: Option<f64>,
    pub current_term_ends_at: Option<String>,
}

/// Result of the billing lookup performed during sign-in: the matched
/// customer and every subscription found under it.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingSnapshot {
    pub customer_id: String,
    pub subscriptions: Vec<Subscription>,
}

impl BillingSnapshot {
    pub fn has_active_subscription(&self) -> bool {
        self.subscriptions.iter().any(|s| s.status.grants_access())
    }
}
