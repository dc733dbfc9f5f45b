use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::subscription::Subscription;
use crate::domain::inout::sso::SubscriptionDetailsOutput;

/// Query parameters accepted by the single SSO entry point.
///
/// `sso` selects the action; the remaining fields are only present on the
/// provider's callback redirect.
#[derive(Debug, Deserialize)]
pub struct SsoEntryRequest {
    pub sso: Option<String>,
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionDetailsResponse {
    pub email: String,
    pub display_name: String,
    pub customer_id: Option<String>,
    pub subscriptions: Vec<Subscription>,
    pub has_active_subscription: bool,
    pub synced_at: Option<DateTime<Utc>>,
}

impl From<SubscriptionDetailsOutput> for SubscriptionDetailsResponse {
    fn from(output: SubscriptionDetailsOutput) -> Self {
        Self {
            email: output.email,
            display_name: output.display_name,
            customer_id: output.customer_id,
            subscriptions: output.subscriptions,
            has_active_subscription: output.has_active_subscription,
            synced_at: output.synced_at,
        }
    }
}
