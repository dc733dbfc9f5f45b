use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::entity::subscription::Subscription;

// ╔════════════════════════════╗
// ║         Initiate           ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct InitiateOutput {
    pub auth_url: String,
}

// ╔════════════════════════════╗
// ║         Callback           ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct CallbackInput {
    #[validate(length(min = 1, message = "authorization code cannot be empty"))]
    pub code: String,
    #[validate(length(min = 1, message = "state cannot be empty"))]
    pub state: String,
}

#[derive(Debug)]
pub struct CallbackOutput {
    pub session_token: String,
}

// ╔════════════════════════════╗
// ║    Subscription Details    ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct SubscriptionDetailsOutput {
    pub email: String,
    pub display_name: String,
    pub customer_id: Option<String>,
    pub subscriptions: Vec<Subscription>,
    pub has_active_subscription: bool,
    pub synced_at: Option<DateTime<Utc>>,
}
