use std::time::Duration;

use app_core::error::AppError;
use app_core::oauth::{OAuthError, TenantDomain};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::domain::entity::subscription::{Subscription, SubscriptionStatus};

const ORGANIZATION_HEADER: &str = "X-com-zoho-subscriptions-organizationid";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Customer record returned by the billing customers endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingCustomer {
    pub customer_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

/// Read-only client interface for the Zoho Billing API.
///
/// Only constructed when an organization id is configured; callers treat
/// every failure here as non-fatal.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait BillingApi: Send + Sync {
    /// Finds the billing customer whose email matches the signed-in profile.
    async fn find_customer_by_email(&self, access_token: &str, email: &str)
    -> Result<Option<BillingCustomer>, AppError>;

    /// Lists every subscription under the given customer.
    async fn list_subscriptions(&self, access_token: &str, customer_id: &str)
    -> Result<Vec<Subscription>, AppError>;
}

pub struct ZohoBilling {
    base_url: String,
    org_id: String,
}

impl ZohoBilling {
    pub fn new(tenant: TenantDomain, org_id: String) -> Self {
        Self { base_url: format!("{}/api/v1", tenant.billing_host()), org_id }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        access_token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuthError::Network(e.to_string()))?;

        let response = http_client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .header(AUTHORIZATION, format!("Zoho-oauthtoken {access_token}"))
            .header(ORGANIZATION_HEADER, &self.org_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Billing API request to {path} failed: {}", e);
                OAuthError::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Billing API request to {path} returned {status}");
            return Err(AppError::OAuth(OAuthError::Protocol(format!("billing API returned {status}"))));
        }

        Ok(response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse billing API response from {path}: {}", e);
            OAuthError::Protocol(e.to_string())
        })?)
    }
}

#[derive(Debug, Deserialize)]
struct CustomerListResponse {
    #[serde(default)]
    customers: Vec<BillingCustomer>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionListResponse {
    #[serde(default)]
    subscriptions: Vec<SubscriptionRecord>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionRecord {
    subscription_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    plan_name: String,
    #[serde(default)]
    status: String,
    amount: Option<f64>,
    current_term_ends_at: Option<String>,
}

impl From<SubscriptionRecord> for Subscription {
    fn from(record: SubscriptionRecord) -> Self {
        Subscription {
            subscription_id: record.subscription_id,
            name: record.name,
            plan_name: record.plan_name,
            status: SubscriptionStatus::from(record.status),
            amount: record.amount,
            current_term_ends_at: record.current_term_ends_at,
        }
    }
}

#[async_trait]
impl BillingApi for ZohoBilling {
    async fn find_customer_by_email(
        &self,
        access_token: &str,
        email: &str,
    ) -> Result<Option<BillingCustomer>, AppError> {
        let response: CustomerListResponse = self
            .get_json(access_token, "/customers", &[("email", email)])
            .await?;

        Ok(response.customers.into_iter().next())
    }

    async fn list_subscriptions(&self, access_token: &str, customer_id: &str) -> Result<Vec<Subscription>, AppError> {
        let response: SubscriptionListResponse = self
            .get_json(access_token, "/subscriptions", &[("customer_id", customer_id)])
            .await?;

        Ok(response.subscriptions.into_iter().map(Subscription::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_follows_tenant() {
        let billing = ZohoBilling::new(TenantDomain::Com, "123456".to_string());
        assert_eq!(billing.base_url, "https://subscriptions.zoho.com/api/v1");

        let billing = ZohoBilling::new(TenantDomain::Eu, "123456".to_string());
        assert_eq!(billing.base_url, "https://subscriptions.zoho.eu/api/v1");
    }

    #[test]
    fn test_customer_list_deserialization() {
        let body = r#"{
            "code": 0,
            "message": "success",
            "customers": [
                {"customer_id": "90300000079001", "display_name": "Jane Roe", "email": "jane@example.com"}
            ]
        }"#;

        let parsed: CustomerListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.customers.len(), 1);
        assert_eq!(parsed.customers[0].customer_id, "90300000079001");
        assert_eq!(parsed.customers[0].email, "jane@example.com");
    }

    #[test]
    fn test_customer_list_missing_array() {
        let parsed: CustomerListResponse = serde_json::from_str(r#"{"code": 0, "message": "success"}"#).unwrap();
        assert!(parsed.customers.is_empty());
    }

    #[test]
    fn test_subscription_list_deserialization() {
        let body = r#"{
            "code": 0,
            "subscriptions": [
                {
                    "subscription_id": "90300000079901",
                    "name": "Pro",
                    "plan_name": "Pro Monthly",
                    "status": "live",
                    "amount": 29.0,
                    "current_term_ends_at": "2026-09-28"
                },
                {
                    "subscription_id": "90300000079902",
                    "status": "cancelled"
                }
            ]
        }"#;

        let parsed: SubscriptionListResponse = serde_json::from_str(body).unwrap();
        let subs: Vec<Subscription> = parsed.subscriptions.into_iter().map(Subscription::from).collect();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].status, SubscriptionStatus::Live);
        assert_eq!(subs[0].plan_name, "Pro Monthly");
        assert_eq!(subs[0].amount, Some(29.0));
        assert_eq!(subs[1].status, SubscriptionStatus::Cancelled);
        assert_eq!(subs[1].name, "");
        assert!(subs[1].amount.is_none());
    }

    #[tokio::test]
    async fn test_mock_billing_no_customer() {
        let mut mock = MockBillingApi::new();
        mock.expect_find_customer_by_email()
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let found = mock.find_customer_by_email("token", "nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }
}
