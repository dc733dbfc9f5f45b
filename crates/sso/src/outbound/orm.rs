use std::sync::Arc;

use app_core::error::AppError;
use app_orm::accounts;
use app_orm::prelude::Accounts;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::repository::AccountRepository;
use crate::domain::entity::account::{Account, AccountEnrichment, NewAccount};

/// `AccountORM` is the data access layer for SSO-managed accounts.
///
/// It maps SeaORM models to domain entities and implements the reconcile
/// semantics: one row per email, created on first sign-in and returned
/// as stored on every later one.
pub struct AccountORM {
    db: Arc<DatabaseConnection>,
}

impl AccountORM {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_account(&self, model: accounts::Model) -> Account {
        Account {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            display_name: model.display_name,
            zoho_customer_id: model.zoho_customer_id,
            zoho_subscriptions: model.zoho_subscriptions,
            subscription_synced_at: model.subscription_synced_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[async_trait]
impl AccountRepository for AccountORM {
    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let account = Accounts::find()
            .filter(accounts::Column::Id.eq(id))
            .one(self.db.as_ref())
            .await?;

        Ok(account.map(|a| self.to_account(a)))
    }

    async fn find_or_create_account(&self, new_account: NewAccount) -> Result<Account, AppError> {
        if let Some(model) = Accounts::find()
            .filter(accounts::Column::Email.eq(&new_account.email))
            .one(self.db.as_ref())
            .await?
        {
            // Repeat sign-in: the profile fields were written at creation
            // and stay as stored.
            return Ok(self.to_account(model));
        }

        let now = Utc::now().fixed_offset();
        let active = accounts::ActiveModel {
            email: ActiveValue::Set(new_account.email),
            hashed_password: ActiveValue::Set(new_account.hashed_password),
            first_name: ActiveValue::Set(new_account.first_name),
            last_name: ActiveValue::Set(new_account.last_name),
            display_name: ActiveValue::Set(new_account.display_name),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };

        let model = Accounts::insert(active)
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::AccountCreation(e.to_string()))?;

        Ok(self.to_account(model))
    }

    async fn record_billing_snapshot(&self, enrichment: AccountEnrichment) -> Result<(), AppError> {
        let result = Accounts::update_many()
            .col_expr(accounts::Column::ZohoCustomerId, Expr::value(Some(enrichment.customer_id)))
            .col_expr(accounts::Column::ZohoSubscriptions, Expr::value(Some(enrichment.subscriptions)))
            .col_expr(accounts::Column::SubscriptionSyncedAt, Expr::value(Some(enrichment.synced_at.fixed_offset())))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(accounts::Column::Id.eq(enrichment.account_id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Account not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, ModelTrait};
    use serde_json::json;

    use super::*;

    fn setup_mock_db<T>(
        query_results: Option<Vec<Vec<T>>>,
        exec_results: Option<Vec<MockExecResult>>,
        exec_errors: Option<Vec<DbErr>>,
    ) -> AccountORM
    where
        T: ModelTrait + Clone + Send + Sync + 'static,
    {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres);

        if let Some(qr) = query_results {
            db = db.append_query_results(qr);
        }

        if let Some(er) = exec_results {
            db = db.append_exec_results(er);
        }

        if let Some(ee) = exec_errors {
            db = db.append_exec_errors(ee);
        }

        AccountORM::new(Arc::new(db.into_connection()))
    }

    fn account_model(id: i64, email: &str) -> accounts::Model {
        let now = Utc::now().with_timezone(&FixedOffset::east_opt(0).unwrap());
        accounts::Model {
            id,
            email: email.to_string(),
            hashed_password: "hashed".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Roe".to_string(),
            display_name: "Jane Roe".to_string(),
            zoho_customer_id: None,
            zoho_subscriptions: None,
            subscription_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_account_by_id() {
        let repo = setup_mock_db(Some(vec![vec![account_model(1, "jane@example.com")], vec![]]), None, None);

        let account = repo.find_account_by_id(1).await.unwrap().unwrap();
        assert_eq!(account.id, 1);
        assert_eq!(account.email, "jane@example.com");
        assert!(account.zoho_customer_id.is_none());

        let missing = repo.find_account_by_id(2).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_find_or_create_account_existing_returned_unchanged() {
        // No exec results appended: any write against the existing row
        // would fail the mock connection.
        let repo = setup_mock_db(Some(vec![vec![account_model(1, "jane@example.com")]]), None, None);

        let account = repo
            .find_or_create_account(NewAccount {
                email: "jane@example.com".to_string(),
                first_name: "Janet".to_string(),
                last_name: "Roe-Smith".to_string(),
                display_name: "Janet Roe-Smith".to_string(),
                hashed_password: "never-used".to_string(),
            })
            .await
            .unwrap();

        // Same row, profile fields as stored at creation.
        assert_eq!(account.id, 1);
        assert_eq!(account.first_name, "Jane");
        assert_eq!(account.last_name, "Roe");
        assert_eq!(account.display_name, "Jane Roe");
    }

    #[tokio::test]
    async fn test_find_or_create_account_inserts_new_row() {
        let repo = setup_mock_db(
            Some(vec![vec![], vec![account_model(7, "new@example.com")]]),
            None,
            None,
        );

        let account = repo
            .find_or_create_account(NewAccount {
                email: "new@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Roe".to_string(),
                display_name: "Jane Roe".to_string(),
                hashed_password: "hashed".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(account.id, 7);
        assert_eq!(account.email, "new@example.com");
    }

    #[tokio::test]
    async fn test_find_or_create_account_insert_rejected() {
        let repo = setup_mock_db::<accounts::Model>(
            Some(vec![vec![]]),
            None,
            Some(vec![DbErr::Exec(sea_orm::RuntimeErr::Internal("unique violation".into()))]),
        );

        let result = repo
            .find_or_create_account(NewAccount {
                email: "new@example.com".to_string(),
                first_name: "Jane".to_string(),
                last_name: "Roe".to_string(),
                display_name: "Jane Roe".to_string(),
                hashed_password: "hashed".to_string(),
            })
            .await;

        assert!(
            matches!(result, Err(AppError::AccountCreation(_))),
            "Expected AccountCreation error when insert fails"
        );
    }

    #[tokio::test]
    async fn test_record_billing_snapshot() {
        // case 1: snapshot written
        let repo = setup_mock_db::<accounts::Model>(
            None,
            Some(vec![MockExecResult { last_insert_id: 0, rows_affected: 1 }]),
            None,
        );
        let result = repo
            .record_billing_snapshot(AccountEnrichment {
                account_id: 1,
                customer_id: "90300000079001".to_string(),
                subscriptions: json!([{"subscription_id": "s1", "status": "live"}]),
                synced_at: Utc::now(),
            })
            .await;
        assert!(result.is_ok());

        // case 2: account vanished
        let repo = setup_mock_db::<accounts::Model>(
            None,
            Some(vec![MockExecResult { last_insert_id: 0, rows_affected: 0 }]),
            None,
        );
        let result = repo
            .record_billing_snapshot(AccountEnrichment {
                account_id: 99,
                customer_id: "90300000079001".to_string(),
                subscriptions: json!([]),
                synced_at: Utc::now(),
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
