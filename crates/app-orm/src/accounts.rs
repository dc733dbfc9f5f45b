use sea_orm::entity::prelude::*;

/// Account row created or updated by the identity-provider sign-in flow.
///
/// `zoho_subscriptions` holds the raw subscription summaries captured at the
/// last sign-in; `subscription_synced_at` records when that snapshot was
/// taken. Both stay NULL when billing lookup is disabled or failed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub zoho_customer_id: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub zoho_subscriptions: Option<Json>,
    pub subscription_synced_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
