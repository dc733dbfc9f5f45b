mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;

use app_core::config::Config;
use app_core::jwt::TokenManager;
use app_core::oauth::{SsoProvider, TenantDomain};
use app_core::password::Hasher;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
pub use inbound::router::create_router;
use sea_orm::DatabaseConnection;

use crate::inbound::state::SsoState;
use crate::outbound::billing::{BillingApi, ZohoBilling};
use crate::outbound::orm::AccountORM;
use crate::outbound::state::StateRedis;
use crate::usecase::sso::SsoService;

pub struct Dependency {
    pub db: Arc<DatabaseConnection>,
    pub rds: Pool<RedisConnectionManager>,
    pub config: Arc<Config>,
    pub hasher: Arc<dyn Hasher>,
    pub token: Arc<dyn TokenManager>,
    pub provider: Option<Arc<dyn SsoProvider>>,
}

pub fn new(dep: Dependency) -> SsoState {
    let states = Arc::new(StateRedis::new(dep.rds));
    let repo = Arc::new(AccountORM::new(dep.db));

    // Billing lookups only run when an organization id is configured.
    let tenant = TenantDomain::parse(&dep.config.get::<String>("zoho.domain").unwrap_or_default());
    let billing: Option<Arc<dyn BillingApi>> = dep
        .config
        .get::<String>("zoho.org_id")
        .ok()
        .filter(|org| !org.is_empty())
        .map(|org| Arc::new(ZohoBilling::new(tenant, org)) as Arc<dyn BillingApi>);

    let sso_svc = Arc::new(SsoService::new(dep.provider, billing, states, repo, dep.hasher, dep.token));

    SsoState::new(dep.config, sso_svc)
}
