use std::sync::Arc;

use app_core::jwt::TokenManager;
use app_core::middleware::auth;
use axum::routing::get;
use axum::{Router, middleware};

use crate::inbound::http::sso::*;
use crate::inbound::state::SsoState;

pub fn create_router(state: SsoState, tm: Arc<dyn TokenManager>) -> Router {
    let protected_routes = Router::new()
        .route("/me/subscription", get(subscription_details))
        .route_layer(middleware::from_fn_with_state(tm, auth));

    let public_routes = Router::new().route("/", get(sso_entry));

    Router::new().merge(public_routes).merge(protected_routes).with_state(state)
}
