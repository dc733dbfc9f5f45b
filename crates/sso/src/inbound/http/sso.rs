use app_core::error::AppError;
use app_core::extractors::AppQuery;
use app_core::jwt::Claims;
use app_core::middleware::SESSION_COOKIE;
use app_core::response::Response;
use axum::debug_handler;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies};

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::SsoState;

const SSO_ACTION_LOGIN: &str = "login";
const SSO_ACTION_CALLBACK: &str = "callback";

const DEFAULT_SESSION_MAX_AGE_SECS: i64 = 86_400;

/// Single entry point for the SSO flow, dispatching on the `sso` query
/// parameter: `login` starts the redirect dance, `callback` completes it.
#[debug_handler]
pub async fn sso_entry(
    State(state): State<SsoState>,
    cookies: Cookies,
    AppQuery(query): AppQuery<SsoEntryRequest>,
) -> Result<axum::response::Response, AppError> {
    match query.sso.as_deref() {
        Some(SSO_ACTION_LOGIN) => {
            let output = state.sso.initiate().await?;
            Ok(Redirect::to(&output.auth_url).into_response())
        },
        Some(SSO_ACTION_CALLBACK) => handle_callback(state, cookies, query).await,
        Some(_) => Err(AppError::NotFound("Not found".to_string())),
        None => Ok(axum::Json(serde_json::json!({"message": "Zoho SSO service"})).into_response()),
    }
}

async fn handle_callback(
    state: SsoState,
    cookies: Cookies,
    query: SsoEntryRequest,
) -> Result<axum::response::Response, AppError> {
    // The provider reports user denial and its own failures through an
    // `error` query parameter instead of a code.
    if let Some(err) = query.error {
        return Err(AppError::InvalidCallback(format!("provider returned error: {err}")));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidCallback("missing authorization code".to_string()))?;
    let callback_state = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidCallback("missing state".to_string()))?;

    let output = state.sso.callback(CallbackInput { code, state: callback_state }).await?;

    let max_age = state
        .config
        .get::<i64>("jwt.session_exp_secs")
        .unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS);

    let cookie = Cookie::build((SESSION_COOKIE, output.session_token))
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .same_site(SameSite::Lax)
        .build();

    cookies.add(cookie);

    let redirect_to = state
        .config
        .get::<String>("server.redirect_to")
        .unwrap_or_else(|_| "/".to_string());

    Ok(Redirect::to(&redirect_to).into_response())
}

#[debug_handler]
pub async fn subscription_details(State(state): State<SsoState>, claims: Claims) -> impl IntoResponse {
    state
        .sso
        .subscription_details(claims.sub)
        .await
        .map(SubscriptionDetailsResponse::from)
        .map(Response::from)
}
