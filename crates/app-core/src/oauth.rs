//! Zoho OAuth 2.0 authorization-code flow plumbing.
//!
//! Builds the outbound authorization URL, exchanges an authorization code for
//! an access token against the regional Zoho accounts host, and fetches the
//! authenticated user's profile. Authorization codes are single-use, so a
//! failed exchange is never retried.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope, TokenResponse,
    TokenUrl,
};
use reqwest::{Client, ClientBuilder, redirect};
use serde::Deserialize;
use thiserror::Error;

/// Scopes requested from Zoho: profile read plus Zoho Subscriptions read.
/// Zoho expects a single comma-separated scope string.
const OAUTH_SCOPES: &str = "AaaServer.profile.READ,ZohoSubscriptions.subscriptions.READ";

/// Bound on every outbound call to the provider; a timeout surfaces as a
/// transport failure.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),

    #[error("Provider request failed: {0}")]
    Network(String),

    #[error("Provider response missing required data: {0}")]
    Protocol(String),
}

/// Regional Zoho tenant selector. The accounts and billing API hosts are
/// derived from this as table lookups; unknown values fall back to `com`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TenantDomain {
    #[default]
    Com,
    Eu,
    In,
    ComCn,
    ComAu,
}

impl TenantDomain {
    pub fn parse(value: &str) -> Self {
        match value {
            "com" => TenantDomain::Com,
            "eu" => TenantDomain::Eu,
            "in" => TenantDomain::In,
            "com.cn" => TenantDomain::ComCn,
            "com.au" => TenantDomain::ComAu,
            _ => TenantDomain::Com,
        }
    }

    /// Top-level domain suffix, e.g. `com.au` for `zoho.com.au`.
    pub fn suffix(&self) -> &'static str {
        match self {
            TenantDomain::Com => "com",
            TenantDomain::Eu => "eu",
            TenantDomain::In => "in",
            TenantDomain::ComCn => "com.cn",
            TenantDomain::ComAu => "com.au",
        }
    }

    pub fn accounts_host(&self) -> String {
        format!("https://accounts.zoho.{}", self.suffix())
    }

    pub fn billing_host(&self) -> String {
        format!("https://subscriptions.zoho.{}", self.suffix())
    }
}

impl fmt::Display for TenantDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Identity attributes returned by the Zoho user-info endpoint. Only the
/// email is guaranteed; name fields may be absent.
#[derive(Debug, Clone)]
pub struct ZohoUserProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SsoProvider: Send + Sync {
    /// Builds the provider authorization URL carrying the given state nonce.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: String) -> Result<String, OAuthError>;

    /// Fetches the authenticated user's profile using an access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<ZohoUserProfile, OAuthError>;
}

#[derive(Debug)]
pub struct ZohoProvider {
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    user_info_url: String,
}

impl ZohoProvider {
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        tenant: TenantDomain,
    ) -> Result<Self, OAuthError> {
        let accounts = tenant.accounts_host();

        Ok(Self {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new(format!("{accounts}/oauth/v2/auth"))?,
            token_url: TokenUrl::new(format!("{accounts}/oauth/v2/token"))?,
            redirect_url: RedirectUrl::new(redirect_uri)?,
            user_info_url: format!("{accounts}/oauth/user/info"),
        })
    }
}

#[async_trait]
impl SsoProvider for ZohoProvider {
    fn authorization_url(&self, state: &str) -> String {
        let state = state.to_string();

        let (auth_url, _) = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .authorize_url(move || CsrfToken::new(state.clone()))
            .add_scope(Scope::new(OAUTH_SCOPES.to_string()))
            .add_extra_param("access_type", "offline")
            .url();

        auth_url.to_string()
    }

    async fn exchange_code(&self, code: String) -> Result<String, OAuthError> {
        let http_client = ClientBuilder::new()
            .timeout(HTTP_TIMEOUT)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| OAuthError::Network(format!("failed to build HTTP client: {e}")))?;

        // Zoho wants the client credentials in the form body, not basic auth.
        let token_result = BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_type(AuthType::RequestBody)
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
            .exchange_code(AuthorizationCode::new(code))
            .request_async(&http_client)
            .await
            .map_err(|e| match &e {
                oauth2::RequestTokenError::Request(err) => {
                    tracing::error!("OAuth token exchange transport failure: {:?}", err);
                    OAuthError::Network(format!("token endpoint unreachable: {err}"))
                },
                oauth2::RequestTokenError::ServerResponse(err) => {
                    tracing::error!("OAuth token exchange rejected: {:?}", err.error_description());
                    OAuthError::Protocol("token endpoint rejected the authorization code".to_string())
                },
                oauth2::RequestTokenError::Parse(_, body) => {
                    tracing::error!(
                        "OAuth token response unparseable: {}",
                        std::str::from_utf8(body).unwrap_or("<non-UTF8 body>")
                    );
                    OAuthError::Protocol("token response carried no access_token".to_string())
                },
                _ => {
                    tracing::error!("OAuth token exchange failed: {:?}", e);
                    OAuthError::Protocol(format!("token exchange failed: {e}"))
                },
            })?;

        Ok(token_result.access_token().secret().to_string())
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ZohoUserProfile, OAuthError> {
        // Field names follow Zoho's user-info payload verbatim.
        #[derive(Deserialize)]
        struct ZohoUserInfo {
            #[serde(rename = "Email")]
            email: Option<String>,
            #[serde(rename = "First_Name")]
            first_name: Option<String>,
            #[serde(rename = "Last_Name")]
            last_name: Option<String>,
            #[serde(rename = "Display_Name")]
            display_name: Option<String>,
        }

        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuthError::Network(format!("failed to build HTTP client: {e}")))?;

        let info: ZohoUserInfo = client
            .get(&self.user_info_url)
            // Zoho uses its own authorization scheme, not `Bearer`.
            .header("Authorization", format!("Zoho-oauthtoken {access_token}"))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("user-info request failed: {:?}", e);
                OAuthError::Network(format!("user-info endpoint unreachable: {e}"))
            })?
            .json()
            .await
            .map_err(|_| OAuthError::Protocol("user-info response was not valid JSON".to_string()))?;

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| OAuthError::Protocol("user-info response carried no Email".to_string()))?;

        Ok(ZohoUserProfile {
            email,
            first_name: info.first_name,
            last_name: info.last_name,
            display_name: info.display_name,
        })
    }
}
