use std::sync::Arc;
use std::time::Duration;

use crate::auth::store::TokenStore;
use crate::config::AppConfig;
use crate::identity::{GraphqlIdentityClient, IdentityClient, UserCache};
use crate::logout::LogoutChannel;

/// Application-wide services, constructed once at startup and handed to the
/// router. Single-instance services (the logout channel, the user cache)
/// live here instead of module-level globals so their lifecycle is tied to
/// the application root.
#[derive(Clone)]
pub struct AppState {
    pub token_store: Arc<TokenStore>,
    pub identity: Arc<dyn IdentityClient>,
    pub user_cache: Arc<UserCache>,
    pub logout_channel: Arc<LogoutChannel>,
    /// Shared HTTP client for the token-refresh endpoint
    pub http: reqwest::Client,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()?;

        Ok(Self {
            token_store: Arc::new(TokenStore::from_config(config)?),
            identity: Arc::new(GraphqlIdentityClient::from_config(config)),
            user_cache: Arc::new(UserCache::new()),
            logout_channel: Arc::new(LogoutChannel::new()),
            http,
        })
    }
}
