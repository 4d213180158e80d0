use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::auth;
use crate::auth::refresh::refresh_token_set;
use crate::config;
use crate::identity::{cache, AuthenticatedUser};
use crate::state::AppState;

/// The resolved user for this navigation, injected into request extensions.
/// `None` is an anonymous navigation.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

/// User-resolution middleware, second in the pipeline.
///
/// Reads the access token from the store, refreshes it when it is expired
/// and a refresh token is available, then resolves the authenticated user
/// through the memoized cache (at most one upstream fetch per distinct
/// token value) and attaches the result to the request context. This is the
/// only suspension point in the pipeline; everything else is synchronous.
pub async fn current_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let tokens = state.token_store.read();
    let mut access_token = tokens.access_token.clone();

    if let (Some(token), Some(refresh)) = (&tokens.access_token, &tokens.refresh_token) {
        if auth::is_expired(token, Utc::now()) {
            access_token = refresh_access_token(&state, refresh).await.or(access_token);
        }
    }

    let user = cache::resolve(
        &state.user_cache,
        state.identity.as_ref(),
        access_token.as_deref(),
    )
    .await;

    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Exchange the refresh token and persist the new set. Returns the new
/// access token, or None on failure — the navigation then proceeds with the
/// expired token and degrades to anonymous when the identity query rejects
/// it.
async fn refresh_access_token(state: &AppState, refresh_token: &str) -> Option<String> {
    let endpoint = &config::config().api.refresh_endpoint;
    match refresh_token_set(&state.http, endpoint, refresh_token).await {
        Ok(new_tokens) => {
            if let Err(e) = state.token_store.write(&new_tokens) {
                tracing::error!("Failed to persist refreshed tokens: {}", e);
            }
            // the cached identity belongs to the old token
            state.user_cache.invalidate();
            tracing::debug!("Access token refreshed");
            new_tokens.access_token
        }
        Err(e) => {
            tracing::warn!("Token refresh failed, continuing with expired token: {}", e);
            None
        }
    }
}
