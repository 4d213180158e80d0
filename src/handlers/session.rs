use axum::extract::{Extension, Query, State};
use axum::response::{IntoResponse, Json, Redirect};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::CurrentUser;
use crate::state::AppState;
use crate::types::Locale;

/// GET /api/auth/whoami - report the current user (or null), no guard
pub async fn whoami(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "user": user,
        }
    }))
}

#[derive(Debug, Deserialize)]
pub struct LogoutParams {
    locale: Option<String>,
}

/// GET /auth/logout - end the session everywhere
///
/// Clears the persisted token set, drops the memoized user, broadcasts the
/// logout sentinel to every attached context, and lands the visitor on the
/// logged-out page. Store failures are logged; logout always completes.
pub async fn logout(
    State(state): State<AppState>,
    Query(params): Query<LogoutParams>,
) -> impl IntoResponse {
    if let Err(e) = state.token_store.clear() {
        tracing::error!("Failed to clear session storage on logout: {}", e);
    }
    state.user_cache.clear();
    state.logout_channel.broadcast_logout_message();

    let locale = Locale::from_path_segment(params.locale.as_deref().unwrap_or("en"));
    tracing::info!(locale = %locale, "Session logged out");

    Redirect::temporary(&format!("/{}/logged-out", locale))
}
