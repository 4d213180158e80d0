use axum::response::{IntoResponse, Redirect, Response};
use url::form_urlencoded;

use crate::error::ApiError;
use crate::identity::AuthenticatedUser;
use crate::types::Locale;

/// Route-guard verdict for a navigation that may not render.
///
/// Explicit result variants interpreted by the router: an anonymous visitor
/// is redirected to the sign-in page with a `from` parameter carrying the
/// intended destination, an authenticated visitor without a required role
/// gets the terminal 403 error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Redirect(String),
    Forbidden,
}

impl IntoResponse for AuthOutcome {
    fn into_response(self) -> Response {
        match self {
            AuthOutcome::Redirect(location) => Redirect::temporary(&location).into_response(),
            AuthOutcome::Forbidden => {
                ApiError::forbidden("You are not authorized to view this page").into_response()
            }
        }
    }
}

/// Sign-in page URL for an interrupted navigation; `from` round-trips the
/// visitor back to their intended destination after authenticating.
pub fn login_redirect(locale: Locale, from_path: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("from", from_path)
        .finish();
    format!("/{}/login-info?{}", locale, query)
}

/// Authorize a navigation.
///
/// - No user: redirect to the locale-prefixed sign-in page.
/// - User present but none of the required roles: forbidden, terminal for
///   this navigation.
/// - User present and authorized (or no roles required): the user is
///   returned for the page to use.
pub fn require_user(
    user: Option<AuthenticatedUser>,
    locale: Locale,
    from_path: &str,
    required_roles: &[&str],
) -> Result<AuthenticatedUser, AuthOutcome> {
    let Some(user) = user else {
        tracing::debug!(path = from_path, "Anonymous navigation, redirecting to sign-in");
        return Err(AuthOutcome::Redirect(login_redirect(locale, from_path)));
    };

    if !user.has_any_role(required_roles) {
        tracing::warn!(
            user_id = %user.id,
            path = from_path,
            required = ?required_roles,
            "User lacks a required role"
        );
        return Err(AuthOutcome::Forbidden);
    }

    Ok(user)
}
