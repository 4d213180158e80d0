use axum::extract::{Extension, Path};
use axum::http::Uri;
use axum::response::Json;
use serde_json::{json, Value};

use crate::identity::role_name;
use crate::middleware::{require_user, AuthOutcome, CurrentUser};
use crate::types::Locale;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Talent Gateway",
            "version": version,
            "description": "Session bootstrap gateway for the digital-talent platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "pages": "/:locale, /:locale/login-info, /:locale/logged-out (public)",
                "applicant": "/:locale/applicant[/profile] (requires applicant role)",
                "admin": "/:locale/admin/users (requires platform_admin role)",
                "whoami": "/api/auth/whoami (public - reports current user)",
                "logout": "/auth/logout (public - clears session, broadcasts logout)",
            }
        }
    }))
}

/// GET /health - liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
        }
    }))
}

/// GET /:locale - localized landing page
pub async fn locale_home(Path(locale): Path<String>) -> Json<Value> {
    let locale = Locale::from_path_segment(&locale);

    Json(json!({
        "success": true,
        "data": {
            "page": "home",
            "locale": locale.as_str(),
        }
    }))
}

/// GET /:locale/login-info - sign-in page
///
/// Target of the route guard's redirect; the `from` query parameter carries
/// the visitor's intended destination and is echoed back so the client can
/// resume that navigation after authenticating.
pub async fn login_info(Path(locale): Path<String>, uri: Uri) -> Json<Value> {
    let locale = Locale::from_path_segment(&locale);
    let from = uri
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "from")
                .map(|(_, value)| value.into_owned())
        });

    Json(json!({
        "success": true,
        "data": {
            "page": "login-info",
            "locale": locale.as_str(),
            "from": from,
        }
    }))
}

/// GET /:locale/logged-out - post-logout landing page
pub async fn logged_out(Path(locale): Path<String>) -> Json<Value> {
    let locale = Locale::from_path_segment(&locale);

    Json(json!({
        "success": true,
        "data": {
            "page": "logged-out",
            "locale": locale.as_str(),
        }
    }))
}

/// GET /:locale/applicant - applicant dashboard, requires the applicant role
pub async fn applicant_home(
    Path(locale): Path<String>,
    uri: Uri,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, AuthOutcome> {
    let locale = Locale::from_path_segment(&locale);
    let user = require_user(user, locale, uri.path(), &[role_name::APPLICANT])?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "page": "applicant",
            "locale": locale.as_str(),
            "user_id": user.id,
        }
    })))
}

/// GET /:locale/applicant/profile - applicant profile, requires the applicant role
pub async fn applicant_profile(
    Path(locale): Path<String>,
    uri: Uri,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, AuthOutcome> {
    let locale = Locale::from_path_segment(&locale);
    let user = require_user(user, locale, uri.path(), &[role_name::APPLICANT])?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "page": "applicant-profile",
            "locale": locale.as_str(),
            "user_id": user.id,
            "role_assignments": user.role_assignments,
        }
    })))
}

/// GET /:locale/admin/users - user administration, requires platform_admin
pub async fn admin_users(
    Path(locale): Path<String>,
    uri: Uri,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>, AuthOutcome> {
    let locale = Locale::from_path_segment(&locale);
    let user = require_user(user, locale, uri.path(), &[role_name::PLATFORM_ADMIN])?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "page": "admin-users",
            "locale": locale.as_str(),
            "user_id": user.id,
        }
    })))
}
