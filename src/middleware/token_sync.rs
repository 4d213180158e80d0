use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use crate::auth::TokenSet;
use crate::state::AppState;

/// Query parameters the identity provider appends to the post-login
/// redirect URL.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
pub const ID_TOKEN_PARAM: &str = "id_token";
pub const REFRESH_TOKEN_PARAM: &str = "refresh_token";

/// Outermost middleware of the navigation pipeline.
///
/// When the request URL carries token parameters (the identity-provider
/// redirect), persist them and redirect to the same path with exactly those
/// parameters stripped; the redirected navigation re-enters the pipeline
/// without tokens in the URL. Requests without token parameters pass
/// through unmodified.
pub async fn token_sync_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let found = match extract_url_tokens(request.uri().query()) {
        Some(found) => found,
        None => return next.run(request).await,
    };
    let path = request.uri().path().to_string();

    tracing::debug!(path = %path, "Synchronizing tokens from redirect URL");

    // Merge over whatever is already persisted: the provider may hand back
    // only a subset of the three tokens.
    let mut tokens = state.token_store.read();
    if found.tokens.access_token.is_some() {
        tokens.access_token = found.tokens.access_token;
    }
    if found.tokens.id_token.is_some() {
        tokens.id_token = found.tokens.id_token;
    }
    if found.tokens.refresh_token.is_some() {
        tokens.refresh_token = found.tokens.refresh_token;
    }

    // A failed write degrades to "tokens lost"; the stripped redirect still
    // happens and re-login recovers.
    if let Err(e) = state.token_store.write(&tokens) {
        tracing::error!("Failed to persist tokens from redirect URL: {}", e);
    }

    let location = match &found.remaining_query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    Redirect::temporary(&location).into_response()
}

/// Tokens found in a request URL plus the query string that survives
/// stripping them.
#[derive(Debug, PartialEq, Eq)]
pub struct UrlTokens {
    pub tokens: TokenSet,
    pub remaining_query: Option<String>,
}

/// Pull token parameters out of a query string. Returns None when no token
/// parameter is present (the normal case for every navigation after the
/// post-login pass).
pub fn extract_url_tokens(query: Option<&str>) -> Option<UrlTokens> {
    let query = query?;

    let mut tokens = TokenSet::default();
    let mut remaining = form_urlencoded::Serializer::new(String::new());
    let mut any_remaining = false;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            ACCESS_TOKEN_PARAM => tokens.access_token = Some(value.into_owned()),
            ID_TOKEN_PARAM => tokens.id_token = Some(value.into_owned()),
            REFRESH_TOKEN_PARAM => tokens.refresh_token = Some(value.into_owned()),
            _ => {
                remaining.append_pair(&key, &value);
                any_remaining = true;
            }
        }
    }

    if tokens.is_empty() {
        return None;
    }

    let remaining_query = if any_remaining {
        Some(remaining.finish())
    } else {
        None
    };

    Some(UrlTokens {
        tokens,
        remaining_query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_query_passes_through() {
        assert!(extract_url_tokens(None).is_none());
    }

    #[test]
    fn test_query_without_tokens_passes_through() {
        assert!(extract_url_tokens(Some("page=2&sort=name")).is_none());
    }

    #[test]
    fn test_all_tokens_are_extracted_and_stripped() {
        let found =
            extract_url_tokens(Some("access_token=aaa&id_token=bbb&refresh_token=ccc")).unwrap();

        assert_eq!(found.tokens.access_token.as_deref(), Some("aaa"));
        assert_eq!(found.tokens.id_token.as_deref(), Some("bbb"));
        assert_eq!(found.tokens.refresh_token.as_deref(), Some("ccc"));
        assert_eq!(found.remaining_query, None);
    }

    #[test]
    fn test_other_parameters_are_preserved() {
        let found = extract_url_tokens(Some("page=2&access_token=aaa&sort=name")).unwrap();

        assert_eq!(found.tokens.access_token.as_deref(), Some("aaa"));
        assert_eq!(found.remaining_query.as_deref(), Some("page=2&sort=name"));
    }

    #[test]
    fn test_partial_token_set() {
        let found = extract_url_tokens(Some("access_token=aaa")).unwrap();

        assert_eq!(found.tokens.access_token.as_deref(), Some("aaa"));
        assert!(found.tokens.id_token.is_none());
        assert!(found.tokens.refresh_token.is_none());
    }

    #[test]
    fn test_encoded_values_are_decoded() {
        let found = extract_url_tokens(Some("access_token=a%2Bb%3D%3D")).unwrap();
        assert_eq!(found.tokens.access_token.as_deref(), Some("a+b=="));
    }
}
