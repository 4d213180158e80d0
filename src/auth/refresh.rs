use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::TokenSet;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("refresh endpoint is not a valid URL: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("refresh endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Wire shape returned by the identity provider's refresh endpoint.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
}

/// Exchange a refresh token for a new token set.
///
/// The provider may rotate the refresh token; when it does not return one,
/// the caller keeps using the token it already holds.
pub async fn refresh_token_set(
    http: &reqwest::Client,
    endpoint: &str,
    refresh_token: &str,
) -> Result<TokenSet, RefreshError> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut()
        .append_pair("refresh_token", refresh_token);

    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(RefreshError::Status(response.status()));
    }

    let body: RefreshResponse = response.json().await?;
    Ok(TokenSet {
        access_token: Some(body.access_token),
        id_token: body.id_token,
        refresh_token: body
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
    })
}
