use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

pub mod refresh;
pub mod store;

/// Storage keys for the persisted token set. The values are opaque strings
/// owned by the identity provider.
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ID_TOKEN: &str = "ID_TOKEN";
pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";

/// The set of tokens handed over by the identity provider after login.
///
/// Written on the post-login redirect, read on every protected navigation,
/// cleared on logout. Serialized field names are the storage keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    #[serde(rename = "ACCESS_TOKEN")]
    pub access_token: Option<String>,
    #[serde(rename = "ID_TOKEN")]
    pub id_token: Option<String>,
    #[serde(rename = "REFRESH_TOKEN")]
    pub refresh_token: Option<String>,
}

impl TokenSet {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.id_token.is_none() && self.refresh_token.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct ExpClaims {
    exp: i64,
}

/// Read the `exp` claim from an access token without verifying the signature.
///
/// The gateway is not the token audience; it only peeks at expiry to decide
/// whether a refresh is worth attempting before the identity query. Tokens
/// that do not parse as a JWT (or carry no readable `exp`) return None.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<ExpClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Utc.timestamp_opt(data.claims.exp, 0).single()
}

/// Whether the token has an `exp` claim in the past. Unparseable tokens are
/// treated as unexpired and left for the upstream API to reject.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match token_expiry(token) {
        Some(exp) => exp <= now,
        None => false,
    }
}
