use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::AuthenticatedUser;
use crate::config::AppConfig;

/// The single identity query issued per distinct access token. The upstream
/// schema is a black box that returns this shape or an error.
const USER_QUERY: &str = r#"
query UserMiddleware {
  myAuth {
    id
    deletedDate
    roleAssignments {
      id
      role {
        id
        name
        isTeamBased
        displayName {
          en
          fr
        }
      }
      team {
        id
        name
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("identity query rejected: {0}")]
    Graphql(String),
}

/// Source of the authenticated user's identity.
///
/// Trait-object seam so the user middleware can be exercised against a
/// counting stub; the production implementation talks GraphQL.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetch the identity bound to the given access token. `Ok(None)` means
    /// the token is not recognized as a user (anonymous).
    async fn fetch_authenticated_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<MyAuthData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyAuthData {
    my_auth: Option<AuthenticatedUser>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

/// GraphQL-backed identity client.
pub struct GraphqlIdentityClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlIdentityClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.api.graphql_endpoint.clone(),
            Duration::from_secs(config.api.request_timeout_secs),
        )
    }
}

#[async_trait]
impl IdentityClient for GraphqlIdentityClient {
    async fn fetch_authenticated_user(
        &self,
        access_token: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(access_token)
            .json(&serde_json::json!({
                "operationName": "UserMiddleware",
                "query": USER_QUERY,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Status(response.status()));
        }

        let body: GraphqlResponse = response.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<&str> = body.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(IdentityError::Graphql(messages.join("; ")));
        }

        Ok(body.data.and_then(|d| d.my_auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_with_user_parses() {
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": {
                "myAuth": {
                    "id": "7e0d9e2a-4f44-4bb0-8f4c-0de774e89c3f",
                    "deletedDate": null,
                    "roleAssignments": []
                }
            }
        }))
        .unwrap();

        assert!(body.errors.is_empty());
        assert!(body.data.unwrap().my_auth.is_some());
    }

    #[test]
    fn test_null_my_auth_is_anonymous() {
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": { "myAuth": null }
        }))
        .unwrap();

        assert!(body.data.unwrap().my_auth.is_none());
    }

    #[test]
    fn test_graphql_errors_parse() {
        let body: GraphqlResponse = serde_json::from_value(serde_json::json!({
            "data": null,
            "errors": [{ "message": "Unauthenticated." }]
        }))
        .unwrap();

        assert_eq!(body.errors.len(), 1);
        assert_eq!(body.errors[0].message, "Unauthenticated.");
    }
}
