use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod cache;
pub mod client;

pub use cache::UserCache;
pub use client::{GraphqlIdentityClient, IdentityClient, IdentityError};

/// Role names known to the platform. Assignments arrive from the upstream
/// API as plain strings; these constants are the route-guard vocabulary.
pub mod role_name {
    pub const GUEST: &str = "guest";
    pub const BASE_USER: &str = "base_user";
    pub const APPLICANT: &str = "applicant";
    pub const POOL_OPERATOR: &str = "pool_operator";
    pub const REQUEST_RESPONDER: &str = "request_responder";
    pub const COMMUNITY_MANAGER: &str = "community_manager";
    pub const PLATFORM_ADMIN: &str = "platform_admin";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedString {
    pub en: Option<String>,
    pub fr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub is_team_based: bool,
    pub display_name: LocalizedString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
}

/// A binding of the user to a named role, optionally scoped to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub role: Role,
    pub team: Option<Team>,
}

/// The authenticated user's identity as reported by the upstream API.
///
/// Valid only for the access token it was fetched with; the cache layer
/// enforces that keying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub deleted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role_assignments: Vec<RoleAssignment>,
}

impl AuthenticatedUser {
    /// Whether any of the user's role assignments carries one of the
    /// required role names. An empty requirement list always passes.
    pub fn has_any_role(&self, required: &[&str]) -> bool {
        if required.is_empty() {
            return true;
        }
        self.role_assignments
            .iter()
            .any(|assignment| required.contains(&assignment.role.name.as_str()))
    }
}
