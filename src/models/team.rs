// teamline-service/src/models/team.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Role of a member within a team. The declaration order carries the
/// threshold semantics: Member < Manager < Admin. "Owner" is not a role,
/// it is the team's `owner_id` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Member = 0,
    Manager = 1,
    Admin = 2,
}

impl TeamRole {
    /// The one place role thresholds are compared.
    pub fn meets(&self, required: TeamRole) -> bool {
        *self >= required
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeamRole::Member => "member",
            TeamRole::Manager => "manager",
            TeamRole::Admin => "admin",
        }
    }
}

// Lifecycle state of a membership row. A pending row is an open
// invitation and grants no access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Pending,
    Accepted,
}

/// One row per (user, team) pair: the authoritative record of the user's
/// role and invitation status within that team.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Membership {
    pub id: String,
    pub user_id: String,
    pub team_id: String,
    pub role: TeamRole,
    pub status: MembershipStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(user_id: String, team_id: String, role: TeamRole, status: MembershipStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            team_id,
            role,
            status,
            joined_at: Utc::now(),
        }
    }
}

/// What a caller must be for an operation to proceed. Owner is checked
/// against the team's `owner_id`, never against the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Member,
    Manager,
    Admin,
    Owner,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeamData {
    pub name: String,
    pub description: Option<String>,
}

// Request to invite a user to a team by email
#[derive(Serialize, Deserialize, Debug)]
pub struct InviteRequest {
    pub email: String,
    pub role: TeamRole,
}

// Accept/decline body shared by invitation and friend-request responses
#[derive(Serialize, Deserialize, Debug)]
pub struct RespondRequest {
    pub accept: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RoleUpdate {
    pub role: TeamRole,
}
