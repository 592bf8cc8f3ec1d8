// teamline-service/src/models/friendship.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    // Reserved for a future blocking feature; never written today.
    Blocked,
}

/// One row per unordered pair of users. The requester/addressee split
/// records who asked first; it carries no meaning once accepted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Friendship {
    pub id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: FriendshipStatus,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    pub fn new(requester_id: String, addressee_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            requester_id,
            addressee_id,
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        }
    }

    // The user on the other side of the relationship
    pub fn other_side(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.addressee_id
        } else {
            &self.requester_id
        }
    }

    pub fn touches(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.addressee_id == user_id
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FriendRequestCreate {
    pub addressee_username: String,
}
