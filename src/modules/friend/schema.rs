use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

use crate::api::error::{ConflictReason, SystemError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friend_request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Only PENDING may move, and only to a terminal state.
    pub fn transition(self, to: RequestStatus) -> Result<RequestStatus, SystemError> {
        if self.is_terminal() {
            return Err(SystemError::conflict(ConflictReason::InvalidState(self)));
        }
        match to {
            RequestStatus::Pending => {
                Err(SystemError::bad_request("Friend request is already pending"))
            }
            RequestStatus::Accepted | RequestStatus::Declined => Ok(to),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Declined => "DECLINED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendRequestEntity {
    pub id: Uuid,
    pub from_id: Uuid,
    pub to_id: Uuid,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendRequestEntity {
    pub fn edge(&self) -> Edge {
        Edge { a: self.from_id.min(self.to_id), b: self.from_id.max(self.to_id) }
    }
}

/// One direction of a friendship. Always stored together with its mirror row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendshipEntity {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Unordered pair of distinct users.
///
/// Friendships are persisted as two directional rows; an `Edge` is the single
/// value callers hand to the store so the duality stays inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    a: Uuid,
    b: Uuid,
}

impl Edge {
    pub fn new(user_id: Uuid, other_id: Uuid) -> Result<Self, SystemError> {
        if user_id == other_id {
            return Err(SystemError::conflict(ConflictReason::SelfTarget));
        }
        Ok(Edge { a: user_id.min(other_id), b: user_id.max(other_id) })
    }

    pub fn ends(&self) -> (Uuid, Uuid) {
        (self.a, self.b)
    }

    /// Both directional rows of the edge.
    pub fn rows(&self) -> [(Uuid, Uuid); 2] {
        [(self.a, self.b), (self.b, self.a)]
    }

    pub fn matches(&self, from_id: Uuid, to_id: Uuid) -> bool {
        self.rows().contains(&(from_id, to_id))
    }
}
