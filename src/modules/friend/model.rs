use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::modules::{friend::schema::RequestStatus, user::model::PublicProfile};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendResponse {
    pub id: Uuid,
    pub login: String,
    pub info: String,
    pub since: chrono::DateTime<chrono::Utc>,
}

/// The owner of a request list is known by id only; the counterpart gets its
/// public profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrInfo {
    Id(Uuid),
    Info(PublicProfile),
}

#[derive(sqlx::FromRow)]
pub struct RequestUserRow {
    pub req_id: Uuid,
    pub user_id: Uuid,
    pub login: String,
    pub info: String,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RequestUserRow {
    fn counterpart(&self) -> PublicProfile {
        PublicProfile { id: self.user_id, login: self.login.clone(), info: self.info.clone() }
    }

    pub fn into_outgoing(self, owner_id: Uuid) -> FriendRequestResponse {
        FriendRequestResponse {
            id: self.req_id,
            from: IdOrInfo::Id(owner_id),
            to: IdOrInfo::Info(self.counterpart()),
            message: self.message,
            status: self.status,
            created_at: self.created_at,
        }
    }

    pub fn into_incoming(self, owner_id: Uuid) -> FriendRequestResponse {
        FriendRequestResponse {
            id: self.req_id,
            from: IdOrInfo::Info(self.counterpart()),
            to: IdOrInfo::Id(owner_id),
            message: self.message,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestResponse {
    pub id: Uuid,
    pub from: IdOrInfo,
    pub to: IdOrInfo,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FriendRequestBody {
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters long"))]
    pub message: Option<String>,
}

pub struct NewFriendRequest {
    pub id: Uuid,
    pub from_id: Uuid,
    pub to_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UnfriendResponse {
    pub removed: u64,
}
