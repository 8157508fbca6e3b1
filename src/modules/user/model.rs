use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::{
    friend::model::{FriendRequestResponse, FriendResponse},
    report::model::ReportResponse,
    user::schema::UserEntity,
};

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(length(min = 1, max = 64, message = "Login must be between 1 and 64 characters"))]
    pub login: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Info must be at most 2000 characters long"))]
    pub info: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserModel {
    #[validate(length(min = 1, max = 64, message = "Login must be between 1 and 64 characters"))]
    pub login: Option<String>,
    #[validate(length(max = 2000, message = "Info must be at most 2000 characters long"))]
    pub info: Option<String>,
    pub admin: Option<bool>,
}

pub struct InsertUser {
    pub id: Uuid,
    pub login: String,
    pub info: String,
    pub admin: bool,
}

pub struct UpdateUser {
    pub login: Option<String>,
    pub info: Option<String>,
    pub admin: Option<bool>,
}

/// Fields anyone may see about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub login: String,
    pub info: String,
}

impl From<UserEntity> for PublicProfile {
    fn from(user: UserEntity) -> Self {
        PublicProfile { id: user.id, login: user.login, info: user.info }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub login: String,
    pub info: String,
    pub admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friends: Option<Vec<FriendResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<Vec<FriendRequestResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_requests: Option<Vec<FriendRequestResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports: Option<Vec<ReportResponse>>,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            login: entity.login,
            info: entity.info,
            admin: entity.admin,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            friends: None,
            pending_requests: None,
            incoming_requests: None,
            reports: None,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}
