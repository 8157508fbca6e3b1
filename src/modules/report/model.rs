use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::model::PublicProfile;

#[derive(Debug, Deserialize, Validate)]
pub struct ReportBody {
    #[validate(length(min = 1, max = 2000, message = "Info must be between 1 and 2000 characters"))]
    pub info: String,
}

pub struct NewReport {
    pub id: Uuid,
    pub by_id: Uuid,
    pub about_id: Uuid,
    pub info: String,
}

#[derive(sqlx::FromRow)]
pub struct ReportRow {
    pub id: Uuid,
    pub info: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub by_id: Uuid,
    pub by_login: String,
    pub by_info: String,
    pub about_id: Uuid,
    pub about_login: String,
    pub about_info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub by: PublicProfile,
    pub about: PublicProfile,
    pub info: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReportRow> for ReportResponse {
    fn from(row: ReportRow) -> Self {
        ReportResponse {
            id: row.id,
            by: PublicProfile { id: row.by_id, login: row.by_login, info: row.by_info },
            about: PublicProfile { id: row.about_id, login: row.about_login, info: row.about_info },
            info: row.info,
            created_at: row.created_at,
        }
    }
}
