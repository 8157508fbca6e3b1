use serde::Serialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportEntity {
    pub id: Uuid,
    pub by_id: Uuid,
    pub about_id: Uuid,
    pub info: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
