use uuid::Uuid;

use crate::{
    api::error,
    modules::report::{
        model::{NewReport, ReportResponse},
        schema::ReportEntity,
    },
    utils::Pagination,
};

#[async_trait::async_trait]
pub trait ReportRepository {
    async fn insert_report(&mut self, report: &NewReport)
        -> Result<ReportEntity, error::SystemError>;

    async fn list_reports(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<ReportResponse>, error::SystemError>;

    async fn list_reports_about(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<ReportResponse>, error::SystemError>;
}
