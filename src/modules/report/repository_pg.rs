use uuid::Uuid;

use crate::{
    api::error,
    modules::report::{
        model::{NewReport, ReportResponse, ReportRow},
        repository::ReportRepository,
        schema::ReportEntity,
    },
    store::pg::PgTransaction,
    utils::Pagination,
};

const REPORT_SELECT: &str = r#"
    SELECT
        r.id,
        r.info,
        r.created_at,
        b.id AS by_id,
        b.login AS by_login,
        b.info AS by_info,
        a.id AS about_id,
        a.login AS about_login,
        a.info AS about_info
    FROM reports r
    JOIN users b ON b.id = r.by_id
    JOIN users a ON a.id = r.about_id
"#;

#[async_trait::async_trait]
impl ReportRepository for PgTransaction {
    async fn insert_report(
        &mut self,
        report: &NewReport,
    ) -> Result<ReportEntity, error::SystemError> {
        let report = sqlx::query_as::<_, ReportEntity>(
            r#"
            INSERT INTO reports (id, by_id, about_id, info)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(report.id)
        .bind(report.by_id)
        .bind(report.about_id)
        .bind(&report.info)
        .fetch_one(self.conn())
        .await?;

        Ok(report)
    }

    async fn list_reports(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        let sql =
            format!("{REPORT_SELECT} ORDER BY r.created_at DESC, r.id DESC LIMIT $1 OFFSET $2");

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.conn())
            .await?;

        Ok(rows.into_iter().map(ReportResponse::from).collect())
    }

    async fn list_reports_about(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        let sql = format!("{REPORT_SELECT} WHERE r.about_id = $1 ORDER BY r.created_at DESC");

        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(user_id)
            .fetch_all(self.conn())
            .await?;

        Ok(rows.into_iter().map(ReportResponse::from).collect())
    }
}
