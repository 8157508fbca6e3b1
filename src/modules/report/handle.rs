use actix_web::{get, post, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_caller,
    modules::report::{
        model::{ReportBody, ReportResponse},
        schema::ReportEntity,
        service::ReportService,
    },
    utils::{Pagination, ValidatedJson, ValidatedQuery},
};

#[post("/users/{id}/report")]
pub async fn create_report(
    report_service: web::Data<ReportService>,
    about_id: web::Path<Uuid>,
    body: ValidatedJson<ReportBody>,
    req: HttpRequest,
) -> Result<success::Success<ReportEntity>, error::Error> {
    let caller = get_caller(&req)?;
    let report = report_service.create(&caller, about_id.into_inner(), body.0.info).await?;
    Ok(success::Success::created(Some(report)).message("Report filed successfully"))
}

#[get("/reports")]
pub async fn list_reports(
    report_service: web::Data<ReportService>,
    page: ValidatedQuery<Pagination>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ReportResponse>>, error::Error> {
    let caller = get_caller(&req)?;
    let reports = report_service.list(&caller, &page.0).await?;
    Ok(success::Success::ok(Some(reports)).message("Reports retrieved successfully"))
}
