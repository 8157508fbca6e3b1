use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConflictReason},
    middlewares::guard::{self, Caller},
    modules::report::{
        model::{NewReport, ReportResponse},
        schema::ReportEntity,
    },
    store::{Store, Transaction},
    utils::Pagination,
};

/// Reports filed about one user, newest first.
pub async fn reports_about<T>(
    tx: &mut T,
    user_id: &Uuid,
) -> Result<Vec<ReportResponse>, error::SystemError>
where
    T: Transaction + ?Sized,
{
    tx.list_reports_about(user_id).await
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn Store>,
}

impl ReportService {
    pub fn with_dependencies(store: Arc<dyn Store>) -> Self {
        info!("ReportService initialized with dependencies");
        ReportService { store }
    }

    pub async fn create(
        &self,
        caller: &Caller,
        about_id: Uuid,
        info: String,
    ) -> Result<ReportEntity, error::SystemError> {
        if info.trim().is_empty() {
            return Err(error::SystemError::bad_request("Report info can't be empty"));
        }

        let mut tx = self.store.begin().await?;

        if tx.find_user(&about_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }
        if caller.id == about_id {
            return Err(error::SystemError::conflict(ConflictReason::SelfTarget));
        }

        let report = tx
            .insert_report(&NewReport { id: Uuid::now_v7(), by_id: caller.id, about_id, info })
            .await?;
        tx.commit().await?;

        info!("User {} reported {}", caller.id, about_id);
        Ok(report)
    }

    pub async fn list(
        &self,
        caller: &Caller,
        page: &Pagination,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        guard::ensure_admin(caller)?;

        let mut tx = self.store.begin().await?;
        tx.list_reports(page).await
    }
}
