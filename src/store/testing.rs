//! A store whose next transactions read a stale snapshot, standing in for a
//! Postgres transaction that raced a concurrent commit.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use uuid::Uuid;

use crate::{
    api::error::{self, ConflictReason},
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendResponse, NewFriendRequest},
            repository::{FriendRequestRepository, FriendshipRepository},
            schema::{Edge, FriendRequestEntity, RequestStatus},
        },
        report::{
            model::{NewReport, ReportResponse},
            repository::ReportRepository,
            schema::ReportEntity,
        },
        user::{
            model::{InsertUser, UpdateUser},
            repository::UserRepository,
            schema::UserEntity,
        },
    },
    store::{MemoryStore, Store, Transaction},
    utils::Pagination,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Stale reads only. Writes reach the memory constraints.
    HidePending,
    /// Stale reads, and every relationship write aborts as a serialization
    /// failure.
    SerializeWrites,
}

pub struct StaleStore {
    inner: MemoryStore,
    stale: AtomicUsize,
    fault: Fault,
}

impl StaleStore {
    pub fn new(fault: Fault) -> Arc<Self> {
        Arc::new(StaleStore { inner: MemoryStore::new(), stale: AtomicUsize::new(0), fault })
    }

    /// The next `count` transactions see no pending requests, no
    /// friendships, and every request as pending.
    pub fn stale_next(&self, count: usize) {
        self.stale.store(count, Ordering::SeqCst);
    }

    fn take_stale(&self) -> bool {
        self.stale
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait::async_trait]
impl Store for StaleStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, error::SystemError> {
        let inner = self.inner.begin().await?;
        if self.take_stale() {
            Ok(Box::new(StaleTransaction { inner, fault: self.fault }))
        } else {
            Ok(inner)
        }
    }
}

struct StaleTransaction {
    inner: Box<dyn Transaction>,
    fault: Fault,
}

impl StaleTransaction {
    fn write_fault(&self) -> Result<(), error::SystemError> {
        match self.fault {
            Fault::SerializeWrites => {
                Err(error::SystemError::conflict(ConflictReason::Serialization))
            }
            Fault::HidePending => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl Transaction for StaleTransaction {
    async fn commit(self: Box<Self>) -> Result<(), error::SystemError> {
        self.inner.commit().await
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for StaleTransaction {
    async fn edge_exists(&mut self, _edge: &Edge) -> Result<bool, error::SystemError> {
        Ok(false)
    }

    async fn insert_edge(&mut self, edge: &Edge) -> Result<(), error::SystemError> {
        self.write_fault()?;
        self.inner.insert_edge(edge).await
    }

    async fn delete_edge(&mut self, edge: &Edge) -> Result<u64, error::SystemError> {
        self.inner.delete_edge(edge).await
    }

    async fn list_friends(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        self.inner.list_friends(user_id).await
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for StaleTransaction {
    async fn find_request(
        &mut self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = self.inner.find_request(request_id).await?;
        Ok(request.map(|request| FriendRequestEntity { status: RequestStatus::Pending, ..request }))
    }

    async fn find_pending_between(
        &mut self,
        _edge: &Edge,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(None)
    }

    async fn insert_request(
        &mut self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.write_fault()?;
        self.inner.insert_request(request).await
    }

    async fn update_request_status(
        &mut self,
        request_id: &Uuid,
        status: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.write_fault()?;
        self.inner.update_request_status(request_id, status).await
    }

    async fn list_outgoing(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        self.inner.list_outgoing(user_id).await
    }

    async fn list_incoming(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        self.inner.list_incoming(user_id).await
    }
}

#[async_trait::async_trait]
impl UserRepository for StaleTransaction {
    async fn find_user(&mut self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_login(
        &mut self,
        login: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        self.inner.find_user_by_login(login).await
    }

    async fn login_taken(
        &mut self,
        login: &str,
        except: Option<&Uuid>,
    ) -> Result<bool, error::SystemError> {
        self.inner.login_taken(login, except).await
    }

    async fn list_users(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        self.inner.list_users(page).await
    }

    async fn insert_user(&mut self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        self.inner.insert_user(user).await
    }

    async fn update_user(
        &mut self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<UserEntity, error::SystemError> {
        self.inner.update_user(id, user).await
    }

    async fn delete_user(&mut self, id: &Uuid) -> Result<bool, error::SystemError> {
        self.inner.delete_user(id).await
    }
}

#[async_trait::async_trait]
impl ReportRepository for StaleTransaction {
    async fn insert_report(
        &mut self,
        report: &NewReport,
    ) -> Result<ReportEntity, error::SystemError> {
        self.inner.insert_report(report).await
    }

    async fn list_reports(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        self.inner.list_reports(page).await
    }

    async fn list_reports_about(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        self.inner.list_reports_about(user_id).await
    }
}
