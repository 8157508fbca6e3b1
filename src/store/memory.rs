//! Process-local store with the same constraints as the Postgres schema.
//!
//! A transaction holds the store lock for its whole lifetime and works on a
//! copy of the state; commit writes the copy back, drop discards it.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    api::error::{self, ConflictReason},
    modules::{
        friend::{
            model::{FriendRequestResponse, FriendResponse, NewFriendRequest, RequestUserRow},
            repository::{FriendRequestRepository, FriendshipRepository},
            schema::{Edge, FriendRequestEntity, FriendshipEntity, RequestStatus},
        },
        report::{
            model::{NewReport, ReportResponse, ReportRow},
            repository::ReportRepository,
            schema::ReportEntity,
        },
        user::{
            model::{InsertUser, UpdateUser},
            repository::UserRepository,
            schema::UserEntity,
        },
    },
    store::{Store, Transaction},
    utils::Pagination,
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    users: Vec<UserEntity>,
    requests: Vec<FriendRequestEntity>,
    friendships: Vec<FriendshipEntity>,
    reports: Vec<ReportEntity>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, error::SystemError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), error::SystemError> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

fn same_login(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Newest first; ties keep the most recently inserted row in front.
fn newest_first<T, F>(rows: impl DoubleEndedIterator<Item = T>, created_at: F) -> Vec<T>
where
    F: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

impl MemoryState {
    fn user(&self, id: &Uuid) -> Option<&UserEntity> {
        self.users.iter().find(|u| u.id == *id)
    }

    fn require_user(&self, id: &Uuid) -> Result<&UserEntity, error::SystemError> {
        self.user(id).ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    fn login_taken(&self, login: &str, except: Option<&Uuid>) -> bool {
        self.users.iter().any(|u| same_login(&u.login, login) && Some(&u.id) != except)
    }

    fn request_row(
        &self,
        request: &FriendRequestEntity,
        counterpart: &Uuid,
    ) -> Option<RequestUserRow> {
        let user = self.user(counterpart)?;
        Some(RequestUserRow {
            req_id: request.id,
            user_id: user.id,
            login: user.login.clone(),
            info: user.info.clone(),
            message: request.message.clone(),
            status: request.status,
            created_at: request.created_at,
        })
    }

    fn report_response(&self, report: &ReportEntity) -> Option<ReportResponse> {
        let by = self.user(&report.by_id)?;
        let about = self.user(&report.about_id)?;
        Some(ReportResponse::from(ReportRow {
            id: report.id,
            info: report.info.clone(),
            created_at: report.created_at,
            by_id: by.id,
            by_login: by.login.clone(),
            by_info: by.info.clone(),
            about_id: about.id,
            about_login: about.login.clone(),
            about_info: about.info.clone(),
        }))
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryTransaction {
    async fn find_user(&mut self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.working.user(id).cloned())
    }

    async fn find_user_by_login(
        &mut self,
        login: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.working.users.iter().find(|u| same_login(&u.login, login)).cloned())
    }

    async fn login_taken(
        &mut self,
        login: &str,
        except: Option<&Uuid>,
    ) -> Result<bool, error::SystemError> {
        Ok(self.working.login_taken(login, except))
    }

    async fn list_users(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = newest_first(self.working.users.iter().cloned(), |u| u.created_at);
        Ok(page.window(users))
    }

    async fn insert_user(&mut self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        if self.working.login_taken(&user.login, None) {
            return Err(error::SystemError::conflict(ConflictReason::LoginTaken));
        }
        if self.working.user(&user.id).is_some() {
            return Err(error::SystemError::conflict(ConflictReason::Duplicate(None)));
        }

        let now = chrono::Utc::now();
        let entity = UserEntity {
            id: user.id,
            login: user.login.clone(),
            info: user.info.clone(),
            admin: user.admin,
            created_at: now,
            updated_at: now,
        };
        self.working.users.push(entity.clone());
        Ok(entity)
    }

    async fn update_user(
        &mut self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<UserEntity, error::SystemError> {
        if let Some(login) = &user.login {
            if self.working.login_taken(login, Some(id)) {
                return Err(error::SystemError::conflict(ConflictReason::LoginTaken));
            }
        }

        let entity = self
            .working
            .users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        if let Some(login) = &user.login {
            entity.login = login.clone();
        }
        if let Some(info) = &user.info {
            entity.info = info.clone();
        }
        if let Some(admin) = user.admin {
            entity.admin = admin;
        }
        entity.updated_at = chrono::Utc::now();

        Ok(entity.clone())
    }

    async fn delete_user(&mut self, id: &Uuid) -> Result<bool, error::SystemError> {
        let state = &mut self.working;
        let before = state.users.len();
        state.users.retain(|u| u.id != *id);
        if state.users.len() == before {
            return Ok(false);
        }

        state.requests.retain(|r| r.from_id != *id && r.to_id != *id);
        state.friendships.retain(|f| f.user_id != *id && f.friend_id != *id);
        state.reports.retain(|r| r.by_id != *id && r.about_id != *id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for MemoryTransaction {
    async fn edge_exists(&mut self, edge: &Edge) -> Result<bool, error::SystemError> {
        let ends = edge.ends();
        Ok(self.working.friendships.iter().any(|f| (f.user_id, f.friend_id) == ends))
    }

    async fn insert_edge(&mut self, edge: &Edge) -> Result<(), error::SystemError> {
        let (a, b) = edge.ends();
        self.working.require_user(&a)?;
        self.working.require_user(&b)?;

        if self.working.friendships.iter().any(|f| edge.matches(f.user_id, f.friend_id)) {
            return Err(error::SystemError::conflict(ConflictReason::AlreadyFriends));
        }

        let now = chrono::Utc::now();
        for (user_id, friend_id) in edge.rows() {
            self.working.friendships.push(FriendshipEntity { user_id, friend_id, created_at: now });
        }
        Ok(())
    }

    async fn delete_edge(&mut self, edge: &Edge) -> Result<u64, error::SystemError> {
        let before = self.working.friendships.len();
        self.working.friendships.retain(|f| !edge.matches(f.user_id, f.friend_id));
        Ok((before - self.working.friendships.len()) as u64)
    }

    async fn list_friends(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let state = &self.working;
        let rows = newest_first(
            state.friendships.iter().filter(|f| f.user_id == *user_id),
            |f| f.created_at,
        );

        Ok(rows
            .into_iter()
            .filter_map(|f| {
                state.user(&f.friend_id).map(|u| FriendResponse {
                    id: u.id,
                    login: u.login.clone(),
                    info: u.info.clone(),
                    since: f.created_at,
                })
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for MemoryTransaction {
    async fn find_request(
        &mut self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self.working.requests.iter().find(|r| r.id == *request_id).cloned())
    }

    async fn find_pending_between(
        &mut self,
        edge: &Edge,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        Ok(self
            .working
            .requests
            .iter()
            .find(|r| r.status == RequestStatus::Pending && edge.matches(r.from_id, r.to_id))
            .cloned())
    }

    async fn insert_request(
        &mut self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let edge = Edge::new(request.from_id, request.to_id)?;
        self.working.require_user(&request.from_id)?;
        self.working.require_user(&request.to_id)?;

        let pending = self
            .working
            .requests
            .iter()
            .any(|r| r.status == RequestStatus::Pending && edge.matches(r.from_id, r.to_id));
        if pending {
            return Err(error::SystemError::conflict(ConflictReason::DuplicateRequest));
        }

        let now = chrono::Utc::now();
        let entity = FriendRequestEntity {
            id: request.id,
            from_id: request.from_id,
            to_id: request.to_id,
            message: request.message.clone(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.working.requests.push(entity.clone());
        Ok(entity)
    }

    async fn update_request_status(
        &mut self,
        request_id: &Uuid,
        status: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = self
            .working
            .requests
            .iter_mut()
            .find(|r| r.id == *request_id)
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        request.status = status;
        request.updated_at = chrono::Utc::now();
        Ok(request.clone())
    }

    async fn list_outgoing(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let state = &self.working;
        let requests = newest_first(
            state
                .requests
                .iter()
                .filter(|r| r.from_id == *user_id && r.status == RequestStatus::Pending),
            |r| r.created_at,
        );

        Ok(requests
            .into_iter()
            .filter_map(|r| state.request_row(r, &r.to_id))
            .map(|row| row.into_outgoing(*user_id))
            .collect())
    }

    async fn list_incoming(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let state = &self.working;
        let requests = newest_first(
            state
                .requests
                .iter()
                .filter(|r| r.to_id == *user_id && r.status == RequestStatus::Pending),
            |r| r.created_at,
        );

        Ok(requests
            .into_iter()
            .filter_map(|r| state.request_row(r, &r.from_id))
            .map(|row| row.into_incoming(*user_id))
            .collect())
    }
}

#[async_trait::async_trait]
impl ReportRepository for MemoryTransaction {
    async fn insert_report(
        &mut self,
        report: &NewReport,
    ) -> Result<ReportEntity, error::SystemError> {
        if report.by_id == report.about_id {
            return Err(error::SystemError::conflict(ConflictReason::SelfTarget));
        }
        self.working.require_user(&report.by_id)?;
        self.working.require_user(&report.about_id)?;

        let entity = ReportEntity {
            id: report.id,
            by_id: report.by_id,
            about_id: report.about_id,
            info: report.info.clone(),
            created_at: chrono::Utc::now(),
        };
        self.working.reports.push(entity.clone());
        Ok(entity)
    }

    async fn list_reports(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        let state = &self.working;
        let reports = newest_first(state.reports.iter(), |r| r.created_at);

        Ok(page.window(reports.into_iter().filter_map(|r| state.report_response(r))))
    }

    async fn list_reports_about(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<ReportResponse>, error::SystemError> {
        let state = &self.working;
        let reports =
            newest_first(state.reports.iter().filter(|r| r.about_id == *user_id), |r| r.created_at);

        Ok(reports.into_iter().filter_map(|r| state.report_response(r)).collect())
    }
}
