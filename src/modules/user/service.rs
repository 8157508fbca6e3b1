use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConflictReason},
    middlewares::guard::{self, Caller},
    modules::{
        friend::query,
        report::service::reports_about,
        user::{
            model::{InsertUser, SignUpModel, UpdateUser, UpdateUserModel, UserResponse},
            schema::UserEntity,
        },
    },
    store::Store,
    utils::Pagination,
};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn with_dependencies(store: Arc<dyn Store>) -> Self {
        info!("UserService initialized with dependencies");
        UserService { store }
    }

    pub async fn sign_up(
        &self,
        caller: Option<&Caller>,
        user: SignUpModel,
    ) -> Result<UserEntity, error::SystemError> {
        guard::ensure_can_grant_admin(caller, user.admin)?;

        let mut tx = self.store.begin().await?;

        if tx.login_taken(&user.login, None).await? {
            return Err(error::SystemError::conflict(ConflictReason::LoginTaken));
        }

        let new_user = InsertUser {
            id: Uuid::now_v7(),
            login: user.login,
            info: user.info,
            admin: user.admin,
        };
        let entity = tx.insert_user(&new_user).await?;
        tx.commit().await?;

        info!("User {} signed up as {}", entity.id, entity.login);
        Ok(entity)
    }

    pub async fn list(&self, page: &Pagination) -> Result<Vec<UserResponse>, error::SystemError> {
        let mut tx = self.store.begin().await?;
        let users = tx.list_users(page).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserEntity, error::SystemError> {
        let mut tx = self.store.begin().await?;
        tx.find_user(&id).await?.ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    pub async fn get_by_login(&self, login: &str) -> Result<UserEntity, error::SystemError> {
        let mut tx = self.store.begin().await?;
        tx.find_user_by_login(login)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))
    }

    /// Public fields for everyone; relations for self or admin; reports for
    /// admins. Everything is read from one snapshot.
    pub async fn show(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<UserResponse, error::SystemError> {
        let mut tx = self.store.begin().await?;

        let entity = tx
            .find_user(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        let mut user = UserResponse::from(entity);

        if guard::can_view_private(caller, &id) {
            user.friends = Some(query::list_friends(tx.as_mut(), &id).await?);
            user.pending_requests = Some(query::list_outgoing(tx.as_mut(), &id).await?);
            user.incoming_requests = Some(query::list_incoming(tx.as_mut(), &id).await?);
        }

        if guard::can_view_reports(caller) {
            user.reports = Some(reports_about(tx.as_mut(), &id).await?);
        }

        Ok(user)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<UserEntity, error::SystemError> {
        guard::ensure_self_or_admin(caller, &id)?;
        guard::ensure_can_grant_admin(Some(caller), user.admin == Some(true))?;

        if user.login.is_none() && user.info.is_none() && user.admin.is_none() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let mut tx = self.store.begin().await?;

        if tx.find_user(&id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        if let Some(login) = &user.login {
            if tx.login_taken(login, Some(&id)).await? {
                return Err(error::SystemError::conflict(ConflictReason::LoginTaken));
            }
        }

        let update_user = UpdateUser { login: user.login, info: user.info, admin: user.admin };
        let entity = tx.update_user(&id, &update_user).await?;
        tx.commit().await?;

        info!("User {} updated by {}", id, caller.id);
        Ok(entity)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), error::SystemError> {
        guard::ensure_self_or_admin(caller, &id)?;

        let mut tx = self.store.begin().await?;
        if !tx.delete_user(&id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }
        tx.commit().await?;

        info!("User {} deleted by {}", id, caller.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        modules::{friend::service::FriendService, report::service::ReportService},
        store::MemoryStore,
    };

    struct Fixture {
        users: UserService,
        friends: FriendService,
        reports: ReportService,
    }

    impl Fixture {
        fn new() -> Self {
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            let reports = ReportService::with_dependencies(store.clone());
            Fixture {
                users: UserService::with_dependencies(store.clone()),
                friends: FriendService::with_dependencies(store),
                reports,
            }
        }

        async fn sign_up(&self, login: &str) -> Caller {
            let model = SignUpModel { login: login.into(), info: String::new(), admin: false };
            let user = self.users.sign_up(None, model).await.unwrap();
            Caller { id: user.id, is_admin: user.admin }
        }

        async fn admin(&self) -> Caller {
            let first = self.sign_up("root").await;
            let root = Caller { is_admin: true, ..first };
            self.users
                .update(
                    &root,
                    first.id,
                    UpdateUserModel { admin: Some(true), ..Default::default() },
                )
                .await
                .unwrap();
            root
        }
    }

    #[actix_web::test]
    async fn test_duplicate_login_is_conflict() {
        let f = Fixture::new();
        f.sign_up("alice").await;

        let model = SignUpModel { login: "ALICE".into(), info: String::new(), admin: false };
        let err = f.users.sign_up(None, model).await.unwrap_err();
        assert!(err.is_conflict(&ConflictReason::LoginTaken));
    }

    #[actix_web::test]
    async fn test_admin_signup_needs_admin_caller() {
        let f = Fixture::new();
        let alice = f.sign_up("alice").await;
        let admin = f.admin().await;

        let model = || SignUpModel { login: "boss".into(), info: String::new(), admin: true };

        let err = f.users.sign_up(None, model()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
        let err = f.users.sign_up(Some(&alice), model()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let boss = f.users.sign_up(Some(&admin), model()).await.unwrap();
        assert!(boss.admin);
    }

    #[actix_web::test]
    async fn test_self_escalation_is_forbidden() {
        let f = Fixture::new();
        let alice = f.sign_up("alice").await;

        let err = f
            .users
            .update(&alice, alice.id, UpdateUserModel { admin: Some(true), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let model = UpdateUserModel { info: Some("hello".into()), ..Default::default() };
        let updated = f.users.update(&alice, alice.id, model).await.unwrap();
        assert_eq!(updated.info, "hello");
        assert!(!updated.admin);
    }

    #[actix_web::test]
    async fn test_update_rules() {
        let f = Fixture::new();
        let alice = f.sign_up("alice").await;
        let bob = f.sign_up("bob").await;
        let admin = f.admin().await;

        let model = UpdateUserModel { info: Some("x".into()), ..Default::default() };
        let err = f.users.update(&bob, alice.id, model).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        let model = UpdateUserModel { login: Some("Alice".into()), ..Default::default() };
        let err = f.users.update(&bob, bob.id, model).await.unwrap_err();
        assert!(err.is_conflict(&ConflictReason::LoginTaken));

        let err = f.users.update(&bob, bob.id, UpdateUserModel::default()).await.unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        let model = UpdateUserModel { login: Some("robert".into()), ..Default::default() };
        let renamed = f.users.update(&admin, bob.id, model).await.unwrap();
        assert_eq!(renamed.login, "robert");
    }

    #[actix_web::test]
    async fn test_show_hides_private_fields() {
        let f = Fixture::new();
        let alice = f.sign_up("alice").await;
        let bob = f.sign_up("bob").await;
        let admin = f.admin().await;

        f.friends.send_friend_request(alice.id, bob.id, None).await.unwrap();
        f.reports.create(&bob, alice.id, "rude".into()).await.unwrap();

        let own = f.users.show(&alice, alice.id).await.unwrap();
        assert_eq!(own.pending_requests.as_ref().map(Vec::len), Some(1));
        assert_eq!(own.incoming_requests.as_ref().map(Vec::len), Some(0));
        assert!(own.friends.is_some());
        assert!(own.reports.is_none());

        let other = f.users.show(&bob, alice.id).await.unwrap();
        assert!(other.friends.is_none());
        assert!(other.pending_requests.is_none());
        assert!(other.reports.is_none());

        let by_admin = f.users.show(&admin, alice.id).await.unwrap();
        assert!(by_admin.friends.is_some());
        assert_eq!(by_admin.reports.as_ref().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn test_delete_cascades_and_needs_self_or_admin() {
        let f = Fixture::new();
        let alice = f.sign_up("alice").await;
        let bob = f.sign_up("bob").await;

        let request = f.friends.send_friend_request(alice.id, bob.id, None).await.unwrap();
        f.friends.accept_friend_request(&bob, request.id).await.unwrap();

        let err = f.users.delete(&bob, alice.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));

        f.users.delete(&alice, alice.id).await.unwrap();

        let err = f.users.get_by_id(alice.id).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
        let bob_view = f.users.show(&bob, bob.id).await.unwrap();
        assert_eq!(bob_view.friends.map(|v| v.len()), Some(0));
    }

    #[actix_web::test]
    async fn test_list_is_paginated_newest_first() {
        let f = Fixture::new();
        for login in ["a", "b", "c"] {
            f.sign_up(login).await;
        }

        let first = f.users.list(&Pagination::new(1, 2)).await.unwrap();
        let logins: Vec<_> = first.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, ["c", "b"]);

        let second = f.users.list(&Pagination::new(2, 2)).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].login, "a");
    }
}
