use uuid::Uuid;

use crate::{
    api::error,
    modules::user::model::{InsertUser, UpdateUser},
    modules::user::schema::UserEntity,
    utils::Pagination,
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_user(&mut self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_user_by_login(
        &mut self,
        login: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;

    /// Case-insensitive; `except` excludes the user being updated.
    async fn login_taken(
        &mut self,
        login: &str,
        except: Option<&Uuid>,
    ) -> Result<bool, error::SystemError>;

    async fn list_users(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<UserEntity>, error::SystemError>;

    async fn insert_user(&mut self, user: &InsertUser) -> Result<UserEntity, error::SystemError>;

    async fn update_user(
        &mut self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<UserEntity, error::SystemError>;

    /// Removes the user together with every request, friendship and report
    /// that references it.
    async fn delete_user(&mut self, id: &Uuid) -> Result<bool, error::SystemError>;
}
