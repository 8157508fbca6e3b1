use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        repository::UserRepository,
        schema::UserEntity,
    },
    store::pg::PgTransaction,
    utils::Pagination,
};

#[async_trait::async_trait]
impl UserRepository for PgTransaction {
    async fn find_user(&mut self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.conn())
            .await?;
        Ok(user)
    }

    async fn find_user_by_login(
        &mut self,
        login: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let user =
            sqlx::query_as::<_, UserEntity>("SELECT * FROM users WHERE lower(login) = lower($1)")
                .bind(login)
                .fetch_optional(self.conn())
                .await?;
        Ok(user)
    }

    async fn login_taken(
        &mut self,
        login: &str,
        except: Option<&Uuid>,
    ) -> Result<bool, error::SystemError> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE lower(login) = lower($1)
                AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(login)
        .bind(except)
        .fetch_one(self.conn())
        .await?;
        Ok(taken)
    }

    async fn list_users(
        &mut self,
        page: &Pagination,
    ) -> Result<Vec<UserEntity>, error::SystemError> {
        let users = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.conn())
        .await?;
        Ok(users)
    }

    async fn insert_user(&mut self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            "INSERT INTO users (id, login, info, admin) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.login)
        .bind(&user.info)
        .bind(user.admin)
        .fetch_one(self.conn())
        .await?;
        Ok(user)
    }

    async fn update_user(
        &mut self,
        id: &Uuid,
        user: &UpdateUser,
    ) -> Result<UserEntity, error::SystemError> {
        let user = sqlx::query_as::<_, UserEntity>(
            r#"
        UPDATE users
        SET
            login      = COALESCE($2, login),
            info       = COALESCE($3, info),
            admin      = COALESCE($4, admin),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&user.login) // $2: Option<String>
        .bind(&user.info) // $3: Option<String>
        .bind(user.admin) // $4: Option<bool>
        .fetch_optional(self.conn())
        .await?
        .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        Ok(user)
    }

    async fn delete_user(&mut self, id: &Uuid) -> Result<bool, error::SystemError> {
        // Relation rows go with the user through ON DELETE CASCADE.
        let rows = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.conn())
            .await?
            .rows_affected();

        Ok(rows > 0)
    }
}
