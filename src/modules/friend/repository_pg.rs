use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendRequestResponse, FriendResponse, NewFriendRequest, RequestUserRow},
        repository::{FriendRequestRepository, FriendshipRepository},
        schema::{Edge, FriendRequestEntity, RequestStatus},
    },
    store::pg::PgTransaction,
};

#[async_trait::async_trait]
impl FriendshipRepository for PgTransaction {
    async fn edge_exists(&mut self, edge: &Edge) -> Result<bool, error::SystemError> {
        let (user_id, friend_id) = edge.ends();

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(user_id)
        .bind(friend_id)
        .fetch_one(self.conn())
        .await?;

        Ok(exists)
    }

    async fn insert_edge(&mut self, edge: &Edge) -> Result<(), error::SystemError> {
        let (user_a, user_b) = edge.ends();

        sqlx::query("INSERT INTO friendships (user_id, friend_id) VALUES ($1, $2), ($2, $1)")
            .bind(user_a)
            .bind(user_b)
            .execute(self.conn())
            .await?;

        Ok(())
    }

    async fn delete_edge(&mut self, edge: &Edge) -> Result<u64, error::SystemError> {
        let (user_a, user_b) = edge.ends();

        let rows = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE
                (user_id = $1 AND friend_id = $2)
            OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(self.conn())
        .await?
        .rows_affected();

        Ok(rows)
    }

    async fn list_friends(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendResponse>(
            r#"
            SELECT
                u.id,
                u.login,
                u.info,
                f.created_at AS since
            FROM friendships f
            JOIN users u
                ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn())
        .await?;

        Ok(friends)
    }
}

#[async_trait::async_trait]
impl FriendRequestRepository for PgTransaction {
    async fn find_request(
        &mut self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            "SELECT * FROM friend_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(self.conn())
        .await?;

        Ok(request)
    }

    async fn find_pending_between(
        &mut self,
        edge: &Edge,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError> {
        let (user_a, user_b) = edge.ends();

        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            SELECT *
            FROM friend_requests
            WHERE status = 'PENDING'
            AND (
                (from_id = $1 AND to_id = $2)
             OR (from_id = $2 AND to_id = $1)
            )
            LIMIT 1
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(self.conn())
        .await?;

        Ok(request)
    }

    async fn insert_request(
        &mut self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            INSERT INTO friend_requests (id, from_id, to_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.from_id)
        .bind(request.to_id)
        .bind(&request.message)
        .fetch_one(self.conn())
        .await?;

        Ok(request)
    }

    async fn update_request_status(
        &mut self,
        request_id: &Uuid,
        status: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let request = sqlx::query_as::<_, FriendRequestEntity>(
            r#"
            UPDATE friend_requests
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(status)
        .fetch_optional(self.conn())
        .await?
        .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        Ok(request)
    }

    async fn list_outgoing(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, RequestUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.login,
                u.info,
                fr.message,
                fr.status,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.to_id = u.id
            WHERE fr.from_id = $1 AND fr.status = 'PENDING'
            ORDER BY fr.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn())
        .await?;

        Ok(rows.into_iter().map(|r| r.into_outgoing(*user_id)).collect())
    }

    async fn list_incoming(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = sqlx::query_as::<_, RequestUserRow>(
            r#"
            SELECT
                fr.id AS req_id,
                u.id AS user_id,
                u.login,
                u.info,
                fr.message,
                fr.status,
                fr.created_at
            FROM friend_requests fr
            JOIN users u
                ON fr.from_id = u.id
            WHERE fr.to_id = $1 AND fr.status = 'PENDING'
            ORDER BY fr.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn())
        .await?;

        Ok(rows.into_iter().map(|r| r.into_incoming(*user_id)).collect())
    }
}
