use uuid::Uuid;

use crate::api::error;
use crate::modules::friend::model::{FriendRequestResponse, FriendResponse, NewFriendRequest};
use crate::modules::friend::schema::{Edge, FriendRequestEntity, RequestStatus};

/// Friendship rows, addressed only through [`Edge`].
#[async_trait::async_trait]
pub trait FriendshipRepository {
    async fn edge_exists(&mut self, edge: &Edge) -> Result<bool, error::SystemError>;

    /// Inserts both directional rows.
    async fn insert_edge(&mut self, edge: &Edge) -> Result<(), error::SystemError>;

    /// Deletes both directional rows, returning how many were removed.
    async fn delete_edge(&mut self, edge: &Edge) -> Result<u64, error::SystemError>;

    async fn list_friends(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendResponse>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait FriendRequestRepository {
    /// Loads a request and locks it for the rest of the transaction.
    async fn find_request(
        &mut self,
        request_id: &Uuid,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    async fn find_pending_between(
        &mut self,
        edge: &Edge,
    ) -> Result<Option<FriendRequestEntity>, error::SystemError>;

    /// Fails with `DuplicateRequest` when a pending request already exists for
    /// the pair, whichever direction it goes.
    async fn insert_request(
        &mut self,
        request: &NewFriendRequest,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn update_request_status(
        &mut self,
        request_id: &Uuid,
        status: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError>;

    async fn list_outgoing(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;

    async fn list_incoming(
        &mut self,
        user_id: &Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError>;
}
