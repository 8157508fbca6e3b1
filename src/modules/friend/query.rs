//! Relationship reads, always inside the caller's transaction so a check
//! and the write that depends on it see the same snapshot.

use uuid::Uuid;

use crate::{
    api::error,
    modules::friend::{
        model::{FriendRequestResponse, FriendResponse},
        schema::Edge,
    },
    store::Transaction,
};

pub async fn are_friends<T>(
    tx: &mut T,
    user_id: &Uuid,
    other_id: &Uuid,
) -> Result<bool, error::SystemError>
where
    T: Transaction + ?Sized,
{
    let Ok(edge) = Edge::new(*user_id, *other_id) else {
        return Ok(false);
    };
    tx.edge_exists(&edge).await
}

/// A PENDING request in either direction.
pub async fn has_pending_request<T>(
    tx: &mut T,
    user_id: &Uuid,
    other_id: &Uuid,
) -> Result<bool, error::SystemError>
where
    T: Transaction + ?Sized,
{
    let Ok(edge) = Edge::new(*user_id, *other_id) else {
        return Ok(false);
    };
    Ok(tx.find_pending_between(&edge).await?.is_some())
}

pub async fn list_friends<T>(
    tx: &mut T,
    user_id: &Uuid,
) -> Result<Vec<FriendResponse>, error::SystemError>
where
    T: Transaction + ?Sized,
{
    tx.list_friends(user_id).await
}

pub async fn list_incoming<T>(
    tx: &mut T,
    user_id: &Uuid,
) -> Result<Vec<FriendRequestResponse>, error::SystemError>
where
    T: Transaction + ?Sized,
{
    tx.list_incoming(user_id).await
}

pub async fn list_outgoing<T>(
    tx: &mut T,
    user_id: &Uuid,
) -> Result<Vec<FriendRequestResponse>, error::SystemError>
where
    T: Transaction + ?Sized,
{
    tx.list_outgoing(user_id).await
}
