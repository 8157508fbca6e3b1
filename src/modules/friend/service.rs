use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    api::error::{self, ConflictReason},
    middlewares::guard::{self, Caller},
    modules::friend::{
        model::NewFriendRequest,
        query,
        schema::{Edge, FriendRequestEntity, RequestStatus},
    },
    store::Store,
};

fn is_serialization_failure(err: &error::SystemError) -> bool {
    err.is_conflict(&ConflictReason::Serialization)
}

#[derive(Clone)]
pub struct FriendService {
    store: Arc<dyn Store>,
}

impl FriendService {
    pub fn with_dependencies(store: Arc<dyn Store>) -> Self {
        info!("FriendService initialized with dependencies");
        FriendService { store }
    }

    pub async fn send_friend_request(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        match self.create_request(from_id, to_id, message).await {
            Err(err) if is_serialization_failure(&err) => {
                Err(self.explain_create_conflict(from_id, to_id, err).await)
            }
            result => result,
        }
    }

    async fn create_request(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        message: Option<String>,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tx = self.store.begin().await?;

        for id in [&from_id, &to_id] {
            if tx.find_user(id).await?.is_none() {
                return Err(error::SystemError::not_found("User not found"));
            }
        }

        Edge::new(from_id, to_id)?;

        if query::are_friends(tx.as_mut(), &from_id, &to_id).await? {
            return Err(error::SystemError::conflict(ConflictReason::AlreadyFriends));
        }

        if query::has_pending_request(tx.as_mut(), &from_id, &to_id).await? {
            return Err(error::SystemError::conflict(ConflictReason::DuplicateRequest));
        }

        // The pending-pair unique constraint still decides races that slip
        // past the checks above.
        let request = tx
            .insert_request(&NewFriendRequest {
                id: Uuid::now_v7(),
                from_id,
                to_id,
                message: message.unwrap_or_default(),
            })
            .await?;

        tx.commit().await?;

        info!("Friend request {} sent from {} to {}", request.id, from_id, to_id);
        Ok(request)
    }

    /// A create aborted by a concurrent transaction lost to whatever that
    /// transaction committed. Reads the committed state to name it.
    async fn explain_create_conflict(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        cause: error::SystemError,
    ) -> error::SystemError {
        let reason = async {
            let mut tx = self.store.begin().await?;
            if query::are_friends(tx.as_mut(), &from_id, &to_id).await? {
                return Ok(Some(ConflictReason::AlreadyFriends));
            }
            if query::has_pending_request(tx.as_mut(), &from_id, &to_id).await? {
                return Ok(Some(ConflictReason::DuplicateRequest));
            }
            Ok::<_, error::SystemError>(None)
        };

        match reason.await {
            Ok(Some(reason)) => error::SystemError::conflict(reason),
            Ok(None) => cause,
            Err(err) => {
                warn!("Could not explain friend request conflict: {:?}", err);
                cause
            }
        }
    }

    pub async fn accept_friend_request(
        &self,
        caller: &Caller,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.resolve(caller, request_id, RequestStatus::Accepted).await
    }

    pub async fn decline_friend_request(
        &self,
        caller: &Caller,
        request_id: Uuid,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        self.resolve(caller, request_id, RequestStatus::Declined).await
    }

    async fn resolve(
        &self,
        caller: &Caller,
        request_id: Uuid,
        to: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        match self.transition_request(caller, request_id, to).await {
            Err(err) if is_serialization_failure(&err) => {
                Err(self.explain_resolve_conflict(caller, request_id, err).await)
            }
            result => result,
        }
    }

    async fn transition_request(
        &self,
        caller: &Caller,
        request_id: Uuid,
        to: RequestStatus,
    ) -> Result<FriendRequestEntity, error::SystemError> {
        let mut tx = self.store.begin().await?;

        let request = tx
            .find_request(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        guard::ensure_recipient(caller, &request)?;

        let status = request.status.transition(to)?;
        let updated = tx.update_request_status(&request.id, status).await?;

        if status == RequestStatus::Accepted {
            tx.insert_edge(&request.edge()).await?;
        }

        tx.commit().await?;

        info!("Friend request {} moved {} -> {}", request.id, request.status, updated.status);
        Ok(updated)
    }

    /// Same checks as [`Self::transition_request`], against the state the
    /// winning transaction committed.
    async fn explain_resolve_conflict(
        &self,
        caller: &Caller,
        request_id: Uuid,
        cause: error::SystemError,
    ) -> error::SystemError {
        let committed = async {
            let mut tx = self.store.begin().await?;
            tx.find_request(&request_id).await
        };

        match committed.await {
            Ok(None) => error::SystemError::not_found("Friend request not found"),
            Ok(Some(request)) => match guard::ensure_recipient(caller, &request) {
                Err(err) => err,
                Ok(()) if request.status.is_terminal() => {
                    error::SystemError::conflict(ConflictReason::InvalidState(request.status))
                }
                Ok(()) => cause,
            },
            Err(err) => {
                warn!("Could not explain friend request conflict: {:?}", err);
                cause
            }
        }
    }

    /// Removes the friendship between `user_id` and `friend_id`. Returns the
    /// number of directional rows removed, 0 when they weren't friends.
    pub async fn unfriend(
        &self,
        caller: &Caller,
        user_id: Uuid,
        friend_id: Uuid,
    ) -> Result<u64, error::SystemError> {
        guard::ensure_self_or_admin(caller, &user_id)?;
        let edge = Edge::new(user_id, friend_id)?;

        let mut tx = self.store.begin().await?;

        if tx.find_user(&friend_id).await?.is_none() {
            return Err(error::SystemError::not_found("User not found"));
        }

        let removed = tx.delete_edge(&edge).await?;
        tx.commit().await?;

        if removed > 0 {
            info!("Users {} and {} are no longer friends", user_id, friend_id);
        }
        Ok(removed)
    }
}
