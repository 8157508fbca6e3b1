//! Authorization rules.
//!
//! Every decision is a pure function of the authenticated [`Caller`] and the
//! target, so handlers and services can ask before touching storage.

use log::debug;
use uuid::Uuid;

use crate::{
    api::error::SystemError, modules::friend::schema::FriendRequestEntity, utils::Claims,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub is_admin: bool,
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        Caller { id: claims.sub, is_admin: claims.admin }
    }
}

/// Friends and in/out requests of `user_id`.
pub fn can_view_private(caller: &Caller, user_id: &Uuid) -> bool {
    caller.id == *user_id || caller.is_admin
}

pub fn can_view_reports(caller: &Caller) -> bool {
    caller.is_admin
}

/// Only the recipient resolves a request. Admins included in the "no".
pub fn ensure_recipient(
    caller: &Caller,
    request: &FriendRequestEntity,
) -> Result<(), SystemError> {
    if caller.id != request.to_id {
        debug!(
            "User {} denied on friend request {} addressed to {}",
            caller.id, request.id, request.to_id
        );
        return Err(SystemError::forbidden("Only the recipient can answer a friend request"));
    }
    Ok(())
}

pub fn ensure_self_or_admin(caller: &Caller, user_id: &Uuid) -> Result<(), SystemError> {
    if !can_view_private(caller, user_id) {
        debug!("User {} denied acting on behalf of {}", caller.id, user_id);
        return Err(SystemError::forbidden("You can only do this for your own account"));
    }
    Ok(())
}

/// Granting admin rights needs an admin caller; anything else is unrestricted.
pub fn ensure_can_grant_admin(caller: Option<&Caller>, admin: bool) -> Result<(), SystemError> {
    if admin && !caller.is_some_and(|c| c.is_admin) {
        debug!("Admin escalation denied for caller {:?}", caller.map(|c| c.id));
        return Err(SystemError::forbidden("Only admins can grant admin rights"));
    }
    Ok(())
}

pub fn ensure_admin(caller: &Caller) -> Result<(), SystemError> {
    if !caller.is_admin {
        debug!("User {} denied an admin-only action", caller.id);
        return Err(SystemError::forbidden("Admin only"));
    }
    Ok(())
}
