//! Transactional persistence.
//!
//! Every service operation opens one [`Transaction`], issues repository calls
//! against it and commits. Dropping a transaction without committing rolls
//! it back, so an early `?` return never leaves partial effects behind.

use crate::{
    api::error,
    modules::{
        friend::repository::{FriendRequestRepository, FriendshipRepository},
        report::repository::ReportRepository,
        user::repository::UserRepository,
    },
};

pub mod memory;
pub mod pg;
#[cfg(test)]
pub mod testing;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn Transaction>, error::SystemError>;
}

#[async_trait::async_trait]
pub trait Transaction:
    UserRepository + FriendRequestRepository + FriendshipRepository + ReportRepository + Send
{
    async fn commit(self: Box<Self>) -> Result<(), error::SystemError>;
}
