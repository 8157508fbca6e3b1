use sqlx::{PgConnection, PgPool, Postgres};

use crate::{
    api::error,
    store::{Store, Transaction},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub struct PgTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl PgTransaction {
    pub(crate) fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn Transaction>, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        // Friend request checks read rows that a concurrent insert could
        // invalidate; serializable makes the whole check-then-write atomic.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE").execute(&mut *tx).await?;

        Ok(Box::new(PgTransaction { tx }))
    }
}

#[async_trait::async_trait]
impl Transaction for PgTransaction {
    async fn commit(self: Box<Self>) -> Result<(), error::SystemError> {
        self.tx.commit().await?;
        Ok(())
    }
}
