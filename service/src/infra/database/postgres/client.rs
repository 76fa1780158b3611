//! Postgres database client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
///
/// Every operation runs on a connection taken from the pool for its duration.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub(crate) const fn from_pool(pool: connection::Pool) -> Self {
        Self { pool }
    }

    /// Takes a [`Connection`] from the pool of this [`NonTx`] client.
    async fn connection(
        &self,
    ) -> Result<connection::NonTx, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }

    /// Begins a new [`Tx`] on a pooled [`Connection`].
    ///
    /// # Errors
    ///
    /// If no connection is available or the transaction fails to start.
    pub async fn begin(&self) -> Result<Tx, Traced<database::Error>> {
        let conn = self.connection().await.map_err(tracerr::wrap!())?;
        let tx = connection::Tx::begin(conn)
            .await
            .map_err(tracerr::wrap!())?;
        Ok(Tx(Arc::new(RwLock::new(Some(tx)))))
    }
}

/// Transactional Postgres database client.
///
/// Clones share the same transaction.
#[derive(Clone, Debug)]
pub struct Tx(Arc<RwLock<Option<connection::Tx>>>);

impl Tx {
    /// Returns the running [`connection::Tx`] of this client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        RwLockReadGuard::try_map(self.0.read().await, Option::as_ref)
            .map_err(|_| postgres::Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If the transaction fails to commit or has been finished already.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let tx = self
            .0
            .write()
            .await
            .take()
            .ok_or(postgres::Error::Finished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

/// Implements [`Connection`] for a client by delegating to the [`Connection`]
/// returned by its `connection()` method.
macro_rules! delegate_connection {
    ($client:ty) => {
        impl Connection for $client {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn batch_exec(
                &self,
                query: &str,
            ) -> Result<(), Traced<database::Error>> {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .batch_exec(query)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}

delegate_connection!(NonTx);
delegate_connection!(Tx);
