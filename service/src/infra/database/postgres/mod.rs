//! Postgres [`Database`] implementation.

mod user;

use deadpool_postgres::{Object, Pool, Runtime};
use derive_more::{Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::Config;
pub use refinery::{embed_migrations, Report, Runner};

/// Postgres [`Database`] client backed by a connection pool.
#[derive(Clone, Debug)]
pub struct Postgres {
    /// Pool of connections to the Postgres server.
    pool: Pool,
}

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// No connection is established until the first query.
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self { pool })
    }

    /// Applies the provided migrations to the database.
    ///
    /// # Errors
    ///
    /// If failed to connect to the database or to apply any migration.
    pub async fn migrate(
        &self,
        runner: &Runner,
    ) -> Result<Report, Traced<database::Error>> {
        let mut client = self.client().await.map_err(tracerr::wrap!())?;
        runner
            .run_async(&mut **client)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Takes a pooled connection.
    async fn client(&self) -> Result<Object, Traced<database::Error>> {
        self.pool
            .get()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Query execution error.
    #[display("Query failed: {_0}")]
    Query(tokio_postgres::Error),

    /// Error of creating a new connection pool.
    #[display("Failed to create a connection pool: {_0}")]
    PoolCreation(deadpool_postgres::CreatePoolError),

    /// Error of taking a connection from the pool.
    #[display("Connection pool error: {_0}")]
    Pool(deadpool_postgres::PoolError),

    /// Error of applying migrations.
    #[display("Migration failed: {_0}")]
    Migration(refinery::Error),
}
