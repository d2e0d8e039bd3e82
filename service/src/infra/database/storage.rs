//! [`Storage`] definitions.

use common::operations::{By, Insert, Select};
use derive_more::From;
use tracerr::Traced;

#[cfg(feature = "postgres")]
use super::Postgres;
use super::{Database, Error, Memory};
use crate::domain::{user, User};

/// [`Database`] chosen at runtime.
#[derive(Clone, Debug, From)]
pub enum Storage {
    /// [`Memory`] database.
    Memory(Memory),

    /// [`Postgres`] database.
    #[cfg(feature = "postgres")]
    Postgres(Postgres),
}

impl Database<Select<By<Option<User>, user::Id>>> for Storage {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        op: Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Memory(db) => db.execute(op).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(db) => db.execute(op).await,
        }
        .map_err(tracerr::wrap!())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Storage {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        op: Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Memory(db) => db.execute(op).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(db) => db.execute(op).await,
        }
        .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<user::New>> for Storage {
    type Ok = Option<User>;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        op: Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        match self {
            Self::Memory(db) => db.execute(op).await,
            #[cfg(feature = "postgres")]
            Self::Postgres(db) => db.execute(op).await,
        }
        .map_err(tracerr::wrap!())
    }
}
