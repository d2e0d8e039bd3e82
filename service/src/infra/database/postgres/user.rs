//! [`User`]-related [`Database`] implementations.

#![expect(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
};

use super::{Error, Postgres};

/// Columns of the `users` table forming a [`User`].
const COLUMNS: &str = "\
    id, email, password_hash, \
    first_name, last_name, \
    role, created_at";

/// Builds a [`User`] from a `users` table [`Row`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role: row.get("role"),
        created_at: row.get("created_at"),
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE id = $1::INT8"
        );
        Ok(self
            .client()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .as_ref()
            .map(from_row))
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM users \
             WHERE email = $1::VARCHAR \
             LIMIT 1"
        );
        Ok(self
            .client()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(&sql, &[email])
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?
            .as_ref()
            .map(from_row))
    }
}

impl Database<Insert<user::New>> for Postgres {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let user::New {
            email,
            password_hash,
            first_name,
            last_name,
            role,
            created_at,
        } = &new;

        // Unique `email` constraint turns a concurrent duplicate into no row.
        const SQL: &str = "\
            INSERT INTO users (\
                email, password_hash, \
                first_name, last_name, \
                role, created_at\
            ) \
            VALUES (\
                $1::VARCHAR, $2::VARCHAR, \
                $3::VARCHAR, $4::VARCHAR, \
                $5::INT2, $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (email) DO NOTHING \
            RETURNING id";
        let row = self
            .client()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(
                SQL,
                &[
                    email,
                    password_hash,
                    first_name,
                    last_name,
                    role,
                    created_at,
                ],
            )
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(row.map(|row| new.into_user(row.get("id"))))
    }
}
