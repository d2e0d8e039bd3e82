//! Infrastructure layer.

pub mod database;

#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
pub use self::database::{Database, Memory, Storage};
