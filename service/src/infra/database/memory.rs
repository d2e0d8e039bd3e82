//! In-process [`Database`] implementation.

use std::{collections::BTreeMap, sync::Arc};

use common::operations::{By, Insert, Select};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
};

/// [`Database`] keeping everything in the process memory.
///
/// Clones share the same data. Nothing survives a restart.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<Users>>);

/// [`User`]s stored in a [`Memory`] database.
#[derive(Debug, Default)]
struct Users {
    /// Stored [`User`]s by their IDs.
    by_id: BTreeMap<user::Id, User>,

    /// Last assigned [`user::Id`].
    last_id: i64,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.0.read().await.by_id.get(&id).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .by_id
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Insert<user::New>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(new): Insert<user::New>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self.0.write().await;
        if users.by_id.values().any(|u| u.email == new.email) {
            return Ok(None);
        }

        users.last_id += 1;
        let user = new.into_user(user::Id::from(users.last_id));
        drop(users.by_id.insert(user.id, user.clone()));

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{
            user::{self, Email, Name, Password, PasswordHash, Role},
            User,
        },
        infra::Database as _,
    };

    use super::Memory;

    fn new_user(email: &str) -> user::New {
        user::New {
            email: Email::new(email).unwrap(),
            password_hash: PasswordHash::new(
                &Password::new("secret").unwrap(),
                4,
            )
            .unwrap(),
            first_name: Name::new("Test").unwrap(),
            last_name: Name::new("User").unwrap(),
            role: Role::User,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let db = Memory::new();

        let first = db.execute(Insert(new_user("a@b.com"))).await.unwrap();
        let second = db.execute(Insert(new_user("c@d.com"))).await.unwrap();

        assert_eq!(first.unwrap().id, user::Id::from(1));
        assert_eq!(second.unwrap().id, user::Id::from(2));
    }

    #[tokio::test]
    async fn refuses_occupied_email() {
        let db = Memory::new();

        let first = db.execute(Insert(new_user("a@b.com"))).await.unwrap();
        let second = db.execute(Insert(new_user("a@b.com"))).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn selects_by_id_and_email() {
        let db = Memory::new();
        let stored = db
            .execute(Insert(new_user("a@b.com")))
            .await
            .unwrap()
            .unwrap();

        let by_id = db
            .execute(Select(By::<Option<User>, _>::new(stored.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id.email, stored.email);

        let email = Email::new("a@b.com").unwrap();
        let by_email = db
            .execute(Select(By::<Option<User>, _>::new(&email)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, stored.id);

        let missing = Email::new("x@y.com").unwrap();
        assert!(db
            .execute(Select(By::<Option<User>, _>::new(&missing)))
            .await
            .unwrap()
            .is_none());
        assert!(db
            .execute(Select(By::<Option<User>, _>::new(user::Id::from(42))))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn clones_share_data() {
        let db = Memory::new();
        let clone = db.clone();

        let stored = db
            .execute(Insert(new_user("a@b.com")))
            .await
            .unwrap()
            .unwrap();

        assert!(clone
            .execute(Select(By::<Option<User>, _>::new(stored.id)))
            .await
            .unwrap()
            .is_some());
    }
}
