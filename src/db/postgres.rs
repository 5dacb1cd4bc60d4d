use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use super::{ContractStore, StoreError, UserStore};
use crate::models::contracts::{self, Contract, ContractPatch};
use crate::models::users::{self, User};

/// SeaORM-backed storage for contracts and users.
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContractStore for PgStore {
    async fn create(&self, contract: Contract) -> Result<Contract, StoreError> {
        let active = contracts::ActiveModel::try_from(contract)?;
        let model = active.insert(&self.db).await?;
        Ok(Contract::try_from(model)?)
    }

    async fn get(&self, id: &str) -> Result<Option<Contract>, StoreError> {
        let model = contracts::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?;
        Ok(model.map(Contract::try_from).transpose()?)
    }

    async fn list_all(&self) -> Result<Vec<Contract>, StoreError> {
        let models = contracts::Entity::find().all(&self.db).await?;
        Ok(models
            .into_iter()
            .map(Contract::try_from)
            .collect::<Result<_, _>>()?)
    }

    async fn update(
        &self,
        id: &str,
        patch: ContractPatch,
    ) -> Result<Option<Contract>, StoreError> {
        let Some(contract) = contracts::Entity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(Contract::try_from(contract)?));
        }

        let mut active: contracts::ActiveModel = contract.into();
        active.apply_patch(patch)?;

        let updated = active.update(&self.db).await?;
        Ok(Some(Contract::try_from(updated)?))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(users::Entity::find_by_id(id.to_owned()).one(&self.db).await?)
    }

    async fn insert_if_absent(&self, user: User) -> Result<(User, bool), StoreError> {
        let id = user.id.clone();
        let new_user = users::ActiveModel {
            id: Set(user.id.clone()),
            name: Set(user.name.clone()),
            phone: Set(user.phone.clone()),
            role: Set(user.role),
            created_at: Set(user.created_at),
        };

        // A concurrent first login may win the insert; its row is then the user.
        let inserted = users::Entity::insert(new_user)
            .on_conflict(OnConflict::column(users::Column::Id).do_nothing().to_owned())
            .exec(&self.db)
            .await;

        match inserted {
            Ok(_) => Ok((user, true)),
            Err(DbErr::RecordNotInserted) => {
                let existing = users::Entity::find_by_id(id.clone())
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| DbErr::RecordNotFound(format!("user {id}")))?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::Role;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(name: &str) -> User {
        User {
            id: "worker-919876543211".to_string(),
            name: name.to_string(),
            phone: "+919876543211".to_string(),
            role: Role::Worker,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn first_insert_creates_the_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user("Ramesh")]])
            .into_connection();
        let store = PgStore::new(db);

        let (stored, created) = store.insert_if_absent(user("Ramesh")).await.unwrap();
        assert!(created);
        assert_eq!(stored, user("Ramesh"));
    }

    #[tokio::test]
    async fn conflicting_insert_returns_the_existing_row() {
        // Nothing comes back from the conflicting insert; the re-fetch finds the winner.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<users::Model>::new()])
            .append_query_results([vec![user("Ramesh")]])
            .into_connection();
        let store = PgStore::new(db);

        let (stored, created) = store.insert_if_absent(user("Suresh")).await.unwrap();
        assert!(!created);
        assert_eq!(stored.name, "Ramesh");
    }
}
