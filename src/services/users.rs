use mockable::Clock;
use std::sync::Arc;

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::users::{Role, User, user_id_for};

/// Maps (phone, role) to a stable user identity.
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { store, clock }
    }

    /// Return the user for (phone, role), creating it on first sight.
    ///
    /// An existing record is returned as stored, even if `name` differs.
    /// The flag is `true` when this call created the user.
    pub async fn create_or_get(
        &self,
        name: &str,
        phone: &str,
        role: Role,
    ) -> Result<(User, bool), AppError> {
        let user = User {
            id: user_id_for(role, phone),
            name: name.to_owned(),
            phone: phone.to_owned(),
            role,
            created_at: self.clock.utc(),
        };

        let (user, created) = self.store.insert_if_absent(user).await?;
        if created {
            tracing::info!(user_id = %user.id, "new user created");
        } else {
            tracing::info!(user_id = %user.id, "existing user found");
        }
        Ok((user, created))
    }

    pub async fn find(&self, phone: &str, role: Role) -> Result<Option<User>, AppError> {
        Ok(self.store.find(&user_id_for(role, phone)).await?)
    }

    /// Create a user that must not exist yet.
    pub async fn register(&self, name: &str, phone: &str, role: Role) -> Result<User, AppError> {
        let (user, created) = self.create_or_get(name, phone, role).await?;
        if !created {
            return Err(AppError::AlreadyExists(
                "User already exists. Please login.".to_string(),
            ));
        }
        Ok(user)
    }
}
