use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Marketplace role, stored as a lowercase string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "worker")]
    Worker,
    #[sea_orm(string_value = "contractor")]
    Contractor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Contractor => "contractor",
        }
    }

    /// Parse a role as sent by clients. Anything but the two exact values is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "worker" => Some(Self::Worker),
            "contractor" => Some(Self::Contractor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SeaORM entity for the `users` table.
///
/// Rows are append-only: a user is created on first login and never changed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub type User = Model;

/// Stable identity for a (role, phone) pair, e.g. `worker-919876543210`.
pub fn user_id_for(role: Role, phone: &str) -> String {
    format!("{}-{}", role.as_str(), phone.replace('+', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_strips_plus_and_prefixes_role() {
        assert_eq!(
            user_id_for(Role::Worker, "+919876543210"),
            "worker-919876543210"
        );
        assert_eq!(
            user_id_for(Role::Contractor, "+919876543210"),
            "contractor-919876543210"
        );
    }

    #[test]
    fn role_parse_is_exact() {
        assert_eq!(Role::parse("worker"), Some(Role::Worker));
        assert_eq!(Role::parse("contractor"), Some(Role::Contractor));
        assert_eq!(Role::parse("Worker"), None);
        assert_eq!(Role::parse("admin"), None);
    }
}
