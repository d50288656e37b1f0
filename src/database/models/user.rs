use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Role;
use crate::filter::{FilterField, Listable};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listable for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "password_hash",
        "first_name",
        "last_name",
        "role",
        "created_at",
        "updated_at",
    ];
    const SCOPES: &'static [FilterField] = &[];
    const EQUALITY_FILTERS: &'static [FilterField] = &[FilterField::text("role")];
    const SEARCH_FIELDS: &'static [&'static str] = &["email", "first_name", "last_name"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["email"], "ada@example.com");
    }
}
