use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::repo::{Entity, MemoryTables};

/// Admin account. Only the argon2 hash is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Built by the handlers after hashing; never deserialized from a request.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl Entity for User {
    type New = NewUser;
    type Patch = UserPatch;

    const TABLE: &'static str = "users";
    const FIELDS: &'static str = "username, password_hash";
    const LABEL: &'static str = "User";
    const PLURAL: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            password_hash: new.password_hash,
            created_at,
        }
    }

    fn apply(&mut self, patch: UserPatch) {
        if let Some(v) = patch.username {
            self.username = v;
        }
        if let Some(v) = patch.password_hash {
            self.password_hash = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.username.clone())
            .push_bind(self.password_hash.clone());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.users
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.users
    }

    fn conflicts(&self, other: &Self) -> bool {
        self.username == other.username
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User::build(
            Uuid::new_v4(),
            OffsetDateTime::now_utc(),
            NewUser {
                username: "admin".into(),
                password_hash: "$argon2id$v=19$secret".into(),
            },
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"username\":\"admin\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
