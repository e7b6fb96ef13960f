use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::Validate;
use crate::repo::{Entity, MemoryTables};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Founder {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub photo_url: String,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFounder {
    pub full_name: String,
    pub role: String,
    pub photo_url: String,
    /// Defaults to an empty string.
    pub description: Option<String>,
}

impl Validate for NewFounder {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderPatch {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
}

impl Validate for FounderPatch {}

impl Entity for Founder {
    type New = NewFounder;
    type Patch = FounderPatch;

    const TABLE: &'static str = "founders";
    const FIELDS: &'static str = "full_name, role, photo_url, description";
    const LABEL: &'static str = "Founder";
    const PLURAL: &'static str = "founders";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewFounder) -> Self {
        Self {
            id,
            full_name: new.full_name,
            role: new.role,
            photo_url: new.photo_url,
            description: new.description.unwrap_or_default(),
            created_at,
        }
    }

    fn apply(&mut self, patch: FounderPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.full_name.clone())
            .push_bind(self.role.clone())
            .push_bind(self.photo_url.clone())
            .push_bind(self.description.clone());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.founders
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.founders
    }
}
