use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{nullable, Validate};
use crate::repo::{Entity, MemoryTables};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub full_name: String,
    pub specialty: Option<String>,
    pub study_year: Option<i32>,
    pub photo_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub full_name: String,
    pub specialty: Option<String>,
    pub study_year: Option<i32>,
    pub photo_url: Option<String>,
}

impl Validate for NewMember {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPatch {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub specialty: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub study_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub photo_url: Option<Option<String>>,
}

impl Validate for MemberPatch {}

impl Entity for Member {
    type New = NewMember;
    type Patch = MemberPatch;

    const TABLE: &'static str = "members";
    const FIELDS: &'static str = "full_name, specialty, study_year, photo_url";
    const LABEL: &'static str = "Member";
    const PLURAL: &'static str = "members";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewMember) -> Self {
        Self {
            id,
            full_name: new.full_name,
            specialty: new.specialty,
            study_year: new.study_year,
            photo_url: new.photo_url,
            created_at,
        }
    }

    fn apply(&mut self, patch: MemberPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.specialty {
            self.specialty = v;
        }
        if let Some(v) = patch.study_year {
            self.study_year = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.full_name.clone())
            .push_bind(self.specialty.clone())
            .push_bind(self.study_year)
            .push_bind(self.photo_url.clone());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.members
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.members
    }
}
