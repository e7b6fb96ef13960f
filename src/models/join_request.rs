use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{check_email, nullable, Member, NewMember, Validate};
use crate::repo::{Entity, MemoryTables};

/// Lifecycle of a membership application. Rejection is a delete, not a status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStatus {
    #[default]
    Pending,
    Approved,
}

impl JoinStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinStatus::Pending => "pending",
            JoinStatus::Approved => "approved",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown join request status `{0}`")]
pub struct UnknownStatus(String);

impl TryFrom<String> for JoinStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(JoinStatus::Pending),
            "approved" => Ok(JoinStatus::Approved),
            _ => Err(UnknownStatus(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub field_of_study: String,
    /// Kept as entered ("2", "L3", "Master 1").
    pub study_year: String,
    pub motivation: String,
    pub photo_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: JoinStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl JoinRequest {
    /// The member row an approval creates.
    pub fn to_member(&self) -> NewMember {
        NewMember {
            full_name: self.full_name.clone(),
            specialty: Some(self.field_of_study.clone()),
            study_year: self.study_year.trim().parse::<i32>().ok(),
            photo_url: self.photo_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJoinRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub field_of_study: String,
    pub study_year: String,
    pub motivation: String,
    pub photo_url: Option<String>,
}

impl Validate for NewJoinRequest {
    fn validate(&self) -> Result<(), String> {
        check_email("email", &self.email)
    }
}

/// Status is not patchable here; it has its own endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequestPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub field_of_study: Option<String>,
    pub study_year: Option<String>,
    pub motivation: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub photo_url: Option<Option<String>>,
}

impl Validate for JoinRequestPatch {
    fn validate(&self) -> Result<(), String> {
        self.email
            .as_deref()
            .map_or(Ok(()), |email| check_email("email", email))
    }
}

/// Both rows written by an approval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub join_request: JoinRequest,
    pub member: Member,
}

impl Entity for JoinRequest {
    type New = NewJoinRequest;
    type Patch = JoinRequestPatch;

    const TABLE: &'static str = "join_requests";
    const FIELDS: &'static str =
        "full_name, email, phone, field_of_study, study_year, motivation, photo_url, status";
    const LABEL: &'static str = "Join request";
    const PLURAL: &'static str = "join requests";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewJoinRequest) -> Self {
        Self {
            id,
            full_name: new.full_name,
            email: new.email.trim().to_string(),
            phone: new.phone,
            field_of_study: new.field_of_study,
            study_year: new.study_year,
            motivation: new.motivation,
            photo_url: new.photo_url,
            status: JoinStatus::Pending,
            created_at,
        }
    }

    fn apply(&mut self, patch: JoinRequestPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.email {
            self.email = v.trim().to_string();
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.field_of_study {
            self.field_of_study = v;
        }
        if let Some(v) = patch.study_year {
            self.study_year = v;
        }
        if let Some(v) = patch.motivation {
            self.motivation = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.full_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.field_of_study.clone())
            .push_bind(self.study_year.clone())
            .push_bind(self.motivation.clone())
            .push_bind(self.photo_url.clone())
            .push_bind(self.status.as_str());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.join_requests
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.join_requests
    }
}
