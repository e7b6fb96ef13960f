use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{check_email, Validate};
use crate::repo::{Entity, MemoryTables};

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

impl Validate for NewContactMessage {
    fn validate(&self) -> Result<(), String> {
        check_email("email", &self.email)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessagePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl Validate for ContactMessagePatch {
    fn validate(&self) -> Result<(), String> {
        self.email
            .as_deref()
            .map_or(Ok(()), |email| check_email("email", email))
    }
}

impl Entity for ContactMessage {
    type New = NewContactMessage;
    type Patch = ContactMessagePatch;

    const TABLE: &'static str = "contact_messages";
    const FIELDS: &'static str = "first_name, last_name, email, message";
    const LABEL: &'static str = "Message";
    const PLURAL: &'static str = "contact messages";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewContactMessage) -> Self {
        Self {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email.trim().to_string(),
            message: new.message,
            created_at,
        }
    }

    fn apply(&mut self, patch: ContactMessagePatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.email {
            self.email = v.trim().to_string();
        }
        if let Some(v) = patch.message {
            self.message = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.first_name.clone())
            .push_bind(self.last_name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.message.clone());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.contact_messages
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.contact_messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new(email: &str) -> NewContactMessage {
        NewContactMessage {
            first_name: "Alan".into(),
            last_name: "Turing".into(),
            email: email.into(),
            message: "Hello".into(),
        }
    }

    #[test]
    fn email_must_be_valid() {
        assert!(new("alan@bletchley.uk").validate().is_ok());
        assert!(new("alan-at-bletchley").validate().is_err());
        let patch = ContactMessagePatch {
            email: Some("nope".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(ContactMessagePatch::default().validate().is_ok());
    }

    #[test]
    fn email_is_stored_trimmed() {
        let mut row = ContactMessage::build(
            Uuid::new_v4(),
            OffsetDateTime::now_utc(),
            new("  alan@bletchley.uk "),
        );
        assert_eq!(row.email, "alan@bletchley.uk");

        row.apply(ContactMessagePatch {
            email: Some(" turing@uni.edu ".into()),
            ..Default::default()
        });
        assert_eq!(row.email, "turing@uni.edu");
        assert_eq!(row.first_name, "Alan");
    }
}
