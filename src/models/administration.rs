use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{check_email, nullable, Validate};
use crate::repo::{Entity, MemoryTables};

pub const DEFAULT_DISPLAY_ORDER: i32 = 999;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Administration {
    pub id: Uuid,
    pub full_name: String,
    pub role: String,
    pub department: String,
    pub photo_url: String,
    pub description: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_order: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdministration {
    pub full_name: String,
    pub role: String,
    pub department: String,
    pub photo_url: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_order: Option<i32>,
}

impl Validate for NewAdministration {
    fn validate(&self) -> Result<(), String> {
        match &self.email {
            Some(email) => check_email("email", email),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrationPatch {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub photo_url: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    pub display_order: Option<i32>,
}

impl Validate for AdministrationPatch {
    fn validate(&self) -> Result<(), String> {
        match &self.email {
            Some(Some(email)) => check_email("email", email),
            _ => Ok(()),
        }
    }
}

impl Entity for Administration {
    type New = NewAdministration;
    type Patch = AdministrationPatch;

    const TABLE: &'static str = "administration";
    const FIELDS: &'static str =
        "full_name, role, department, photo_url, description, email, phone, display_order";
    const ORDER_BY: &'static str = "display_order, created_at";
    const LABEL: &'static str = "Administration";
    const PLURAL: &'static str = "administration";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewAdministration) -> Self {
        Self {
            id,
            full_name: new.full_name,
            role: new.role,
            department: new.department,
            photo_url: new.photo_url,
            description: new.description.unwrap_or_default(),
            email: new.email.map(|e| e.trim().to_string()),
            phone: new.phone,
            display_order: new.display_order.unwrap_or(DEFAULT_DISPLAY_ORDER),
            created_at,
        }
    }

    fn apply(&mut self, patch: AdministrationPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.department {
            self.department = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.email {
            self.email = v.map(|e| e.trim().to_string());
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.display_order {
            self.display_order = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.full_name.clone())
            .push_bind(self.role.clone())
            .push_bind(self.department.clone())
            .push_bind(self.photo_url.clone())
            .push_bind(self.description.clone())
            .push_bind(self.email.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.display_order);
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.administration
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.administration
    }

    // stable: equal display orders keep creation order
    fn sort(rows: &mut [Self]) {
        rows.sort_by_key(|r| r.display_order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "fullName": "Yassine Benali",
            "role": "Président",
            "department": "Bureau",
            "photoUrl": "https://example.com/y.jpg"
        })
    }

    #[test]
    fn display_order_defaults_to_999() {
        let new: NewAdministration = serde_json::from_value(payload()).unwrap();
        let row = Administration::build(Uuid::new_v4(), OffsetDateTime::now_utc(), new);
        assert_eq!(row.display_order, DEFAULT_DISPLAY_ORDER);
        assert_eq!(row.description, "");
        assert!(row.email.is_none());
    }

    #[test]
    fn rejects_malformed_email() {
        let mut body = payload();
        body["email"] = json!("not-an-email");
        let new: NewAdministration = serde_json::from_value(body).unwrap();
        assert!(new.validate().is_err());
    }

    #[test]
    fn email_is_stored_trimmed() {
        let mut body = payload();
        body["email"] = json!("  boss@uni.edu  ");
        let new: NewAdministration = serde_json::from_value(body).unwrap();
        assert!(new.validate().is_ok());
        let mut row = Administration::build(Uuid::new_v4(), OffsetDateTime::now_utc(), new);
        assert_eq!(row.email.as_deref(), Some("boss@uni.edu"));

        row.apply(AdministrationPatch {
            email: Some(Some(" vice@uni.edu ".into())),
            ..Default::default()
        });
        assert_eq!(row.email.as_deref(), Some("vice@uni.edu"));
    }

    #[test]
    fn sort_orders_by_display_order() {
        let now = OffsetDateTime::now_utc();
        let mk = |name: &str, order: Option<i32>| {
            let mut body = payload();
            body["fullName"] = json!(name);
            if let Some(o) = order {
                body["displayOrder"] = json!(o);
            }
            Administration::build(Uuid::new_v4(), now, serde_json::from_value(body).unwrap())
        };
        let mut rows = vec![mk("late", None), mk("first", Some(1)), mk("second", Some(2))];
        Administration::sort(&mut rows);
        let names: Vec<_> = rows.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, ["first", "second", "late"]);
    }
}
