use serde::{Deserialize, Serialize};
use sqlx::{postgres::Postgres, query_builder::Separated, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::Validate;
use crate::repo::{Entity, MemoryTables};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    /// Free text as entered by the admin ("Mars 2024", "Printemps 2025").
    pub date: String,
    pub description: String,
    pub banner_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub title: String,
    pub date: String,
    pub description: String,
    pub banner_url: String,
}

impl Validate for NewProject {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub banner_url: Option<String>,
}

impl Validate for ProjectPatch {}

impl Entity for Project {
    type New = NewProject;
    type Patch = ProjectPatch;

    const TABLE: &'static str = "projects";
    const FIELDS: &'static str = "title, date, description, banner_url";
    const LABEL: &'static str = "Project";
    const PLURAL: &'static str = "projects";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn build(id: Uuid, created_at: OffsetDateTime, new: NewProject) -> Self {
        Self {
            id,
            title: new.title,
            date: new.date,
            description: new.description,
            banner_url: new.banner_url,
            created_at,
        }
    }

    fn apply(&mut self, patch: ProjectPatch) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.date {
            self.date = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.banner_url {
            self.banner_url = v;
        }
    }

    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>) {
        fields
            .push_bind(self.title.clone())
            .push_bind(self.date.clone())
            .push_bind(self.description.clone())
            .push_bind(self.banner_url.clone());
    }

    fn rows(tables: &MemoryTables) -> &Vec<Self> {
        &tables.projects
    }

    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self> {
        &mut tables.projects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn banner_is_required() {
        let res = serde_json::from_value::<NewProject>(json!({
            "title": "Hackathon",
            "date": "Mars 2025",
            "description": "48h"
        }));
        assert!(res.unwrap_err().to_string().contains("bannerUrl"));
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let new: NewProject = serde_json::from_value(json!({
            "title": "Hackathon",
            "date": "Mars 2025",
            "description": "48h",
            "bannerUrl": "http://x/b.png"
        }))
        .unwrap();
        let mut row = Project::build(Uuid::new_v4(), OffsetDateTime::now_utc(), new);
        let before = row.clone();

        row.apply(serde_json::from_value(json!({ "date": "Avril 2025" })).unwrap());
        assert_eq!(row.date, "Avril 2025");
        assert_eq!(row.title, before.title);
        assert_eq!(row.banner_url, before.banner_url);
        assert_eq!(row.created_at, before.created_at);
    }
}
