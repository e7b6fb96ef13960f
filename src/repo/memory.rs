use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{already_approved, Entity, SeedRows};
use crate::error::RepoError;
use crate::models::{
    Administration, Approval, ClubSettings, ContactMessage, Founder, JoinRequest, JoinStatus,
    Member, Project, SettingsPatch, User,
};

#[derive(Debug, Default)]
pub struct MemoryTables {
    pub(crate) users: Vec<User>,
    pub(crate) founders: Vec<Founder>,
    pub(crate) administration: Vec<Administration>,
    pub(crate) members: Vec<Member>,
    pub(crate) projects: Vec<Project>,
    pub(crate) join_requests: Vec<JoinRequest>,
    pub(crate) contact_messages: Vec<ContactMessage>,
    pub(crate) club_settings: Option<ClubSettings>,
}

/// Process-local store used when no database is configured, and by tests.
/// A single lock covers every table, so multi-table writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

fn duplicate<E: Entity>() -> RepoError {
    RepoError::Conflict(format!("{} already exists", E::LABEL))
}

impl MemoryStore {
    pub async fn list<E: Entity>(&self) -> Vec<E> {
        let tables = self.tables.read().await;
        let mut rows = E::rows(&tables).clone();
        E::sort(&mut rows);
        rows
    }

    pub async fn get<E: Entity>(&self, id: Uuid) -> Result<E, RepoError> {
        let tables = self.tables.read().await;
        E::rows(&tables)
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    pub async fn insert<E: Entity>(&self, row: E) -> Result<E, RepoError> {
        let mut tables = self.tables.write().await;
        insert_row(&mut tables, row)
    }

    pub async fn update<E: Entity>(&self, id: Uuid, patch: E::Patch) -> Result<E, RepoError> {
        let mut tables = self.tables.write().await;
        let rows = E::rows_mut(&mut tables);
        let idx = rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or(RepoError::NotFound)?;

        let mut updated = rows[idx].clone();
        updated.apply(patch);
        let clash = rows
            .iter()
            .enumerate()
            .any(|(i, other)| i != idx && updated.conflicts(other));
        if clash {
            return Err(duplicate::<E>());
        }
        rows[idx] = updated.clone();
        Ok(updated)
    }

    pub async fn delete<E: Entity>(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let rows = E::rows_mut(&mut tables);
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        let tables = self.tables.read().await;
        tables.users.iter().find(|u| u.username == username).cloned()
    }

    pub async fn club_settings(&self) -> Option<ClubSettings> {
        self.tables.read().await.club_settings.clone()
    }

    pub async fn upsert_club_settings(&self, patch: SettingsPatch) -> ClubSettings {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.club_settings.as_mut() {
            existing.apply(patch);
            return existing.clone();
        }
        let created = ClubSettings::new(patch);
        tables.club_settings = Some(created.clone());
        created
    }

    pub async fn set_join_request_status(
        &self,
        id: Uuid,
        status: JoinStatus,
    ) -> Result<JoinRequest, RepoError> {
        let mut tables = self.tables.write().await;
        let request = tables
            .join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepoError::NotFound)?;
        request.status = status;
        Ok(request.clone())
    }

    pub async fn approve_join_request(&self, id: Uuid) -> Result<Approval, RepoError> {
        let mut tables = self.tables.write().await;
        let request = tables
            .join_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RepoError::NotFound)?;
        if request.status == JoinStatus::Approved {
            return Err(already_approved());
        }
        request.status = JoinStatus::Approved;
        let join_request = request.clone();

        let member = Member::build(Uuid::new_v4(), OffsetDateTime::now_utc(), join_request.to_member());
        let member = insert_row(&mut tables, member)?;
        Ok(Approval {
            join_request,
            member,
        })
    }

    /// Only the admin username can clash, and it is checked first, so the batch lands whole.
    pub async fn seed(&self, rows: SeedRows) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.founders.is_empty() {
            return false;
        }
        if !tables.users.iter().any(|u| u.username == rows.admin.username) {
            tables.users.push(rows.admin);
        }
        tables.founders.extend(rows.founders);
        tables.administration.extend(rows.administration);
        tables.members.extend(rows.members);
        tables.projects.extend(rows.projects);
        true
    }
}

fn insert_row<E: Entity>(tables: &mut MemoryTables, row: E) -> Result<E, RepoError> {
    let rows = E::rows_mut(tables);
    if rows.iter().any(|other| row.conflicts(other)) {
        return Err(duplicate::<E>());
    }
    rows.push(row.clone());
    Ok(row)
}
