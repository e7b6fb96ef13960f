//! Data access. `Store` dispatches to Postgres or to the in-memory tables; both report
//! through [`RepoError`] so handlers map outcomes to status codes the same way.

mod memory;
mod postgres;

use std::sync::Arc;

use sqlx::{postgres::PgRow, query_builder::Separated, FromRow, PgPool, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RepoError;
use crate::models::{
    Administration, Approval, ClubSettings, Founder, JoinRequest, JoinStatus, Member, Project,
    SettingsPatch, User,
};

pub use memory::{MemoryStore, MemoryTables};

/// A table with the uniform list/get/create/update/delete contract.
pub trait Entity: Clone + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow> + 'static {
    /// Client-supplied fields; the server adds `id` and `created_at`.
    type New: Send + 'static;
    type Patch: Send + 'static;

    const TABLE: &'static str;
    /// Every column except `id` and `created_at`, in `push_fields` order.
    const FIELDS: &'static str;
    const ORDER_BY: &'static str = "created_at";
    /// Singular name used in client-facing messages ("Member not found").
    const LABEL: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> Uuid;
    fn created_at(&self) -> OffsetDateTime;
    fn build(id: Uuid, created_at: OffsetDateTime, new: Self::New) -> Self;
    fn apply(&mut self, patch: Self::Patch);
    fn push_fields(&self, fields: &mut Separated<'_, '_, Postgres, &'static str>);

    fn rows(tables: &MemoryTables) -> &Vec<Self>;
    fn rows_mut(tables: &mut MemoryTables) -> &mut Vec<Self>;

    /// Memory-backend equivalent of `ORDER BY`; rows arrive in insertion order.
    fn sort(_rows: &mut [Self]) {}

    /// Memory-backend equivalent of a unique constraint.
    fn conflicts(&self, _other: &Self) -> bool {
        false
    }
}

#[derive(Clone)]
pub enum Store {
    Postgres(PgPool),
    Memory(Arc<MemoryStore>),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(Arc::new(MemoryStore::default()))
    }

    pub async fn list<E: Entity>(&self) -> Result<Vec<E>, RepoError> {
        match self {
            Store::Postgres(db) => postgres::list(db).await,
            Store::Memory(mem) => Ok(mem.list().await),
        }
    }

    pub async fn get<E: Entity>(&self, id: Uuid) -> Result<E, RepoError> {
        match self {
            Store::Postgres(db) => postgres::get(db, id).await,
            Store::Memory(mem) => mem.get(id).await,
        }
    }

    pub async fn create<E: Entity>(&self, new: E::New) -> Result<E, RepoError> {
        let row = E::build(Uuid::new_v4(), OffsetDateTime::now_utc(), new);
        match self {
            Store::Postgres(db) => postgres::insert(db, &row).await,
            Store::Memory(mem) => mem.insert(row).await,
        }
    }

    pub async fn update<E: Entity>(&self, id: Uuid, patch: E::Patch) -> Result<E, RepoError> {
        match self {
            Store::Postgres(db) => postgres::update(db, id, patch).await,
            Store::Memory(mem) => mem.update(id, patch).await,
        }
    }

    pub async fn delete<E: Entity>(&self, id: Uuid) -> Result<(), RepoError> {
        match self {
            Store::Postgres(db) => postgres::delete::<E>(db, id).await,
            Store::Memory(mem) => mem.delete::<E>(id).await,
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        match self {
            Store::Postgres(db) => postgres::find_user_by_username(db, username).await,
            Store::Memory(mem) => Ok(mem.find_user_by_username(username).await),
        }
    }

    pub async fn club_settings(&self) -> Result<Option<ClubSettings>, RepoError> {
        match self {
            Store::Postgres(db) => postgres::club_settings(db).await,
            Store::Memory(mem) => Ok(mem.club_settings().await),
        }
    }

    /// Creates the settings row on first use, otherwise patches it in place.
    pub async fn upsert_club_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<ClubSettings, RepoError> {
        match self {
            Store::Postgres(db) => postgres::upsert_club_settings(db, patch).await,
            Store::Memory(mem) => Ok(mem.upsert_club_settings(patch).await),
        }
    }

    pub async fn set_join_request_status(
        &self,
        id: Uuid,
        status: JoinStatus,
    ) -> Result<JoinRequest, RepoError> {
        match self {
            Store::Postgres(db) => postgres::set_join_request_status(db, id, status).await,
            Store::Memory(mem) => mem.set_join_request_status(id, status).await,
        }
    }

    /// Marks the request approved and creates its member atomically.
    pub async fn approve_join_request(&self, id: Uuid) -> Result<Approval, RepoError> {
        match self {
            Store::Postgres(db) => postgres::approve_join_request(db, id).await,
            Store::Memory(mem) => mem.approve_join_request(id).await,
        }
    }

    /// Writes the whole batch or nothing. Returns `false` without writing when a founder
    /// already exists; an existing `admin` username is left as is.
    pub async fn seed(&self, rows: SeedRows) -> Result<bool, RepoError> {
        match self {
            Store::Postgres(db) => postgres::seed(db, rows).await,
            Store::Memory(mem) => Ok(mem.seed(rows).await),
        }
    }
}

/// Fully built rows for the initial data load.
#[derive(Debug, Clone)]
pub struct SeedRows {
    pub admin: User,
    pub founders: Vec<Founder>,
    pub administration: Vec<Administration>,
    pub members: Vec<Member>,
    pub projects: Vec<Project>,
}

pub(crate) fn already_approved() -> RepoError {
    RepoError::Conflict("Join request already approved".into())
}
