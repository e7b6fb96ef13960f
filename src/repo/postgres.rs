use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{already_approved, Entity, SeedRows};
use crate::error::RepoError;
use crate::models::{Approval, ClubSettings, JoinRequest, JoinStatus, Member, SettingsPatch, User};

fn columns<E: Entity>() -> String {
    format!("id, created_at, {}", E::FIELDS)
}

pub async fn list<E: Entity>(db: &PgPool) -> Result<Vec<E>, RepoError> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        columns::<E>(),
        E::TABLE,
        E::ORDER_BY
    );
    let rows = sqlx::query_as::<_, E>(&sql).fetch_all(db).await?;
    Ok(rows)
}

pub async fn get<E: Entity>(db: &PgPool, id: Uuid) -> Result<E, RepoError> {
    let sql = format!("SELECT {} FROM {} WHERE id = $1", columns::<E>(), E::TABLE);
    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(RepoError::NotFound)
}

async fn get_for_update<E: Entity>(conn: &mut PgConnection, id: Uuid) -> Result<E, RepoError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
        columns::<E>(),
        E::TABLE
    );
    sqlx::query_as::<_, E>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(RepoError::NotFound)
}

/// Writes a fully built row and returns what the database stored.
pub async fn insert<'c, E, X>(executor: X, row: &E) -> Result<E, RepoError>
where
    E: Entity,
    X: PgExecutor<'c>,
{
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} (id, created_at, {}) VALUES (",
        E::TABLE,
        E::FIELDS
    ));
    let mut values = qb.separated(", ");
    values.push_bind(row.id());
    values.push_bind(row.created_at());
    row.push_fields(&mut values);
    qb.push(format!(") RETURNING {}", columns::<E>()));

    let created = qb.build_query_as::<E>().fetch_one(executor).await?;
    Ok(created)
}

/// Read-modify-write under a row lock so concurrent patches don't drop each other's fields.
pub async fn update<E: Entity>(db: &PgPool, id: Uuid, patch: E::Patch) -> Result<E, RepoError> {
    let mut tx = db.begin().await?;
    let mut row = get_for_update::<E>(&mut *tx, id).await?;
    row.apply(patch);

    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "UPDATE {} SET ({}) = ROW(",
        E::TABLE,
        E::FIELDS
    ));
    let mut fields = qb.separated(", ");
    row.push_fields(&mut fields);
    qb.push(") WHERE id = ");
    qb.push_bind(id);
    qb.push(format!(" RETURNING {}", columns::<E>()));

    let updated = qb.build_query_as::<E>().fetch_one(&mut *tx).await?;
    tx.commit().await?;
    Ok(updated)
}

pub async fn delete<E: Entity>(db: &PgPool, id: Uuid) -> Result<(), RepoError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
    let res = sqlx::query(&sql).bind(id).execute(db).await?;
    if res.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

pub async fn find_user_by_username(db: &PgPool, username: &str) -> Result<Option<User>, RepoError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE username = $1",
        columns::<User>(),
        User::TABLE
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn club_settings(db: &PgPool) -> Result<Option<ClubSettings>, RepoError> {
    let settings = sqlx::query_as::<_, ClubSettings>(
        r#"
        SELECT id, logo_url, hero_banner_url, created_at
        FROM club_settings
        LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await?;
    Ok(settings)
}

/// Single statement: the `singleton` unique column turns a second insert into an update.
pub async fn upsert_club_settings(
    db: &PgPool,
    patch: SettingsPatch,
) -> Result<ClubSettings, RepoError> {
    let set_logo = patch.logo_url.is_some();
    let set_hero = patch.hero_banner_url.is_some();
    let fresh = ClubSettings::new(patch);

    let settings = sqlx::query_as::<_, ClubSettings>(
        r#"
        INSERT INTO club_settings (id, created_at, singleton, logo_url, hero_banner_url)
        VALUES ($1, $2, TRUE, $3, $4)
        ON CONFLICT (singleton) DO UPDATE SET
            logo_url = CASE WHEN $5 THEN EXCLUDED.logo_url ELSE club_settings.logo_url END,
            hero_banner_url = CASE WHEN $6 THEN EXCLUDED.hero_banner_url
                                   ELSE club_settings.hero_banner_url END
        RETURNING id, logo_url, hero_banner_url, created_at
        "#,
    )
    .bind(fresh.id)
    .bind(fresh.created_at)
    .bind(fresh.logo_url)
    .bind(fresh.hero_banner_url)
    .bind(set_logo)
    .bind(set_hero)
    .fetch_one(db)
    .await?;
    Ok(settings)
}

async fn write_status<'c, X>(executor: X, id: Uuid, status: JoinStatus) -> Result<JoinRequest, RepoError>
where
    X: PgExecutor<'c>,
{
    let sql = format!(
        "UPDATE {} SET status = $1 WHERE id = $2 RETURNING {}",
        JoinRequest::TABLE,
        columns::<JoinRequest>()
    );
    sqlx::query_as::<_, JoinRequest>(&sql)
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(RepoError::NotFound)
}

pub async fn set_join_request_status(
    db: &PgPool,
    id: Uuid,
    status: JoinStatus,
) -> Result<JoinRequest, RepoError> {
    write_status(db, id, status).await
}

pub async fn approve_join_request(db: &PgPool, id: Uuid) -> Result<Approval, RepoError> {
    let mut tx = db.begin().await?;

    let request = get_for_update::<JoinRequest>(&mut *tx, id).await?;
    if request.status == JoinStatus::Approved {
        return Err(already_approved());
    }

    let join_request = write_status(&mut *tx, id, JoinStatus::Approved).await?;
    let member = Member::build(Uuid::new_v4(), OffsetDateTime::now_utc(), join_request.to_member());
    let member = insert(&mut *tx, &member).await?;

    tx.commit().await?;
    Ok(Approval {
        join_request,
        member,
    })
}

pub async fn seed(db: &PgPool, rows: SeedRows) -> Result<bool, RepoError> {
    let mut tx = db.begin().await?;

    let seeded: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM founders)")
        .fetch_one(&mut *tx)
        .await?;
    if seeded {
        return Ok(false);
    }

    let admin_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
            .bind(&rows.admin.username)
            .fetch_one(&mut *tx)
            .await?;
    if !admin_exists {
        insert(&mut *tx, &rows.admin).await?;
    }
    for row in &rows.founders {
        insert(&mut *tx, row).await?;
    }
    for row in &rows.administration {
        insert(&mut *tx, row).await?;
    }
    for row in &rows.members {
        insert(&mut *tx, row).await?;
    }
    for row in &rows.projects {
        insert(&mut *tx, row).await?;
    }

    tx.commit().await?;
    Ok(true)
}
