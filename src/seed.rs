//! Demo content loaded into an empty database.

use anyhow::Context;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    config::SeedConfig,
    models::{
        Administration, Founder, Member, NewAdministration, NewFounder, NewMember, NewProject,
        NewUser, Project, User,
    },
    repo::{Entity, SeedRows, Store},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    AlreadySeeded,
    Seeded,
}

impl SeedOutcome {
    pub fn message(self) -> &'static str {
        match self {
            SeedOutcome::AlreadySeeded => "Database already seeded",
            SeedOutcome::Seeded => "Database seeded successfully",
        }
    }
}

/// Inserts the demo rows unless a founder already exists. The batch is written atomically,
/// so a failed run leaves nothing behind and the next run starts over.
#[instrument(skip_all)]
pub async fn seed_database(store: &Store, config: &SeedConfig) -> anyhow::Result<SeedOutcome> {
    let founders = store.list::<Founder>().await.context("list founders")?;
    if !founders.is_empty() {
        info!("database already seeded");
        return Ok(SeedOutcome::AlreadySeeded);
    }
    info!("seeding database with initial data");

    let rows = demo_rows(config)?;
    let written = store.seed(rows).await.context("write seed rows")?;
    if !written {
        info!("database seeded concurrently; nothing written");
        return Ok(SeedOutcome::AlreadySeeded);
    }

    info!("database seeding completed");
    Ok(SeedOutcome::Seeded)
}

/// Rows in insertion order, with timestamps a microsecond apart so `created_at` ordering
/// is deterministic.
fn demo_rows(config: &SeedConfig) -> anyhow::Result<SeedRows> {
    let base = OffsetDateTime::now_utc();
    let mut tick = 0;
    let mut next_at = || {
        tick += 1;
        base + Duration::microseconds(tick)
    };

    let admin = User::build(
        Uuid::new_v4(),
        next_at(),
        NewUser {
            username: config.admin_username.clone(),
            password_hash: hash_password(&config.admin_password)?,
        },
    );
    let founder = Founder::build(
        Uuid::new_v4(),
        next_at(),
        NewFounder {
            full_name: "Manar Hougas".into(),
            role: "Fondatrice du club".into(),
            photo_url: "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?w=400&h=400&fit=crop".into(),
            description: Some("Première fondatrice officielle du club Masters of Programming.".into()),
        },
    );
    let administration = administration()
        .into_iter()
        .enumerate()
        .map(|(order, admin)| {
            let new = NewAdministration {
                display_order: Some(order as i32 + 1),
                ..admin
            };
            Administration::build(Uuid::new_v4(), next_at(), new)
        })
        .collect();
    let members = members()
        .into_iter()
        .map(|new| Member::build(Uuid::new_v4(), next_at(), new))
        .collect();
    let projects = projects()
        .into_iter()
        .map(|new| Project::build(Uuid::new_v4(), next_at(), new))
        .collect();

    Ok(SeedRows {
        admin,
        founders: vec![founder],
        administration,
        members,
        projects,
    })
}

fn administration() -> [NewAdministration; 2] {
    [
        NewAdministration {
            full_name: "Professeur Ledmi Abdeldjalil".into(),
            role: "Professeur encadrant".into(),
            department: "Supervision".into(),
            photo_url: "https://images.unsplash.com/photo-1560250097-0b93528c311a?w=400&h=400&fit=crop".into(),
            description: Some("Superviseur officiel du club Masters of Programming.".into()),
            email: None,
            phone: None,
            display_order: None,
        },
        NewAdministration {
            full_name: "Aouaidjia Mouna".into(),
            role: "Vice-Présidente".into(),
            department: "Executive Board".into(),
            photo_url: "https://images.unsplash.com/photo-1580489944761-15a19d654956?w=400&h=400&fit=crop".into(),
            description: Some("Vice-présidente officielle du club.".into()),
            email: None,
            phone: None,
            display_order: None,
        },
    ]
}

fn members() -> [NewMember; 2] {
    [
        NewMember {
            full_name: "Islem Djeridi".into(),
            specialty: Some("Web Dev".into()),
            study_year: Some(1),
            photo_url: Some("https://i.pravatar.cc/300?img=10".into()),
        },
        NewMember {
            full_name: "Fouad Athmani".into(),
            specialty: Some("AI/ML".into()),
            study_year: Some(2),
            photo_url: Some("https://i.pravatar.cc/300?img=11".into()),
        },
    ]
}

fn projects() -> [NewProject; 2] {
    [
        NewProject {
            title: "Annual Hackathon 2024".into(),
            date: "October 15, 2024".into(),
            description: "A 24-hour coding marathon where students built innovative solutions for campus problems.".into(),
            banner_url: "https://images.unsplash.com/photo-1504384308090-c54be3855833?w=800&h=400&fit=crop".into(),
        },
        NewProject {
            title: "AI Workshop Series".into(),
            date: "November 5, 2024".into(),
            description: "A 4-week intensive workshop covering the basics of Machine Learning and Neural Networks.".into(),
            banner_url: "https://images.unsplash.com/photo-1555949963-ff9fe0c870eb?w=800&h=400&fit=crop".into(),
        },
    ]
}
