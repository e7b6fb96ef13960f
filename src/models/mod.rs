//! Row, insert and patch shapes for every persisted entity.
//!
//! Insert shapes (`New*`) carry only what a client may supply; the server assigns `id`,
//! `createdAt` and any column defaults. Patch shapes (`*Patch`) are all-optional; nullable
//! columns use `Option<Option<T>>` so an explicit `null` clears the value while an absent
//! key leaves it untouched.

pub mod administration;
pub mod club_settings;
pub mod contact_message;
pub mod founder;
pub mod join_request;
pub mod member;
pub mod project;
pub mod user;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

pub use administration::{Administration, AdministrationPatch, NewAdministration};
pub use club_settings::{ClubSettings, SettingsPatch};
pub use contact_message::{ContactMessage, ContactMessagePatch, NewContactMessage};
pub use founder::{Founder, FounderPatch, NewFounder};
pub use join_request::{Approval, JoinRequest, JoinRequestPatch, JoinStatus, NewJoinRequest};
pub use member::{Member, MemberPatch, NewMember};
pub use project::{NewProject, Project, ProjectPatch};
pub use user::{NewUser, User, UserPatch};

/// Checks that serde's structural parse cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn check_email(field: &str, email: &str) -> Result<(), String> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(format!("Invalid data: `{field}` is not a valid email"))
    }
}

/// `#[serde(default, deserialize_with = "nullable")]`: absent -> `None`, `null` -> `Some(None)`.
pub(crate) fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
