use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{nullable, Validate};

/// Site-wide branding. The table holds at most one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClubSettings {
    pub id: Uuid,
    pub logo_url: Option<String>,
    pub hero_banner_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub logo_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hero_banner_url: Option<Option<String>>,
}

impl Validate for SettingsPatch {}

impl ClubSettings {
    pub fn new(patch: SettingsPatch) -> Self {
        Self {
            id: Uuid::new_v4(),
            logo_url: patch.logo_url.flatten(),
            hero_banner_url: patch.hero_banner_url.flatten(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.logo_url {
            self.logo_url = v;
        }
        if let Some(v) = patch.hero_banner_url {
            self.hero_banner_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn apply_keeps_absent_fields() {
        let mut settings = ClubSettings::new(
            serde_json::from_value(json!({ "logoUrl": "http://x/logo.png" })).unwrap(),
        );
        settings.apply(serde_json::from_value(json!({ "heroBannerUrl": "http://x/hero.png" })).unwrap());
        assert_eq!(settings.logo_url.as_deref(), Some("http://x/logo.png"));
        assert_eq!(settings.hero_banner_url.as_deref(), Some("http://x/hero.png"));

        settings.apply(serde_json::from_value(json!({ "logoUrl": null })).unwrap());
        assert_eq!(settings.logo_url, None);
        assert_eq!(settings.hero_banner_url.as_deref(), Some("http://x/hero.png"));
    }
}
