//! User model - application accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// User entity.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub settings: Option<serde_json::Value>,
}

impl User {
    /// Create a new user with the default settings document.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
            settings: serde_json::to_value(UserSettings::default()).ok(),
        }
    }

    /// Convert to sanitized response (no credential fields); stored settings
    /// are overlaid on the defaults so older accounts pick up new keys.
    pub fn sanitized(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            username: self.username.clone(),
            settings: UserSettings::merged(self.settings.as_ref()),
        }
    }
}

/// Per-user UI settings, persisted as JSONB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserSettings {
    pub theme: String,
    pub language: String,
    pub hide_locked: bool,
    pub color_theme: String,
    pub group_by_list: bool,
    pub show_completed: bool,
    pub show_tags: bool,
    pub work_mode: String,
    pub dev_mode: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: "system".to_string(),
            language: "pl".to_string(),
            hide_locked: false,
            color_theme: "default".to_string(),
            group_by_list: false,
            show_completed: true,
            show_tags: true,
            work_mode: "lists".to_string(),
            dev_mode: false,
        }
    }
}

impl UserSettings {
    /// Overlay a stored (possibly partial) settings document on the defaults.
    pub fn merged(stored: Option<&serde_json::Value>) -> Self {
        let merged = merge_settings(stored, None);
        serde_json::from_value(merged).unwrap_or_default()
    }
}

/// Overlay `stored` and then `patch` on the default settings document,
/// key by key. Unknown keys are dropped; wrong-typed documents fall back to
/// the defaults.
pub fn merge_settings(
    stored: Option<&serde_json::Value>,
    patch: Option<&serde_json::Value>,
) -> serde_json::Value {
    let mut merged = serde_json::to_value(UserSettings::default())
        .unwrap_or_else(|_| serde_json::Value::Object(Default::default()));

    if let Some(obj) = merged.as_object_mut() {
        for layer in [stored, patch].into_iter().flatten() {
            if let Some(layer_obj) = layer.as_object() {
                for (key, value) in layer_obj {
                    if obj.contains_key(key) {
                        obj.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }

    merged
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitized_never_exposes_hash() {
        let user = User::new(
            "kasia".to_string(),
            "kasia@example.com".to_string(),
            "$argon2id$stub".to_string(),
        );
        let rendered = serde_json::to_string(&user.sanitized()).unwrap();
        assert!(!rendered.contains("argon2"));
        assert!(!rendered.contains("password"));
    }

    #[test]
    fn stored_settings_overlay_defaults() {
        let stored = json!({ "theme": "dark", "hide_locked": true });
        let settings = UserSettings::merged(Some(&stored));
        assert_eq!(settings.theme, "dark");
        assert!(settings.hide_locked);
        // untouched keys keep their defaults
        assert_eq!(settings.language, "pl");
        assert!(settings.show_completed);
    }

    #[test]
    fn unknown_keys_are_dropped_in_merge() {
        let stored = json!({ "theme": "dark", "legacy_flag": 42 });
        let merged = merge_settings(Some(&stored), None);
        assert!(merged.get("legacy_flag").is_none());
        assert_eq!(merged["theme"], "dark");
    }

    #[test]
    fn patch_wins_over_stored() {
        let stored = json!({ "theme": "dark" });
        let patch = json!({ "theme": "light" });
        let merged = merge_settings(Some(&stored), Some(&patch));
        assert_eq!(merged["theme"], "light");
    }
}
