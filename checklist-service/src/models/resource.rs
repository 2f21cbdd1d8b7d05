//! Privacy-guarded resource model, generic over the three resource kinds.
//!
//! Lists, presets and notes share the same privacy mechanics and differ only in
//! their table names, name uniqueness and whether they carry a text body. One
//! model (and one service) covers all three.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::privacy::{PrivacyColumnsError, PrivacyState};

/// The three privacy-guarded resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    List,
    Preset,
    Note,
}

impl ResourceKind {
    /// Resource table name.
    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::List => "lists",
            ResourceKind::Preset => "presets",
            ResourceKind::Note => "notes",
        }
    }

    /// Access ledger table name.
    pub fn access_table(&self) -> &'static str {
        match self {
            ResourceKind::List => "user_list_access",
            ResourceKind::Preset => "user_preset_access",
            ResourceKind::Note => "user_note_access",
        }
    }

    /// Resource foreign key column in the access ledger.
    pub fn access_column(&self) -> &'static str {
        match self {
            ResourceKind::List => "list_id",
            ResourceKind::Preset => "preset_id",
            ResourceKind::Note => "note_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::List => "list",
            ResourceKind::Preset => "preset",
            ResourceKind::Note => "note",
        }
    }

    /// Capitalized label for user-facing messages.
    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::List => "List",
            ResourceKind::Preset => "Preset",
            ResourceKind::Note => "Note",
        }
    }

    /// Lists and presets have globally unique names; notes do not.
    pub fn unique_names(&self) -> bool {
        !matches!(self, ResourceKind::Note)
    }

    /// Only notes carry a markdown body and tag strings.
    pub fn has_body(&self) -> bool {
        matches!(self, ResourceKind::Note)
    }
}

/// Flat persisted row, shared across the three resource tables. Lists and
/// presets select `NULL` for `content`/`tags`.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub password_hash: Option<String>,
    pub order_position: i32,
    pub owner_id: Option<Uuid>,
    pub privacy_code: Option<String>,
}

/// Domain view of a guarded resource with the privacy invariants enforced.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub order_position: i32,
    pub privacy: PrivacyState,
}

impl Resource {
    pub fn from_row(row: ResourceRow) -> Result<Self, PrivacyColumnsError> {
        let privacy = PrivacyState::from_columns(
            row.privacy_code.as_deref(),
            row.password_hash,
            row.owner_id,
        )?;
        Ok(Self {
            id: row.id,
            name: row.name,
            color: row.color,
            content: row.content,
            tags: row.tags.unwrap_or_default(),
            created_at: row.created_at,
            order_position: row.order_position,
            privacy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_rows_do_not_decode() {
        let row = ResourceRow {
            id: Uuid::new_v4(),
            name: "Groceries".to_string(),
            color: None,
            content: None,
            tags: None,
            created_at: Utc::now(),
            password_hash: None,
            order_position: 0,
            owner_id: None,
            privacy_code: Some("private".to_string()),
        };

        assert!(Resource::from_row(row).is_err());
    }
}
