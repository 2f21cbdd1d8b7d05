//! Privacy level and state for guarded resources.
//!
//! The persisted shape is a flat row with nullable `type`, `password_hash` and
//! `owner_id` columns; in memory the three levels are a tagged union so that a
//! private resource without a hash, or a personal resource without an owner,
//! cannot be constructed at all. Conversion happens at the storage boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Visibility level codes. A missing (`NULL`) level reads as `Public`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Public,
    Private,
    Personal,
}

impl PrivacyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyLevel::Public => "public",
            PrivacyLevel::Private => "private",
            PrivacyLevel::Personal => "personal",
        }
    }

    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("private") => PrivacyLevel::Private,
            Some("personal") => PrivacyLevel::Personal,
            _ => PrivacyLevel::Public,
        }
    }
}

/// Tagged privacy state of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivacyState {
    Public,
    Private { password_hash: String },
    Personal { owner_id: Uuid },
}

/// Raised when persisted privacy columns contradict each other.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrivacyColumnsError {
    #[error("a private resource must carry a password hash")]
    MissingHash,
    #[error("a personal resource must carry an owner")]
    MissingOwner,
    #[error("privacy columns carry fields that do not belong to the stored level")]
    ExtraneousColumns,
}

impl PrivacyState {
    pub fn level(&self) -> PrivacyLevel {
        match self {
            PrivacyState::Public => PrivacyLevel::Public,
            PrivacyState::Private { .. } => PrivacyLevel::Private,
            PrivacyState::Personal { .. } => PrivacyLevel::Personal,
        }
    }

    pub fn password_hash(&self) -> Option<&str> {
        match self {
            PrivacyState::Private { password_hash } => Some(password_hash),
            _ => None,
        }
    }

    pub fn owner_id(&self) -> Option<Uuid> {
        match self {
            PrivacyState::Personal { owner_id } => Some(*owner_id),
            _ => None,
        }
    }

    /// Rebuild the tagged state from flat row columns.
    pub fn from_columns(
        level: Option<&str>,
        password_hash: Option<String>,
        owner_id: Option<Uuid>,
    ) -> Result<Self, PrivacyColumnsError> {
        match PrivacyLevel::parse(level) {
            PrivacyLevel::Public => {
                if password_hash.is_some() || owner_id.is_some() {
                    return Err(PrivacyColumnsError::ExtraneousColumns);
                }
                Ok(PrivacyState::Public)
            }
            PrivacyLevel::Private => {
                if owner_id.is_some() {
                    return Err(PrivacyColumnsError::ExtraneousColumns);
                }
                let password_hash = password_hash.ok_or(PrivacyColumnsError::MissingHash)?;
                Ok(PrivacyState::Private { password_hash })
            }
            PrivacyLevel::Personal => {
                if password_hash.is_some() {
                    return Err(PrivacyColumnsError::ExtraneousColumns);
                }
                let owner_id = owner_id.ok_or(PrivacyColumnsError::MissingOwner)?;
                Ok(PrivacyState::Personal { owner_id })
            }
        }
    }

    /// Flatten into the persisted column triple.
    pub fn to_columns(&self) -> (PrivacyLevel, Option<&str>, Option<Uuid>) {
        (self.level(), self.password_hash(), self.owner_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_level_reads_as_public() {
        let state = PrivacyState::from_columns(None, None, None).unwrap();
        assert_eq!(state, PrivacyState::Public);
        assert_eq!(state.level(), PrivacyLevel::Public);
    }

    #[test]
    fn private_requires_hash() {
        assert_eq!(
            PrivacyState::from_columns(Some("private"), None, None),
            Err(PrivacyColumnsError::MissingHash)
        );

        let state =
            PrivacyState::from_columns(Some("private"), Some("$argon2id$stub".into()), None)
                .unwrap();
        assert_eq!(state.password_hash(), Some("$argon2id$stub"));
        assert_eq!(state.owner_id(), None);
    }

    #[test]
    fn personal_requires_owner() {
        assert_eq!(
            PrivacyState::from_columns(Some("personal"), None, None),
            Err(PrivacyColumnsError::MissingOwner)
        );

        let owner = Uuid::new_v4();
        let state = PrivacyState::from_columns(Some("personal"), None, Some(owner)).unwrap();
        assert_eq!(state.owner_id(), Some(owner));
        assert_eq!(state.password_hash(), None);
    }

    #[test]
    fn mixed_columns_are_rejected() {
        let owner = Uuid::new_v4();
        assert_eq!(
            PrivacyState::from_columns(Some("private"), Some("h".into()), Some(owner)),
            Err(PrivacyColumnsError::ExtraneousColumns)
        );
        assert_eq!(
            PrivacyState::from_columns(Some("personal"), Some("h".into()), Some(owner)),
            Err(PrivacyColumnsError::ExtraneousColumns)
        );
        assert_eq!(
            PrivacyState::from_columns(None, Some("h".into()), None),
            Err(PrivacyColumnsError::ExtraneousColumns)
        );
    }

    #[test]
    fn columns_round_trip() {
        let owner = Uuid::new_v4();
        for state in [
            PrivacyState::Public,
            PrivacyState::Private {
                password_hash: "$argon2id$stub".into(),
            },
            PrivacyState::Personal { owner_id: owner },
        ] {
            let (level, hash, owner_id) = state.to_columns();
            let level = match level {
                PrivacyLevel::Public => None,
                other => Some(other.as_str()),
            };
            let rebuilt =
                PrivacyState::from_columns(level, hash.map(str::to_string), owner_id).unwrap();
            assert_eq!(rebuilt, state);
        }
    }
}
