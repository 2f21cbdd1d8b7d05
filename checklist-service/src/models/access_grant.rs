//! Access grant model - the per-resource unlock ledger.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per `(user, resource)` pair: the user has presented the resource's
/// password at least once since the last rotation. Grants carry no expiry.
#[derive(Debug, Clone, FromRow)]
pub struct AccessGrant {
    pub user_id: Uuid,
    pub resource_id: Uuid,
    pub granted_at: DateTime<Utc>,
}

impl AccessGrant {
    pub fn new(user_id: Uuid, resource_id: Uuid) -> Self {
        Self {
            user_id,
            resource_id,
            granted_at: Utc::now(),
        }
    }
}
