use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{PrivacyLevel, Resource, ResourceKind};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListResourcesQuery {
    /// Acting user; anonymous listings exclude personal resources.
    pub user_id: Option<Uuid>,
    /// Drop resources the acting user has not unlocked.
    #[serde(default)]
    pub hide_locked: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    #[schema(example = "Groceries")]
    pub name: String,

    #[schema(example = "#f59e0b")]
    pub color: Option<String>,

    #[serde(rename = "type")]
    pub privacy: PrivacyLevel,

    /// Required when creating a private resource.
    pub password: Option<String>,

    /// Markdown body; notes only.
    pub content: Option<String>,

    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: String,

    pub color: Option<String>,

    #[serde(rename = "type")]
    pub privacy: PrivacyLevel,

    /// Must match the stored password when the resource is currently private.
    pub current_password: Option<String>,

    /// Replaces the stored password and revokes every other grant.
    pub new_password: Option<String>,

    /// Markdown body; notes only.
    pub content: Option<String>,

    /// Tag strings; notes only.
    pub tags: Option<Vec<String>>,

    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteResourceRequest {
    /// Required when deleting a private resource.
    pub password: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPasswordRequest {
    pub password: String,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPasswordResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeAccessRequest {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderItem {
    pub id: Uuid,
    pub order_position: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
    pub user_id: Option<Uuid>,
}

/// Resource view returned to callers; `has_access` is computed, never stored.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceResponse {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub order_position: i32,
    #[serde(rename = "type")]
    pub privacy: PrivacyLevel,
    pub has_access: bool,
}

impl ResourceResponse {
    pub fn from_resource(kind: ResourceKind, resource: Resource, has_access: bool) -> Self {
        Self {
            id: resource.id,
            name: resource.name,
            color: resource.color,
            // the body of a locked note is never returned
            content: if kind.has_body() && has_access {
                Some(resource.content.unwrap_or_default())
            } else {
                None
            },
            tags: if kind.has_body() {
                Some(resource.tags)
            } else {
                None
            },
            created_at: resource.created_at,
            order_position: resource.order_position,
            privacy: resource.privacy.level(),
            has_access,
        }
    }
}

/// Update outcome; the fresh resource view is present only on success.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResourceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UpdateResourceResponse {
    pub fn ok(resource: ResourceResponse) -> Self {
        Self {
            success: true,
            resource: Some(resource),
            message: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            resource: None,
            message: Some(message),
        }
    }
}
