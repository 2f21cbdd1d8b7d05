use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Tag;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "errands")]
    pub name: String,

    #[schema(example = "#10b981")]
    pub color: Option<String>,
}

/// Create-if-missing and attach a tag to a task or note.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignTagRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,

    pub color: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTagColorRequest {
    pub color: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagReorderItem {
    pub name: String,
    pub order_position: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TagReorderRequest {
    pub items: Vec<TagReorderItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagResponse {
    pub name: String,
    pub color: Option<String>,
    pub order_position: i32,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            name: t.name,
            color: t.color,
            order_position: t.order_position,
        }
    }
}
