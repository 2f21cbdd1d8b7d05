use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::dtos::double_option;
use crate::models::Task;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksQuery {
    /// Acting user; tasks of lists the user cannot access are filtered out.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksInListQuery {
    /// Absent means the inbox.
    pub list_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    #[schema(example = "Buy milk")]
    pub name: String,

    pub list_id: Option<Uuid>,
}

/// Partial task update. Absent fields stay untouched; `assignee_id` and
/// `due_date` accept an explicit `null` to clear the value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub assignee_id: Option<Option<Uuid>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>, nullable)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTaskTagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveTaskRequest {
    /// Target list; absent means the inbox.
    pub list_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskReorderItem {
    pub id: Uuid,
    pub order_position: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskReorderRequest {
    pub items: Vec<TaskReorderItem>,
}

/// Which completed tasks to purge.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteCompletedRequest {
    /// `true` purges every list and the inbox.
    #[serde(default)]
    pub all: bool,
    /// Scope to one list; absent (with `all == false`) means the inbox.
    pub list_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssigneeInfo {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub done: bool,
    pub list_id: Option<Uuid>,
    pub order_position: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub assignee: Option<AssigneeInfo>,
}

impl TaskResponse {
    pub fn from_task(task: Task, assignee: Option<AssigneeInfo>) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            done: task.done,
            list_id: task.list_id,
            order_position: task.order_position,
            created_at: task.created_at,
            tags: task.tags.unwrap_or_default(),
            assignee_id: task.assignee_id,
            due_date: task.due_date,
            assignee,
        }
    }
}

// --- Preset tasks ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePresetTaskRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub task_name: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePresetTaskRequest {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PresetTaskResponse {
    pub id: Uuid,
    pub preset_id: Uuid,
    pub task_name: String,
    pub description: Option<String>,
    pub done: bool,
    pub order_position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::models::PresetTask> for PresetTaskResponse {
    fn from(t: crate::models::PresetTask) -> Self {
        Self {
            id: t.id,
            preset_id: t.preset_id,
            task_name: t.task_name,
            description: t.description,
            done: t.done,
            order_position: t.order_position,
            created_at: t.created_at,
        }
    }
}
