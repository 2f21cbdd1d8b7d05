//! Task model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Task entity. `list_id == None` means the inbox.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub done: bool,
    pub list_id: Option<Uuid>,
    pub order_position: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Option<Vec<String>>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(name: String, list_id: Option<Uuid>, order_position: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            done: false,
            list_id,
            order_position,
            created_at: Utc::now(),
            tags: Some(Vec::new()),
            assignee_id: None,
            due_date: None,
        }
    }
}
