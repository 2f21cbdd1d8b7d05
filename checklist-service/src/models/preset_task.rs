//! Preset task model - template tasks living inside a preset.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PresetTask {
    pub id: Uuid,
    pub preset_id: Uuid,
    pub task_name: String,
    pub description: Option<String>,
    pub done: bool,
    pub order_position: i32,
    pub created_at: DateTime<Utc>,
}

impl PresetTask {
    pub fn new(preset_id: Uuid, task_name: String, order_position: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            preset_id,
            task_name,
            description: Some(String::new()),
            done: false,
            order_position,
            created_at: Utc::now(),
        }
    }
}
