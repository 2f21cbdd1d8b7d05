//! Tag model - a global, name-keyed color palette entry.

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub name: String,
    pub color: Option<String>,
    pub order_position: i32,
}

impl Tag {
    pub fn new(name: String, color: Option<String>, order_position: i32) -> Self {
        Self {
            name,
            color,
            order_position,
        }
    }
}
