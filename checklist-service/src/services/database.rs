//! PostgreSQL [`Store`] implementation.
//!
//! Uses sqlx with runtime-checked queries. The three resource kinds share one
//! query shape; the kind supplies table and ledger names. Compound operations
//! (row update + ledger reset, tag delete + strip) run in one transaction.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{PresetTask, Resource, ResourceKind, ResourceRow, Tag, Task, User};
use crate::services::error::ServiceError;
use crate::services::store::{CompletedScope, GrantsAction, Store};

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Column list for a resource SELECT; lists and presets have no body.
    fn resource_columns(kind: ResourceKind) -> &'static str {
        if kind.has_body() {
            "id, name, color, content, tags, created_at, password_hash, order_position, \
             owner_id, type::text AS privacy_code"
        } else {
            "id, name, color, NULL::text AS content, NULL::text[] AS tags, created_at, \
             password_hash, order_position, owner_id, type::text AS privacy_code"
        }
    }

    fn decode(kind: ResourceKind, row: ResourceRow) -> Result<Resource, ServiceError> {
        Resource::from_row(row).map_err(|e| {
            ServiceError::Internal(anyhow::anyhow!(
                "corrupt {} row in storage: {}",
                kind.label(),
                e
            ))
        })
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== Users ====================

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, settings)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(&user.settings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_user_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_user_settings(
        &self,
        id: Uuid,
        settings: &serde_json::Value,
    ) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET settings = $1 WHERE id = $2")
            .bind(settings)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Privacy-guarded resources ====================

    async fn insert_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
    ) -> Result<(), ServiceError> {
        let (level, password_hash, owner_id) = resource.privacy.to_columns();
        if kind.has_body() {
            sqlx::query(&format!(
                r#"
                INSERT INTO {} (id, name, color, content, tags, created_at, password_hash,
                                order_position, owner_id, type)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10::privacy_level)
                "#,
                kind.table()
            ))
            .bind(resource.id)
            .bind(&resource.name)
            .bind(&resource.color)
            .bind(&resource.content)
            .bind(&resource.tags)
            .bind(resource.created_at)
            .bind(password_hash)
            .bind(resource.order_position)
            .bind(owner_id)
            .bind(level.as_str())
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(&format!(
                r#"
                INSERT INTO {} (id, name, color, created_at, password_hash, order_position,
                                owner_id, type)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8::privacy_level)
                "#,
                kind.table()
            ))
            .bind(resource.id)
            .bind(&resource.name)
            .bind(&resource.color)
            .bind(resource.created_at)
            .bind(password_hash)
            .bind(resource.order_position)
            .bind(owner_id)
            .bind(level.as_str())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn find_resource(
        &self,
        kind: ResourceKind,
        id: Uuid,
    ) -> Result<Option<Resource>, ServiceError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM {} WHERE id = $1",
            Self::resource_columns(kind),
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::decode(kind, r)).transpose()
    }

    async fn find_resource_by_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<Resource>, ServiceError> {
        let row = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM {} WHERE name = $1",
            Self::resource_columns(kind),
            kind.table()
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::decode(kind, r)).transpose()
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>, ServiceError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "SELECT {} FROM {} ORDER BY order_position ASC",
            Self::resource_columns(kind),
            kind.table()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| Self::decode(kind, r)).collect()
    }

    async fn update_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
        grants: GrantsAction,
    ) -> Result<(), ServiceError> {
        let (level, password_hash, owner_id) = resource.privacy.to_columns();
        let mut tx = self.pool.begin().await?;

        if kind.has_body() {
            sqlx::query(&format!(
                r#"
                UPDATE {} SET name = $1, color = $2, content = $3, tags = $4,
                              password_hash = $5, owner_id = $6, type = $7::privacy_level
                WHERE id = $8
                "#,
                kind.table()
            ))
            .bind(&resource.name)
            .bind(&resource.color)
            .bind(&resource.content)
            .bind(&resource.tags)
            .bind(password_hash)
            .bind(owner_id)
            .bind(level.as_str())
            .bind(resource.id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(&format!(
                r#"
                UPDATE {} SET name = $1, color = $2, password_hash = $3, owner_id = $4,
                              type = $5::privacy_level
                WHERE id = $6
                "#,
                kind.table()
            ))
            .bind(&resource.name)
            .bind(&resource.color)
            .bind(password_hash)
            .bind(owner_id)
            .bind(level.as_str())
            .bind(resource.id)
            .execute(&mut *tx)
            .await?;
        }

        if let GrantsAction::ResetTo(sole_user) = grants {
            sqlx::query(&format!(
                "DELETE FROM {} WHERE {} = $1",
                kind.access_table(),
                kind.access_column()
            ))
            .bind(resource.id)
            .execute(&mut *tx)
            .await?;

            if let Some(user_id) = sole_user {
                sqlx::query(&format!(
                    "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                    kind.access_table(),
                    kind.access_column()
                ))
                .bind(user_id)
                .bind(resource.id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), ServiceError> {
        // ledger rows, tasks and preset tasks go with the FK cascades
        sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn next_order_position(&self, kind: ResourceKind) -> Result<i32, ServiceError> {
        let (next,): (i32,) = sqlx::query_as(&format!(
            "SELECT COALESCE(MAX(order_position), -1) + 1 FROM {}",
            kind.table()
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(next)
    }

    async fn set_resource_order(
        &self,
        kind: ResourceKind,
        id: Uuid,
        order_position: i32,
    ) -> Result<(), ServiceError> {
        sqlx::query(&format!(
            "UPDATE {} SET order_position = $1 WHERE id = $2",
            kind.table()
        ))
        .bind(order_position)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ==================== Access ledger ====================

    async fn grant_access(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<(), ServiceError> {
        sqlx::query(&format!(
            "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.access_table(),
            kind.access_column()
        ))
        .bind(user_id)
        .bind(resource_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn has_grant(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let (exists,): (bool,) = sqlx::query_as(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND {} = $2)",
            kind.access_table(),
            kind.access_column()
        ))
        .bind(user_id)
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn replace_grants(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        sole_user: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1",
            kind.access_table(),
            kind.access_column()
        ))
        .bind(resource_id)
        .execute(&mut *tx)
        .await?;

        if let Some(user_id) = sole_user {
            sqlx::query(&format!(
                "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                kind.access_table(),
                kind.access_column()
            ))
            .bind(user_id)
            .bind(resource_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn granted_user_ids(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(&format!(
            "SELECT user_id FROM {} WHERE {} = $1",
            kind.access_table(),
            kind.access_column()
        ))
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // ==================== Tasks ====================

    async fn insert_task(&self, task: &Task) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, name, description, done, list_id, order_position,
                               created_at, tags, assignee_id, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(task.id)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.done)
        .bind(task.list_id)
        .bind(task.order_position)
        .bind(task.created_at)
        .bind(&task.tags)
        .bind(task.assignee_id)
        .bind(task.due_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY order_position ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn list_tasks_in_list(&self, list_id: Option<Uuid>) -> Result<Vec<Task>, ServiceError> {
        let tasks = match list_id {
            Some(list_id) => {
                sqlx::query_as::<_, Task>(
                    "SELECT * FROM tasks WHERE list_id = $1 ORDER BY order_position ASC",
                )
                .bind(list_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    "SELECT * FROM tasks WHERE list_id IS NULL ORDER BY order_position ASC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE tasks SET name = $1, description = $2, done = $3, list_id = $4,
                             order_position = $5, tags = $6, assignee_id = $7, due_date = $8
            WHERE id = $9
            "#,
        )
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.done)
        .bind(task.list_id)
        .bind(task.order_position)
        .bind(&task.tags)
        .bind(task.assignee_id)
        .bind(task.due_date)
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_completed_tasks(&self, scope: CompletedScope) -> Result<(), ServiceError> {
        match scope {
            CompletedScope::All => {
                sqlx::query("DELETE FROM tasks WHERE done = TRUE")
                    .execute(&self.pool)
                    .await?;
            }
            CompletedScope::Inbox => {
                sqlx::query("DELETE FROM tasks WHERE done = TRUE AND list_id IS NULL")
                    .execute(&self.pool)
                    .await?;
            }
            CompletedScope::List(list_id) => {
                sqlx::query("DELETE FROM tasks WHERE done = TRUE AND list_id = $1")
                    .bind(list_id)
                    .execute(&self.pool)
                    .await?;
            }
        }
        Ok(())
    }

    async fn next_task_order(&self, list_id: Option<Uuid>) -> Result<i32, ServiceError> {
        let (next,): (i32,) = match list_id {
            Some(list_id) => {
                sqlx::query_as(
                    "SELECT COALESCE(MAX(order_position), -1) + 1 FROM tasks WHERE list_id = $1",
                )
                .bind(list_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT COALESCE(MAX(order_position), -1) + 1 FROM tasks WHERE list_id IS NULL",
                )
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(next)
    }

    async fn set_task_order(&self, id: Uuid, order_position: i32) -> Result<(), ServiceError> {
        sqlx::query("UPDATE tasks SET order_position = $1 WHERE id = $2")
            .bind(order_position)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Preset tasks ====================

    async fn insert_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO preset_tasks (id, preset_id, task_name, description, done,
                                      order_position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(task.id)
        .bind(task.preset_id)
        .bind(&task.task_name)
        .bind(&task.description)
        .bind(task.done)
        .bind(task.order_position)
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_preset_task(&self, id: Uuid) -> Result<Option<PresetTask>, ServiceError> {
        Ok(
            sqlx::query_as::<_, PresetTask>("SELECT * FROM preset_tasks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_preset_tasks(&self, preset_id: Uuid) -> Result<Vec<PresetTask>, ServiceError> {
        Ok(sqlx::query_as::<_, PresetTask>(
            "SELECT * FROM preset_tasks WHERE preset_id = $1 ORDER BY order_position ASC",
        )
        .bind(preset_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE preset_tasks SET task_name = $1, description = $2, done = $3,
                                    order_position = $4
            WHERE id = $5
            "#,
        )
        .bind(&task.task_name)
        .bind(&task.description)
        .bind(task.done)
        .bind(task.order_position)
        .bind(task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_preset_task(&self, id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM preset_tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reset_preset_tasks(&self, preset_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("UPDATE preset_tasks SET done = FALSE WHERE preset_id = $1")
            .bind(preset_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn next_preset_task_order(&self, preset_id: Uuid) -> Result<i32, ServiceError> {
        let (next,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(order_position), -1) + 1 FROM preset_tasks WHERE preset_id = $1",
        )
        .bind(preset_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(next)
    }

    async fn set_preset_task_order(
        &self,
        id: Uuid,
        order_position: i32,
    ) -> Result<(), ServiceError> {
        sqlx::query("UPDATE preset_tasks SET order_position = $1 WHERE id = $2")
            .bind(order_position)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== Tags ====================

    async fn insert_tag(&self, tag: &Tag) -> Result<(), ServiceError> {
        sqlx::query("INSERT INTO tags (name, color, order_position) VALUES ($1, $2, $3)")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(tag.order_position)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_tag(&self, name: &str) -> Result<Option<Tag>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        Ok(
            sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY order_position ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn update_tag_color(
        &self,
        name: &str,
        color: &str,
    ) -> Result<Option<Tag>, ServiceError> {
        Ok(sqlx::query_as::<_, Tag>(
            "UPDATE tags SET color = $1 WHERE name = $2 RETURNING name, color, order_position",
        )
        .bind(color)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_tag_order(&self, name: &str, order_position: i32) -> Result<(), ServiceError> {
        sqlx::query("UPDATE tags SET order_position = $1 WHERE name = $2")
            .bind(order_position)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn next_tag_order(&self) -> Result<i32, ServiceError> {
        let (next,): (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(order_position), -1) + 1 FROM tags")
                .fetch_one(&self.pool)
                .await?;
        Ok(next)
    }

    async fn delete_tag(&self, name: &str) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE tasks SET tags = array_remove(tags, $1) WHERE $1 = ANY(tags)")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM tags WHERE name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
