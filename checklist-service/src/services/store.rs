//! Storage seam for the service layer.
//!
//! Production runs on [`crate::services::Database`] (PostgreSQL); tests run on
//! [`crate::services::MemoryStore`]. Both uphold the same atomicity contract:
//! `update_resource` applies the row update and the requested ledger action in
//! one transaction, so a password rotation and its revoke-then-regrant are
//! observed together or not at all.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{PresetTask, Resource, ResourceKind, Tag, Task, User};
use crate::services::error::ServiceError;

/// What to do with a resource's access ledger alongside a row update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantsAction {
    /// Leave the ledger untouched (metadata-only update).
    Keep,
    /// Drop every grant, then grant the given user (if any). Used for password
    /// rotation (re-grant the rotating actor) and for leaving the private
    /// level (no re-grant).
    ResetTo(Option<Uuid>),
}

/// Which completed tasks to purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedScope {
    All,
    Inbox,
    List(Uuid),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), ServiceError>;

    // ==================== Users ====================

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError>;
    async fn list_users(&self) -> Result<Vec<User>, ServiceError>;
    async fn update_user_password(&self, id: Uuid, password_hash: &str)
        -> Result<(), ServiceError>;
    async fn update_user_settings(
        &self,
        id: Uuid,
        settings: &serde_json::Value,
    ) -> Result<(), ServiceError>;

    // ==================== Privacy-guarded resources ====================

    async fn insert_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
    ) -> Result<(), ServiceError>;
    async fn find_resource(
        &self,
        kind: ResourceKind,
        id: Uuid,
    ) -> Result<Option<Resource>, ServiceError>;
    async fn find_resource_by_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<Resource>, ServiceError>;
    /// All resources of a kind, ordered by `order_position` ascending.
    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>, ServiceError>;
    /// Full-row update plus the ledger action, atomically.
    async fn update_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
        grants: GrantsAction,
    ) -> Result<(), ServiceError>;
    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), ServiceError>;
    async fn next_order_position(&self, kind: ResourceKind) -> Result<i32, ServiceError>;
    async fn set_resource_order(
        &self,
        kind: ResourceKind,
        id: Uuid,
        order_position: i32,
    ) -> Result<(), ServiceError>;

    // ==================== Access ledger ====================

    /// Idempotent: inserting an existing grant is a no-op.
    async fn grant_access(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<(), ServiceError>;
    async fn has_grant(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<bool, ServiceError>;
    /// Drop every grant, then grant `sole_user` (if any), atomically.
    async fn replace_grants(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        sole_user: Option<Uuid>,
    ) -> Result<(), ServiceError>;
    async fn granted_user_ids(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError>;

    // ==================== Tasks ====================

    async fn insert_task(&self, task: &Task) -> Result<(), ServiceError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, ServiceError>;
    /// Every task, ordered by `order_position` ascending.
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    /// Tasks of one list (or the inbox), ordered.
    async fn list_tasks_in_list(&self, list_id: Option<Uuid>) -> Result<Vec<Task>, ServiceError>;
    async fn update_task(&self, task: &Task) -> Result<(), ServiceError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), ServiceError>;
    async fn delete_completed_tasks(&self, scope: CompletedScope) -> Result<(), ServiceError>;
    async fn next_task_order(&self, list_id: Option<Uuid>) -> Result<i32, ServiceError>;
    async fn set_task_order(&self, id: Uuid, order_position: i32) -> Result<(), ServiceError>;

    // ==================== Preset tasks ====================

    async fn insert_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError>;
    async fn find_preset_task(&self, id: Uuid) -> Result<Option<PresetTask>, ServiceError>;
    async fn list_preset_tasks(&self, preset_id: Uuid) -> Result<Vec<PresetTask>, ServiceError>;
    async fn update_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError>;
    async fn delete_preset_task(&self, id: Uuid) -> Result<(), ServiceError>;
    /// Mark every task of the preset as not done.
    async fn reset_preset_tasks(&self, preset_id: Uuid) -> Result<(), ServiceError>;
    async fn next_preset_task_order(&self, preset_id: Uuid) -> Result<i32, ServiceError>;
    async fn set_preset_task_order(&self, id: Uuid, order_position: i32)
        -> Result<(), ServiceError>;

    // ==================== Tags ====================

    async fn insert_tag(&self, tag: &Tag) -> Result<(), ServiceError>;
    async fn find_tag(&self, name: &str) -> Result<Option<Tag>, ServiceError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError>;
    async fn update_tag_color(&self, name: &str, color: &str)
        -> Result<Option<Tag>, ServiceError>;
    async fn set_tag_order(&self, name: &str, order_position: i32) -> Result<(), ServiceError>;
    async fn next_tag_order(&self) -> Result<i32, ServiceError>;
    /// Remove the tag string from every task, then delete the tag, atomically.
    async fn delete_tag(&self, name: &str) -> Result<(), ServiceError>;
}
