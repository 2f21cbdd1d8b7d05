//! In-memory [`Store`] for tests and local development.
//!
//! One mutex guards the whole state, so every operation (including the
//! compound `update_resource` + ledger action) is observed atomically, which
//! matches the transaction contract of the PostgreSQL store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{PresetTask, Resource, ResourceKind, Tag, Task, User};
use crate::services::error::ServiceError;
use crate::services::store::{CompletedScope, GrantsAction, Store};

#[derive(Default)]
struct KindState {
    resources: HashMap<Uuid, Resource>,
    /// `(user_id, resource_id)` pairs.
    grants: HashSet<(Uuid, Uuid)>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    lists: KindState,
    presets: KindState,
    notes: KindState,
    tasks: HashMap<Uuid, Task>,
    preset_tasks: HashMap<Uuid, PresetTask>,
    tags: HashMap<String, Tag>,
}

impl Inner {
    fn kind(&self, kind: ResourceKind) -> &KindState {
        match kind {
            ResourceKind::List => &self.lists,
            ResourceKind::Preset => &self.presets,
            ResourceKind::Note => &self.notes,
        }
    }

    fn kind_mut(&mut self, kind: ResourceKind) -> &mut KindState {
        match kind {
            ResourceKind::List => &mut self.lists,
            ResourceKind::Preset => &mut self.presets,
            ResourceKind::Note => &mut self.notes,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    // ==================== Users ====================

    async fn insert_user(&self, user: &User) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        let mut users: Vec<User> = self.inner.lock().unwrap().users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), ServiceError> {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn update_user_settings(
        &self,
        id: Uuid,
        settings: &serde_json::Value,
    ) -> Result<(), ServiceError> {
        if let Some(user) = self.inner.lock().unwrap().users.get_mut(&id) {
            user.settings = Some(settings.clone());
        }
        Ok(())
    }

    // ==================== Privacy-guarded resources ====================

    async fn insert_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
    ) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .kind_mut(kind)
            .resources
            .insert(resource.id, resource.clone());
        Ok(())
    }

    async fn find_resource(
        &self,
        kind: ResourceKind,
        id: Uuid,
    ) -> Result<Option<Resource>, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .resources
            .get(&id)
            .cloned())
    }

    async fn find_resource_by_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<Option<Resource>, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .resources
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list_resources(&self, kind: ResourceKind) -> Result<Vec<Resource>, ServiceError> {
        let mut resources: Vec<Resource> = self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .resources
            .values()
            .cloned()
            .collect();
        resources.sort_by_key(|r| r.order_position);
        Ok(resources)
    }

    async fn update_resource(
        &self,
        kind: ResourceKind,
        resource: &Resource,
        grants: GrantsAction,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner.kind_mut(kind);
        state.resources.insert(resource.id, resource.clone());
        if let GrantsAction::ResetTo(sole_user) = grants {
            state.grants.retain(|(_, rid)| *rid != resource.id);
            if let Some(user_id) = sole_user {
                state.grants.insert((user_id, resource.id));
            }
        }
        Ok(())
    }

    async fn delete_resource(&self, kind: ResourceKind, id: Uuid) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        inner.kind_mut(kind).resources.remove(&id);
        inner.kind_mut(kind).grants.retain(|(_, rid)| *rid != id);
        // emulate the FK cascades
        match kind {
            ResourceKind::List => inner.tasks.retain(|_, t| t.list_id != Some(id)),
            ResourceKind::Preset => inner.preset_tasks.retain(|_, t| t.preset_id != id),
            ResourceKind::Note => {}
        }
        Ok(())
    }

    async fn next_order_position(&self, kind: ResourceKind) -> Result<i32, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .resources
            .values()
            .map(|r| r.order_position)
            .max()
            .map_or(0, |max| max + 1))
    }

    async fn set_resource_order(
        &self,
        kind: ResourceKind,
        id: Uuid,
        order_position: i32,
    ) -> Result<(), ServiceError> {
        if let Some(resource) = self
            .inner
            .lock()
            .unwrap()
            .kind_mut(kind)
            .resources
            .get_mut(&id)
        {
            resource.order_position = order_position;
        }
        Ok(())
    }

    // ==================== Access ledger ====================

    async fn grant_access(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .kind_mut(kind)
            .grants
            .insert((user_id, resource_id));
        Ok(())
    }

    async fn has_grant(
        &self,
        kind: ResourceKind,
        user_id: Uuid,
        resource_id: Uuid,
    ) -> Result<bool, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .grants
            .contains(&(user_id, resource_id)))
    }

    async fn replace_grants(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        sole_user: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let state = inner.kind_mut(kind);
        state.grants.retain(|(_, rid)| *rid != resource_id);
        if let Some(user_id) = sole_user {
            state.grants.insert((user_id, resource_id));
        }
        Ok(())
    }

    async fn granted_user_ids(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<Vec<Uuid>, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .kind(kind)
            .grants
            .iter()
            .filter(|(_, rid)| *rid == resource_id)
            .map(|(uid, _)| *uid)
            .collect())
    }

    // ==================== Tasks ====================

    async fn insert_task(&self, task: &Task) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .insert(task.id, task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, ServiceError> {
        Ok(self.inner.lock().unwrap().tasks.get(&id).cloned())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        let mut tasks: Vec<Task> = self.inner.lock().unwrap().tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.order_position);
        Ok(tasks)
    }

    async fn list_tasks_in_list(&self, list_id: Option<Uuid>) -> Result<Vec<Task>, ServiceError> {
        let mut tasks: Vec<Task> = self
            .inner
            .lock()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.list_id == list_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order_position);
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .tasks
            .insert(task.id, task.clone());
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), ServiceError> {
        self.inner.lock().unwrap().tasks.remove(&id);
        Ok(())
    }

    async fn delete_completed_tasks(&self, scope: CompletedScope) -> Result<(), ServiceError> {
        self.inner.lock().unwrap().tasks.retain(|_, t| {
            let in_scope = match scope {
                CompletedScope::All => true,
                CompletedScope::Inbox => t.list_id.is_none(),
                CompletedScope::List(list_id) => t.list_id == Some(list_id),
            };
            !(t.done && in_scope)
        });
        Ok(())
    }

    async fn next_task_order(&self, list_id: Option<Uuid>) -> Result<i32, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tasks
            .values()
            .filter(|t| t.list_id == list_id)
            .map(|t| t.order_position)
            .max()
            .map_or(0, |max| max + 1))
    }

    async fn set_task_order(&self, id: Uuid, order_position: i32) -> Result<(), ServiceError> {
        if let Some(task) = self.inner.lock().unwrap().tasks.get_mut(&id) {
            task.order_position = order_position;
        }
        Ok(())
    }

    // ==================== Preset tasks ====================

    async fn insert_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .preset_tasks
            .insert(task.id, task.clone());
        Ok(())
    }

    async fn find_preset_task(&self, id: Uuid) -> Result<Option<PresetTask>, ServiceError> {
        Ok(self.inner.lock().unwrap().preset_tasks.get(&id).cloned())
    }

    async fn list_preset_tasks(&self, preset_id: Uuid) -> Result<Vec<PresetTask>, ServiceError> {
        let mut tasks: Vec<PresetTask> = self
            .inner
            .lock()
            .unwrap()
            .preset_tasks
            .values()
            .filter(|t| t.preset_id == preset_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order_position);
        Ok(tasks)
    }

    async fn update_preset_task(&self, task: &PresetTask) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .preset_tasks
            .insert(task.id, task.clone());
        Ok(())
    }

    async fn delete_preset_task(&self, id: Uuid) -> Result<(), ServiceError> {
        self.inner.lock().unwrap().preset_tasks.remove(&id);
        Ok(())
    }

    async fn reset_preset_tasks(&self, preset_id: Uuid) -> Result<(), ServiceError> {
        for task in self
            .inner
            .lock()
            .unwrap()
            .preset_tasks
            .values_mut()
            .filter(|t| t.preset_id == preset_id)
        {
            task.done = false;
        }
        Ok(())
    }

    async fn next_preset_task_order(&self, preset_id: Uuid) -> Result<i32, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .preset_tasks
            .values()
            .filter(|t| t.preset_id == preset_id)
            .map(|t| t.order_position)
            .max()
            .map_or(0, |max| max + 1))
    }

    async fn set_preset_task_order(
        &self,
        id: Uuid,
        order_position: i32,
    ) -> Result<(), ServiceError> {
        if let Some(task) = self.inner.lock().unwrap().preset_tasks.get_mut(&id) {
            task.order_position = order_position;
        }
        Ok(())
    }

    // ==================== Tags ====================

    async fn insert_tag(&self, tag: &Tag) -> Result<(), ServiceError> {
        self.inner
            .lock()
            .unwrap()
            .tags
            .insert(tag.name.clone(), tag.clone());
        Ok(())
    }

    async fn find_tag(&self, name: &str) -> Result<Option<Tag>, ServiceError> {
        Ok(self.inner.lock().unwrap().tags.get(name).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        let mut tags: Vec<Tag> = self.inner.lock().unwrap().tags.values().cloned().collect();
        tags.sort_by_key(|t| t.order_position);
        Ok(tags)
    }

    async fn update_tag_color(
        &self,
        name: &str,
        color: &str,
    ) -> Result<Option<Tag>, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.tags.get_mut(name) {
            Some(tag) => {
                tag.color = Some(color.to_string());
                Ok(Some(tag.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_tag_order(&self, name: &str, order_position: i32) -> Result<(), ServiceError> {
        if let Some(tag) = self.inner.lock().unwrap().tags.get_mut(name) {
            tag.order_position = order_position;
        }
        Ok(())
    }

    async fn next_tag_order(&self) -> Result<i32, ServiceError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .tags
            .values()
            .map(|t| t.order_position)
            .max()
            .map_or(0, |max| max + 1))
    }

    async fn delete_tag(&self, name: &str) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        for task in inner.tasks.values_mut() {
            if let Some(tags) = task.tags.as_mut() {
                tags.retain(|t| t != name);
            }
        }
        inner.tags.remove(name);
        Ok(())
    }
}
