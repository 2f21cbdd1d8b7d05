//! Task and preset-task service.
//!
//! Task visibility piggybacks on list access: a user's task view contains the
//! inbox plus tasks of every list the authorization gate lets them read, and
//! assigning a task is validated against the list's privacy state.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::dtos::tasks::{
    AssigneeInfo, CreatePresetTaskRequest, CreateTaskRequest, PresetTaskResponse,
    TaskReorderItem, TaskResponse, UpdatePresetTaskRequest, UpdateTaskRequest,
};
use crate::models::{PresetTask, PrivacyState, ResourceKind, Task};
use crate::services::error::ServiceError;
use crate::services::resources::ResourceService;
use crate::services::store::{CompletedScope, Store};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
    lists: ResourceService,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>, lists: ResourceService) -> Self {
        Self { store, lists }
    }

    /// Tasks visible to the user: the inbox plus tasks of accessible lists.
    pub async fn list_for_user(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<TaskResponse>, ServiceError> {
        let accessible: std::collections::HashSet<Uuid> = self
            .lists
            .list(user_id, false)
            .await?
            .into_iter()
            .filter(|l| l.has_access)
            .map(|l| l.id)
            .collect();

        let assignees = self.assignee_index().await?;
        let tasks = self.store.list_tasks().await?;

        Ok(tasks
            .into_iter()
            .filter(|t| match t.list_id {
                None => true,
                Some(list_id) => accessible.contains(&list_id),
            })
            .map(|t| {
                let assignee = t.assignee_id.and_then(|id| assignees.get(&id).cloned());
                TaskResponse::from_task(t, assignee)
            })
            .collect())
    }

    /// Tasks of one list (or the inbox), unfiltered; the caller is expected to
    /// have passed the list gate already.
    pub async fn list_in_list(
        &self,
        list_id: Option<Uuid>,
    ) -> Result<Vec<TaskResponse>, ServiceError> {
        let assignees = self.assignee_index().await?;
        Ok(self
            .store
            .list_tasks_in_list(list_id)
            .await?
            .into_iter()
            .map(|t| {
                let assignee = t.assignee_id.and_then(|id| assignees.get(&id).cloned());
                TaskResponse::from_task(t, assignee)
            })
            .collect())
    }

    pub async fn create(&self, req: CreateTaskRequest) -> Result<TaskResponse, ServiceError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name cannot be empty.".to_string()));
        }

        let order_position = self.store.next_task_order(req.list_id).await?;
        let task = Task::new(name, req.list_id, order_position);
        self.store.insert_task(&task).await?;

        Ok(TaskResponse::from_task(task, None))
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<TaskResponse, ServiceError> {
        let mut task = self
            .store
            .find_task(id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        if let Some(Some(assignee_id)) = req.assignee_id {
            self.check_assignable(&task, assignee_id).await?;
        }

        if let Some(name) = req.name {
            task.name = name;
        }
        if let Some(description) = req.description {
            task.description = Some(description);
        }
        if let Some(done) = req.done {
            task.done = done;
        }
        if let Some(assignee_id) = req.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = req.due_date {
            task.due_date = due_date;
        }

        self.store.update_task(&task).await?;

        let assignee = match task.assignee_id {
            Some(assignee_id) => self
                .store
                .find_user_by_id(assignee_id)
                .await?
                .map(|u| AssigneeInfo {
                    id: u.id,
                    username: u.username,
                }),
            None => None,
        };
        Ok(TaskResponse::from_task(task, assignee))
    }

    pub async fn update_tags(
        &self,
        id: Uuid,
        tags: Vec<String>,
    ) -> Result<TaskResponse, ServiceError> {
        let mut task = self
            .store
            .find_task(id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        task.tags = Some(tags);
        self.store.update_task(&task).await?;

        Ok(TaskResponse::from_task(task, None))
    }

    pub async fn reorder(&self, items: &[TaskReorderItem]) -> Result<(), ServiceError> {
        for item in items {
            self.store.set_task_order(item.id, item.order_position).await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_task(id).await
    }

    pub async fn delete_completed(&self, scope: CompletedScope) -> Result<(), ServiceError> {
        self.store.delete_completed_tasks(scope).await
    }

    /// Move a task to another list (or the inbox), placing it last there.
    pub async fn move_to_list(
        &self,
        id: Uuid,
        list_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut task = self
            .store
            .find_task(id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        task.order_position = self.store.next_task_order(list_id).await?;
        task.list_id = list_id;
        self.store.update_task(&task).await
    }

    // ==================== Preset tasks ====================

    pub async fn list_preset_tasks(
        &self,
        preset_id: Uuid,
    ) -> Result<Vec<PresetTaskResponse>, ServiceError> {
        Ok(self
            .store
            .list_preset_tasks(preset_id)
            .await?
            .into_iter()
            .map(PresetTaskResponse::from)
            .collect())
    }

    pub async fn create_preset_task(
        &self,
        preset_id: Uuid,
        req: CreatePresetTaskRequest,
    ) -> Result<PresetTaskResponse, ServiceError> {
        self.store
            .find_resource(ResourceKind::Preset, preset_id)
            .await?
            .ok_or(ServiceError::NotFound("Preset"))?;

        let order_position = self.store.next_preset_task_order(preset_id).await?;
        let task = PresetTask::new(preset_id, req.task_name, order_position);
        self.store.insert_preset_task(&task).await?;

        Ok(PresetTaskResponse::from(task))
    }

    pub async fn update_preset_task(
        &self,
        id: Uuid,
        req: UpdatePresetTaskRequest,
    ) -> Result<PresetTaskResponse, ServiceError> {
        let mut task = self
            .store
            .find_preset_task(id)
            .await?
            .ok_or(ServiceError::NotFound("Preset task"))?;

        if let Some(task_name) = req.task_name {
            task.task_name = task_name;
        }
        if let Some(description) = req.description {
            task.description = Some(description);
        }
        if let Some(done) = req.done {
            task.done = done;
        }

        self.store.update_preset_task(&task).await?;
        Ok(PresetTaskResponse::from(task))
    }

    pub async fn delete_preset_task(&self, id: Uuid) -> Result<(), ServiceError> {
        self.store.delete_preset_task(id).await
    }

    /// Uncheck every task of the preset, making it reusable.
    pub async fn reset_preset_tasks(&self, preset_id: Uuid) -> Result<(), ServiceError> {
        self.store.reset_preset_tasks(preset_id).await
    }

    pub async fn reorder_preset_tasks(
        &self,
        items: &[TaskReorderItem],
    ) -> Result<(), ServiceError> {
        for item in items {
            self.store
                .set_preset_task_order(item.id, item.order_position)
                .await?;
        }
        Ok(())
    }

    // ==================== helpers ====================

    /// Assignment respects the list gate: only the owner may hold tasks of a
    /// personal list, only grant holders tasks of a private one.
    async fn check_assignable(&self, task: &Task, assignee_id: Uuid) -> Result<(), ServiceError> {
        let Some(list_id) = task.list_id else {
            return Ok(());
        };
        let Some(list) = self.store.find_resource(ResourceKind::List, list_id).await? else {
            return Ok(());
        };

        match &list.privacy {
            PrivacyState::Public => Ok(()),
            PrivacyState::Personal { owner_id } => {
                if *owner_id == assignee_id {
                    Ok(())
                } else {
                    Err(ServiceError::Validation(
                        "Cannot assign this task to a user who doesn't own the personal list."
                            .to_string(),
                    ))
                }
            }
            PrivacyState::Private { .. } => {
                if self
                    .store
                    .has_grant(ResourceKind::List, assignee_id, list_id)
                    .await?
                {
                    Ok(())
                } else {
                    Err(ServiceError::Validation(
                        "Cannot assign this task to a user who does not have access to the private list."
                            .to_string(),
                    ))
                }
            }
        }
    }

    async fn assignee_index(&self) -> Result<HashMap<Uuid, AssigneeInfo>, ServiceError> {
        Ok(self
            .store
            .list_users()
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    AssigneeInfo {
                        id: u.id,
                        username: u.username,
                    },
                )
            })
            .collect())
    }
}
