//! Tag service: the global tag palette plus create-and-assign helpers for
//! tasks and notes.

use std::sync::Arc;

use uuid::Uuid;

use crate::dtos::tags::{TagReorderItem, TagResponse};
use crate::models::{ResourceKind, Tag};
use crate::services::error::ServiceError;
use crate::services::store::{GrantsAction, Store};

#[derive(Clone)]
pub struct TagService {
    store: Arc<dyn Store>,
}

impl TagService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<TagResponse>, ServiceError> {
        Ok(self
            .store
            .list_tags()
            .await?
            .into_iter()
            .map(TagResponse::from)
            .collect())
    }

    pub async fn create(
        &self,
        name: String,
        color: Option<String>,
    ) -> Result<TagResponse, ServiceError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name cannot be empty.".to_string()));
        }
        if self.store.find_tag(&name).await?.is_some() {
            return Err(ServiceError::Conflict(
                "A tag with this name already exists.".to_string(),
            ));
        }

        let tag = Tag::new(name, color, self.store.next_tag_order().await?);
        self.store.insert_tag(&tag).await?;
        Ok(TagResponse::from(tag))
    }

    /// Create the tag if it is new, then attach it to the task. Returns the
    /// freshly created tag, if any.
    pub async fn assign_to_task(
        &self,
        task_id: Uuid,
        name: String,
        color: Option<String>,
    ) -> Result<Option<TagResponse>, ServiceError> {
        let created = self.ensure_tag(&name, color).await?;

        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or(ServiceError::NotFound("Task"))?;

        let mut tags = task.tags.take().unwrap_or_default();
        if !tags.contains(&name) {
            tags.push(name);
        }
        task.tags = Some(tags);
        self.store.update_task(&task).await?;

        Ok(created)
    }

    /// Create the tag if it is new, then attach it to the note.
    pub async fn assign_to_note(
        &self,
        note_id: Uuid,
        name: String,
        color: Option<String>,
    ) -> Result<Option<TagResponse>, ServiceError> {
        let created = self.ensure_tag(&name, color).await?;

        let mut note = self
            .store
            .find_resource(ResourceKind::Note, note_id)
            .await?
            .ok_or(ServiceError::NotFound("Note"))?;

        if !note.tags.contains(&name) {
            note.tags.push(name);
        }
        self.store
            .update_resource(ResourceKind::Note, &note, GrantsAction::Keep)
            .await?;

        Ok(created)
    }

    pub async fn update_color(
        &self,
        name: &str,
        color: &str,
    ) -> Result<TagResponse, ServiceError> {
        self.store
            .update_tag_color(name, color)
            .await?
            .map(TagResponse::from)
            .ok_or(ServiceError::NotFound("Tag"))
    }

    pub async fn reorder(&self, items: &[TagReorderItem]) -> Result<(), ServiceError> {
        for item in items {
            self.store
                .set_tag_order(&item.name, item.order_position)
                .await?;
        }
        Ok(())
    }

    /// Delete the tag and strip it from every task.
    pub async fn delete(&self, name: &str) -> Result<(), ServiceError> {
        self.store.delete_tag(name).await
    }

    async fn ensure_tag(
        &self,
        name: &str,
        color: Option<String>,
    ) -> Result<Option<TagResponse>, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("Name cannot be empty.".to_string()));
        }
        if self.store.find_tag(name).await?.is_some() {
            return Ok(None);
        }

        let tag = Tag::new(
            name.to_string(),
            color,
            self.store.next_tag_order().await?,
        );
        self.store.insert_tag(&tag).await?;
        Ok(Some(TagResponse::from(tag)))
    }
}
