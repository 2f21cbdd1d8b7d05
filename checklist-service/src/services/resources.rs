//! Generic service for the three privacy-guarded resource kinds.
//!
//! Lists, presets and notes run the exact same privacy mechanics; one service
//! is instantiated per kind with its own tables behind the [`Store`] seam.
//! Every mutation re-derives the stored privacy state before applying the
//! guards; nothing trusts a client-supplied "already unlocked" claim.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dtos::resources::{
    CreateResourceRequest, ReorderItem, ResourceResponse, UpdateResourceRequest,
};
use crate::models::{PrivacyLevel, PrivacyState, Resource, ResourceKind, UserResponse};
use crate::services::error::ServiceError;
use crate::services::privacy::{self, PrivacyRequest};
use crate::services::store::{GrantsAction, Store};
use crate::utils::{hash_password, verify_password, Password};

#[derive(Clone)]
pub struct ResourceService {
    store: Arc<dyn Store>,
    kind: ResourceKind,
}

impl ResourceService {
    pub fn new(store: Arc<dyn Store>, kind: ResourceKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Read-path listing: public and private resources for everyone, personal
    /// resources only for their owner, `has_access` computed per caller.
    pub async fn list(
        &self,
        user_id: Option<Uuid>,
        hide_locked: bool,
    ) -> Result<Vec<ResourceResponse>, ServiceError> {
        let resources = self.store.list_resources(self.kind).await?;
        let mut out = Vec::with_capacity(resources.len());

        for resource in resources {
            if let PrivacyState::Personal { owner_id } = &resource.privacy {
                // personal resources are invisible to everyone else,
                // not even shown locked
                if user_id != Some(*owner_id) {
                    continue;
                }
            }

            let has_access = self.access_for(&resource, user_id).await?;
            if hide_locked && !has_access {
                continue;
            }
            out.push(ResourceResponse::from_resource(
                self.kind, resource, has_access,
            ));
        }

        Ok(out)
    }

    pub async fn create(
        &self,
        req: CreateResourceRequest,
    ) -> Result<ResourceResponse, ServiceError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name cannot be empty.".to_string()));
        }

        if self.kind.unique_names()
            && self
                .store
                .find_resource_by_name(self.kind, &name)
                .await?
                .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "A {} with this name already exists.",
                self.kind.label()
            )));
        }

        let privacy = match req.privacy {
            PrivacyLevel::Public => PrivacyState::Public,
            PrivacyLevel::Private => {
                let password = req
                    .password
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        ServiceError::Validation(format!(
                            "A password is required to create a private {}.",
                            self.kind.label()
                        ))
                    })?;
                PrivacyState::Private {
                    password_hash: hash_password(&Password::new(password.to_string()))
                        .map_err(ServiceError::Internal)?
                        .into_string(),
                }
            }
            PrivacyLevel::Personal => {
                let owner_id = req.user_id.ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "You must be signed in to create a personal {}.",
                        self.kind.label()
                    ))
                })?;
                PrivacyState::Personal { owner_id }
            }
        };

        let resource = Resource {
            id: Uuid::new_v4(),
            name,
            color: req.color,
            content: if self.kind.has_body() {
                Some(req.content.unwrap_or_default())
            } else {
                None
            },
            tags: Vec::new(),
            created_at: Utc::now(),
            order_position: self.store.next_order_position(self.kind).await?,
            privacy,
        };

        self.store.insert_resource(self.kind, &resource).await?;

        // the creator of a private resource is never locked out of it
        if matches!(resource.privacy, PrivacyState::Private { .. }) {
            if let Some(user_id) = req.user_id {
                self.store
                    .grant_access(self.kind, user_id, resource.id)
                    .await?;
            }
        }

        tracing::info!(
            kind = self.kind.label(),
            resource_id = %resource.id,
            privacy = resource.privacy.level().as_str(),
            "Resource created"
        );

        let has_access = self.access_for(&resource, req.user_id).await?;
        Ok(ResourceResponse::from_resource(
            self.kind, resource, has_access,
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateResourceRequest,
    ) -> Result<ResourceResponse, ServiceError> {
        let current = self
            .store
            .find_resource(self.kind, id)
            .await?
            .ok_or(ServiceError::NotFound(self.kind.title()))?;

        // both guards run against the *stored* state before anything mutates
        privacy::authorize_edit(
            self.kind,
            &current.privacy,
            req.current_password.as_deref(),
            req.user_id,
        )?;

        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name cannot be empty.".to_string()));
        }

        if self.kind.unique_names() && name != current.name {
            if let Some(existing) = self.store.find_resource_by_name(self.kind, &name).await? {
                if existing.id != id {
                    return Err(ServiceError::Conflict(format!(
                        "A {} with this name already exists.",
                        self.kind.label()
                    )));
                }
            }
        }

        let transition = privacy::transition(
            self.kind,
            &current.privacy,
            &PrivacyRequest {
                target: req.privacy,
                new_password: req.new_password.as_deref(),
                acting_user: req.user_id,
            },
        )?;

        let updated = Resource {
            id,
            name,
            color: req.color,
            content: if self.kind.has_body() {
                req.content.or(current.content)
            } else {
                None
            },
            tags: if self.kind.has_body() {
                req.tags.unwrap_or(current.tags)
            } else {
                Vec::new()
            },
            created_at: current.created_at,
            order_position: current.order_position,
            privacy: transition.next,
        };

        self.store
            .update_resource(self.kind, &updated, transition.grants)
            .await?;

        if transition.grants != GrantsAction::Keep {
            tracing::info!(
                kind = self.kind.label(),
                resource_id = %id,
                "Access ledger reset"
            );
        }

        let has_access = self.access_for(&updated, req.user_id).await?;
        Ok(ResourceResponse::from_resource(
            self.kind, updated, has_access,
        ))
    }

    /// Delete after re-checking the stored guards. A missing resource answers
    /// exactly like a wrong password, so the call cannot be used to probe for
    /// existence.
    pub async fn delete(
        &self,
        id: Uuid,
        password: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let Some(current) = self.store.find_resource(self.kind, id).await? else {
            return Err(ServiceError::InvalidCredential);
        };

        match &current.privacy {
            PrivacyState::Public => {}
            PrivacyState::Personal { owner_id } => {
                if user_id != Some(*owner_id) {
                    return Err(ServiceError::PermissionDenied);
                }
            }
            PrivacyState::Private { password_hash } => {
                let supplied = password.filter(|p| !p.is_empty()).ok_or_else(|| {
                    ServiceError::Validation(format!(
                        "A password is required to delete a private {}.",
                        self.kind.label()
                    ))
                })?;
                if !verify_password(&Password::new(supplied.to_string()), password_hash) {
                    return Err(ServiceError::InvalidCredential);
                }
            }
        }

        self.store.delete_resource(self.kind, id).await?;
        tracing::info!(kind = self.kind.label(), resource_id = %id, "Resource deleted");
        Ok(())
    }

    /// Unlock attempt. Public and personal resources succeed trivially; a
    /// correct password on a private resource records a durable grant for the
    /// caller. Missing resources and wrong passwords are indistinguishable.
    pub async fn verify_password(
        &self,
        id: Uuid,
        password: &str,
        user_id: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        if password.is_empty() {
            return Ok(false);
        }

        let Some(resource) = self.store.find_resource(self.kind, id).await? else {
            return Ok(false);
        };

        match &resource.privacy {
            PrivacyState::Private { password_hash } => {
                let ok = verify_password(&Password::new(password.to_string()), password_hash);
                if ok {
                    if let Some(user_id) = user_id {
                        self.store.grant_access(self.kind, user_id, id).await?;
                        tracing::info!(
                            kind = self.kind.label(),
                            resource_id = %id,
                            user_id = %user_id,
                            "Unlock granted"
                        );
                    }
                } else {
                    tracing::warn!(kind = self.kind.label(), resource_id = %id, "Unlock failed");
                }
                Ok(ok)
            }
            _ => Ok(true),
        }
    }

    /// Kick everyone else out without changing the password: drop every grant,
    /// then re-grant only the acting user. Requires the actor to currently
    /// hold access.
    pub async fn revoke_all(&self, id: Uuid, user_id: Option<Uuid>) -> Result<(), ServiceError> {
        let user_id = user_id.ok_or(ServiceError::Unauthenticated)?;

        let resource = self
            .store
            .find_resource(self.kind, id)
            .await?
            .ok_or(ServiceError::NotFound(self.kind.title()))?;

        match &resource.privacy {
            PrivacyState::Personal { owner_id } => {
                if *owner_id != user_id {
                    return Err(ServiceError::PermissionDenied);
                }
            }
            PrivacyState::Private { .. } => {
                if !self.store.has_grant(self.kind, user_id, id).await? {
                    return Err(ServiceError::PermissionDenied);
                }
            }
            PrivacyState::Public => {}
        }

        self.store
            .replace_grants(self.kind, id, Some(user_id))
            .await?;
        tracing::info!(kind = self.kind.label(), resource_id = %id, "All access revoked");
        Ok(())
    }

    /// Persist a new display order. Order is not access-relevant, so no
    /// password is demanded, but personal resources stay owner-only and
    /// private ones require a current grant.
    pub async fn reorder(
        &self,
        items: &[ReorderItem],
        user_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        // validate the whole batch before writing anything
        for item in items {
            let Some(resource) = self.store.find_resource(self.kind, item.id).await? else {
                continue;
            };
            let allowed = match &resource.privacy {
                PrivacyState::Public => true,
                PrivacyState::Personal { owner_id } => user_id == Some(*owner_id),
                PrivacyState::Private { .. } => match user_id {
                    Some(user_id) => self.store.has_grant(self.kind, user_id, item.id).await?,
                    None => false,
                },
            };
            if !allowed {
                return Err(ServiceError::PermissionDenied);
            }
        }

        for item in items {
            self.store
                .set_resource_order(self.kind, item.id, item.order_position)
                .await?;
        }
        Ok(())
    }

    /// Users who may appear inside the resource (e.g. as task assignees):
    /// everyone for public, the owner for personal, grant holders for private.
    pub async fn users_with_access(&self, id: Uuid) -> Result<Vec<UserResponse>, ServiceError> {
        let Some(resource) = self.store.find_resource(self.kind, id).await? else {
            return Ok(Vec::new());
        };

        match &resource.privacy {
            PrivacyState::Public => Ok(self
                .store
                .list_users()
                .await?
                .iter()
                .map(|u| u.sanitized())
                .collect()),
            PrivacyState::Personal { owner_id } => Ok(self
                .store
                .find_user_by_id(*owner_id)
                .await?
                .iter()
                .map(|u| u.sanitized())
                .collect()),
            PrivacyState::Private { .. } => {
                let mut users = Vec::new();
                for user_id in self.store.granted_user_ids(self.kind, id).await? {
                    if let Some(user) = self.store.find_user_by_id(user_id).await? {
                        users.push(user.sanitized());
                    }
                }
                users.sort_by(|a, b| a.username.cmp(&b.username));
                Ok(users)
            }
        }
    }

    async fn access_for(
        &self,
        resource: &Resource,
        user_id: Option<Uuid>,
    ) -> Result<bool, ServiceError> {
        let has_grant = match (&resource.privacy, user_id) {
            (PrivacyState::Private { .. }, Some(user_id)) => {
                self.store.has_grant(self.kind, user_id, resource.id).await?
            }
            _ => false,
        };
        Ok(privacy::compute_access(&resource.privacy, user_id, has_grant))
    }
}
