//! Account service: registration, login, password changes, settings and the
//! short-lived login token exchange.

use std::sync::Arc;

use uuid::Uuid;

use crate::dtos::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::models::{merge_settings, User, UserResponse, UserSettings};
use crate::services::error::ServiceError;
use crate::services::store::Store;
use crate::services::tokens::TempTokenStore;
use crate::utils::{hash_password, verify_password, Password};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn Store>,
    tokens: TempTokenStore,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, tokens: TempTokenStore) -> Self {
        Self { store, tokens }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<(), ServiceError> {
        if self.store.find_user_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "User with this email already exists.".to_string(),
            ));
        }
        if self
            .store
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "Username is already taken.".to_string(),
            ));
        }

        let password_hash = hash_password(&Password::new(req.password))
            .map_err(ServiceError::Internal)?
            .into_string();

        let user = User::new(req.username, req.email, password_hash);
        self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(())
    }

    /// Login by email or username. All failures look the same to the caller.
    pub async fn login(&self, req: LoginRequest) -> Result<UserResponse, ServiceError> {
        let user = match self.store.find_user_by_email(&req.identifier).await? {
            Some(user) => Some(user),
            None => self.store.find_user_by_username(&req.identifier).await?,
        };

        let user = user.ok_or(ServiceError::InvalidLogin)?;

        if !verify_password(&Password::new(req.password), &user.password_hash) {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(ServiceError::InvalidLogin);
        }

        Ok(user.sanitized())
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if !verify_password(&Password::new(req.current_password), &user.password_hash) {
            return Err(ServiceError::IncorrectCurrentPassword);
        }

        let new_hash = hash_password(&Password::new(req.new_password))
            .map_err(ServiceError::Internal)?
            .into_string();
        self.store.update_user_password(user_id, &new_hash).await?;

        tracing::info!(user_id = %user_id, "Account password changed");
        Ok(())
    }

    /// Shallow-merge a partial settings document into the stored one.
    pub async fn update_settings(
        &self,
        user_id: Uuid,
        patch: &serde_json::Value,
    ) -> Result<UserSettings, ServiceError> {
        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        let merged = merge_settings(user.settings.as_ref(), Some(patch));
        self.store.update_user_settings(user_id, &merged).await?;

        Ok(UserSettings::merged(Some(&merged)))
    }

    pub async fn generate_temp_login_token(&self, user_id: Uuid) -> Result<String, ServiceError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        Ok(self.tokens.issue(user_id))
    }

    /// Exchange a temp token for the account it was minted for. Single use:
    /// the token dies on first redemption or at its 60 second expiry.
    pub async fn login_with_temp_token(&self, token: &str) -> Result<UserResponse, ServiceError> {
        let user_id = self.tokens.redeem(token).ok_or(ServiceError::TokenInvalid)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        tracing::info!(user_id = %user.id, "Temp token login");
        Ok(user.sanitized())
    }

    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ServiceError> {
        Ok(self
            .store
            .list_users()
            .await?
            .iter()
            .map(|u| u.sanitized())
            .collect())
    }
}
