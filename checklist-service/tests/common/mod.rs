//! Test helpers: an AppState wired to the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use checklist_service::config::{DatabaseConfig, Environment, SecurityConfig, ServiceConfig};
use checklist_service::dtos::auth::RegisterRequest;
use checklist_service::dtos::resources::{CreateResourceRequest, UpdateResourceRequest};
use checklist_service::models::PrivacyLevel;
use checklist_service::services::{MemoryStore, Store};
use checklist_service::AppState;
use uuid::Uuid;

pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        common: service_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "checklist-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub fn test_state() -> AppState {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    AppState::new(test_config(), store)
}

/// Register an account and return its id.
pub async fn register_user(state: &AppState, username: &str) -> Uuid {
    state
        .auth_service
        .register(RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "hunter22".to_string(),
        })
        .await
        .expect("registration failed");

    state
        .store
        .find_user_by_username(username)
        .await
        .unwrap()
        .expect("registered user missing")
        .id
}

pub fn create_req(
    name: &str,
    privacy: PrivacyLevel,
    password: Option<&str>,
    user_id: Option<Uuid>,
) -> CreateResourceRequest {
    CreateResourceRequest {
        name: name.to_string(),
        color: Some("#f59e0b".to_string()),
        privacy,
        password: password.map(str::to_string),
        content: None,
        user_id,
    }
}

pub fn update_req(
    name: &str,
    privacy: PrivacyLevel,
    current_password: Option<&str>,
    new_password: Option<&str>,
    user_id: Option<Uuid>,
) -> UpdateResourceRequest {
    UpdateResourceRequest {
        name: name.to_string(),
        color: Some("#f59e0b".to_string()),
        privacy,
        current_password: current_password.map(str::to_string),
        new_password: new_password.map(str::to_string),
        content: None,
        tags: None,
        user_id,
    }
}
