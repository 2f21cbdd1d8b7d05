//! Account flows: registration, login, password change, settings and the
//! temp-token exchange.

mod common;

use checklist_service::dtos::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use checklist_service::services::ServiceError;
use common::{register_user, test_state};
use serde_json::json;

#[tokio::test]
async fn register_then_login_by_email_or_username() {
    let state = test_state();
    register_user(&state, "alice").await;

    let by_email = state
        .auth_service
        .login(LoginRequest {
            identifier: "alice@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(by_email.username, "alice");

    let by_username = state
        .auth_service
        .login(LoginRequest {
            identifier: "alice".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(by_username.id, by_email.id);
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let state = test_state();
    register_user(&state, "alice").await;

    // wrong password and unknown account produce the same error
    let wrong_password = state
        .auth_service
        .login(LoginRequest {
            identifier: "alice".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    let unknown_user = state
        .auth_service
        .login(LoginRequest {
            identifier: "nobody".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn duplicate_email_and_username_get_distinct_conflicts() {
    let state = test_state();
    register_user(&state, "alice").await;

    let email_taken = state
        .auth_service
        .register(RegisterRequest {
            username: "different".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap_err();
    assert!(email_taken.to_string().contains("email"));

    let username_taken = state
        .auth_service
        .register(RegisterRequest {
            username: "alice".to_string(),
            email: "other@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap_err();
    assert!(username_taken.to_string().contains("Username"));
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;

    let err = state
        .auth_service
        .change_password(
            u1,
            ChangePasswordRequest {
                current_password: "nope".to_string(),
                new_password: "newpass1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::IncorrectCurrentPassword));

    state
        .auth_service
        .change_password(
            u1,
            ChangePasswordRequest {
                current_password: "hunter22".to_string(),
                new_password: "newpass1".to_string(),
            },
        )
        .await
        .unwrap();

    // old credential is dead, new one works
    assert!(state
        .auth_service
        .login(LoginRequest {
            identifier: "alice".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .is_err());
    assert!(state
        .auth_service
        .login(LoginRequest {
            identifier: "alice".to_string(),
            password: "newpass1".to_string(),
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn settings_patches_merge_into_stored_document() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;

    let settings = state
        .auth_service
        .update_settings(u1, &json!({ "theme": "dark" }))
        .await
        .unwrap();
    assert_eq!(settings.theme, "dark");
    assert_eq!(settings.language, "pl");

    // a second patch keeps the first one's values
    let settings = state
        .auth_service
        .update_settings(u1, &json!({ "hide_locked": true }))
        .await
        .unwrap();
    assert_eq!(settings.theme, "dark");
    assert!(settings.hide_locked);
}

#[tokio::test]
async fn temp_token_is_single_use() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;

    let token = state
        .auth_service
        .generate_temp_login_token(u1)
        .await
        .unwrap();

    let user = state
        .auth_service
        .login_with_temp_token(&token)
        .await
        .unwrap();
    assert_eq!(user.id, u1);

    // immediately invalidated on use
    let err = state
        .auth_service
        .login_with_temp_token(&token)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TokenInvalid));
}

#[tokio::test]
async fn temp_token_requires_an_existing_user() {
    let state = test_state();

    let err = state
        .auth_service
        .generate_temp_login_token(uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = state
        .auth_service
        .login_with_temp_token("not-a-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::TokenInvalid));
}
