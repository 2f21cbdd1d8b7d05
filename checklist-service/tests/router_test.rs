//! HTTP-level smoke tests driving the real router.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = checklist_service::build_router(common::test_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn list_lifecycle_over_http() {
    let app = checklist_service::build_router(common::test_state());

    // create
    let response = app
        .clone()
        .oneshot(post_json(
            "/lists",
            json!({ "name": "Groceries", "color": "#f59e0b", "type": "public" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["resource"]["name"], "Groceries");
    assert_eq!(body["resource"]["has_access"], true);
    let id = body["resource"]["id"].as_str().unwrap().to_string();

    // list
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/lists").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // verifying any password against a public list succeeds trivially
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/lists/{id}/verify-password"),
            json!({ "password": "whatever" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn private_failures_surface_as_success_false() {
    let app = checklist_service::build_router(common::test_state());

    // creating a private list without a password is rejected as a failure body
    let response = app
        .clone()
        .oneshot(post_json(
            "/lists",
            json!({ "name": "Secrets", "type": "private" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("password"));

    // deleting something that does not exist fails without an existence hint
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/lists/{}", uuid::Uuid::new_v4()))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "password": "guess" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn register_validation_is_enforced_at_the_boundary() {
    let app = checklist_service::build_router(common::test_state());

    // short username rejected by the validator layer
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "username": "ab", "email": "a@example.com", "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // a valid registration passes and can log in
    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/register",
            json!({ "username": "alice", "email": "alice@example.com", "password": "hunter22" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/auth/login",
            json!({ "identifier": "alice", "password": "hunter22" }),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "alice");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = checklist_service::build_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/.well-known/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"].as_object().is_some());
}
