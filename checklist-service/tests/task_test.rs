//! Tasks, preset tasks and tags, including the list-gated task surfaces.

mod common;

use checklist_service::dtos::tasks::{
    CreatePresetTaskRequest, CreateTaskRequest, UpdatePresetTaskRequest, UpdateTaskRequest,
};
use checklist_service::models::PrivacyLevel;
use checklist_service::services::{CompletedScope, ServiceError};
use common::{create_req, register_user, test_state};

fn new_task(name: &str, list_id: Option<uuid::Uuid>) -> CreateTaskRequest {
    CreateTaskRequest {
        name: name.to_string(),
        list_id,
    }
}

#[tokio::test]
async fn task_view_follows_list_access() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    let open = state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    let secret = state
        .lists
        .create(create_req(
            "Secrets",
            PrivacyLevel::Private,
            Some("abc123"),
            Some(u1),
        ))
        .await
        .unwrap();

    state
        .task_service
        .create(new_task("inbox task", None))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("open task", Some(open.id)))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("secret task", Some(secret.id)))
        .await
        .unwrap();

    // u1 (grant holder) sees everything
    let for_u1 = state.task_service.list_for_user(Some(u1)).await.unwrap();
    assert_eq!(for_u1.len(), 3);

    // u2 sees the inbox and the public list only
    let for_u2 = state.task_service.list_for_user(Some(u2)).await.unwrap();
    let names: Vec<&str> = for_u2.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert!(!names.contains(&"secret task"));

    // unlocking brings the hidden task into view
    state
        .lists
        .verify_password(secret.id, "abc123", Some(u2))
        .await
        .unwrap();
    let for_u2 = state.task_service.list_for_user(Some(u2)).await.unwrap();
    assert_eq!(for_u2.len(), 3);
}

#[tokio::test]
async fn assignment_is_gated_by_list_privacy() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    let personal = state
        .lists
        .create(create_req("Mine", PrivacyLevel::Personal, None, Some(u1)))
        .await
        .unwrap();
    let task = state
        .task_service
        .create(new_task("chore", Some(personal.id)))
        .await
        .unwrap();

    // only the owner may hold tasks of a personal list
    let err = state
        .task_service
        .update(
            task.id,
            UpdateTaskRequest {
                assignee_id: Some(Some(u2)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let updated = state
        .task_service
        .update(
            task.id,
            UpdateTaskRequest {
                assignee_id: Some(Some(u1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.assignee.unwrap().username, "alice");

    // private lists demand a grant
    let secret = state
        .lists
        .create(create_req(
            "Secrets",
            PrivacyLevel::Private,
            Some("abc123"),
            Some(u1),
        ))
        .await
        .unwrap();
    let secret_task = state
        .task_service
        .create(new_task("hidden chore", Some(secret.id)))
        .await
        .unwrap();

    let err = state
        .task_service
        .update(
            secret_task.id,
            UpdateTaskRequest {
                assignee_id: Some(Some(u2)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    state
        .lists
        .verify_password(secret.id, "abc123", Some(u2))
        .await
        .unwrap();
    assert!(state
        .task_service
        .update(
            secret_task.id,
            UpdateTaskRequest {
                assignee_id: Some(Some(u2)),
                ..Default::default()
            },
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn users_with_access_mirror_the_gate() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    let open = state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    assert_eq!(state.lists.users_with_access(open.id).await.unwrap().len(), 2);

    let personal = state
        .lists
        .create(create_req("Mine", PrivacyLevel::Personal, None, Some(u1)))
        .await
        .unwrap();
    let owners = state.lists.users_with_access(personal.id).await.unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0].username, "alice");

    let secret = state
        .lists
        .create(create_req(
            "Secrets",
            PrivacyLevel::Private,
            Some("abc123"),
            Some(u1),
        ))
        .await
        .unwrap();
    let holders = state.lists.users_with_access(secret.id).await.unwrap();
    assert_eq!(holders.len(), 1);

    state
        .lists
        .verify_password(secret.id, "abc123", Some(u2))
        .await
        .unwrap();
    assert_eq!(state.lists.users_with_access(secret.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn moving_a_task_places_it_last_in_the_target() {
    let state = test_state();

    let list = state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("first", Some(list.id)))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("second", Some(list.id)))
        .await
        .unwrap();
    let loose = state
        .task_service
        .create(new_task("from inbox", None))
        .await
        .unwrap();

    state
        .task_service
        .move_to_list(loose.id, Some(list.id))
        .await
        .unwrap();

    let in_list = state.task_service.list_in_list(Some(list.id)).await.unwrap();
    assert_eq!(in_list.len(), 3);
    assert_eq!(in_list.last().unwrap().name, "from inbox");
    assert!(state
        .task_service
        .list_in_list(None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn delete_completed_respects_scope() {
    let state = test_state();

    let list = state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    let done_in_list = state
        .task_service
        .create(new_task("done in list", Some(list.id)))
        .await
        .unwrap();
    let done_in_inbox = state
        .task_service
        .create(new_task("done in inbox", None))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("open in inbox", None))
        .await
        .unwrap();

    for id in [done_in_list.id, done_in_inbox.id] {
        state
            .task_service
            .update(
                id,
                UpdateTaskRequest {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    state
        .task_service
        .delete_completed(CompletedScope::Inbox)
        .await
        .unwrap();
    assert_eq!(state.task_service.list_in_list(None).await.unwrap().len(), 1);
    assert_eq!(
        state
            .task_service
            .list_in_list(Some(list.id))
            .await
            .unwrap()
            .len(),
        1
    );

    state
        .task_service
        .delete_completed(CompletedScope::All)
        .await
        .unwrap();
    assert!(state
        .task_service
        .list_in_list(Some(list.id))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn preset_tasks_round_trip_and_reset() {
    let state = test_state();

    let preset = state
        .presets
        .create(create_req("Morning", PrivacyLevel::Public, None, None))
        .await
        .unwrap();

    let coffee = state
        .task_service
        .create_preset_task(
            preset.id,
            CreatePresetTaskRequest {
                task_name: "coffee".to_string(),
            },
        )
        .await
        .unwrap();
    state
        .task_service
        .create_preset_task(
            preset.id,
            CreatePresetTaskRequest {
                task_name: "stretch".to_string(),
            },
        )
        .await
        .unwrap();

    state
        .task_service
        .update_preset_task(
            coffee.id,
            UpdatePresetTaskRequest {
                done: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let tasks = state.task_service.list_preset_tasks(preset.id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().any(|t| t.done));

    // reset unchecks everything
    state
        .task_service
        .reset_preset_tasks(preset.id)
        .await
        .unwrap();
    let tasks = state.task_service.list_preset_tasks(preset.id).await.unwrap();
    assert!(tasks.iter().all(|t| !t.done));

    // adding to a missing preset fails
    let err = state
        .task_service
        .create_preset_task(
            uuid::Uuid::new_v4(),
            CreatePresetTaskRequest {
                task_name: "ghost".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn deleting_a_tag_strips_it_from_tasks() {
    let state = test_state();

    let task = state
        .task_service
        .create(new_task("chore", None))
        .await
        .unwrap();

    // create-and-assign mints the tag once
    let created = state
        .tag_service
        .assign_to_task(task.id, "errands".to_string(), Some("#10b981".to_string()))
        .await
        .unwrap();
    assert!(created.is_some());
    let again = state
        .tag_service
        .assign_to_task(task.id, "errands".to_string(), None)
        .await
        .unwrap();
    assert!(again.is_none());

    let tagged = state.task_service.list_in_list(None).await.unwrap();
    assert_eq!(tagged[0].tags, vec!["errands".to_string()]);

    state.tag_service.delete("errands").await.unwrap();

    let stripped = state.task_service.list_in_list(None).await.unwrap();
    assert!(stripped[0].tags.is_empty());
    assert!(state.tag_service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_list_cascades_to_its_tasks() {
    let state = test_state();

    let list = state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    state
        .task_service
        .create(new_task("doomed", Some(list.id)))
        .await
        .unwrap();

    state.lists.delete(list.id, None, None).await.unwrap();
    assert!(state
        .task_service
        .list_in_list(Some(list.id))
        .await
        .unwrap()
        .is_empty());
}
