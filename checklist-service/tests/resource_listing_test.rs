//! Read-path filtering: what each caller sees, with and without hide_locked.

mod common;

use checklist_service::models::PrivacyLevel;
use checklist_service::services::ServiceError;
use common::{create_req, register_user, test_state, update_req};

#[tokio::test]
async fn listing_reflects_caller_access() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    state
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
        .lists
        .create(create_req("Mine", PrivacyLevel::Personal, None, Some(u1)))
        .await
        .unwrap();

    // creator sees all three, with access everywhere
    let for_u1 = state.lists.list(Some(u1), false).await.unwrap();
    assert_eq!(for_u1.len(), 3);
    assert!(for_u1.iter().all(|l| l.has_access));

    // another user sees the private list locked and no personal list at all
    let for_u2 = state.lists.list(Some(u2), false).await.unwrap();
    assert_eq!(for_u2.len(), 2);
    let secrets = for_u2.iter().find(|l| l.name == "Secrets").unwrap();
    assert!(!secrets.has_access);
    assert!(!for_u2.iter().any(|l| l.name == "Mine"));

    // hide_locked drops what the caller has not unlocked
    let hidden = state.lists.list(Some(u2), true).await.unwrap();
    assert_eq!(hidden.len(), 1);
    assert_eq!(hidden[0].name, "Open");
}

#[tokio::test]
async fn anonymous_listing_excludes_personal_entirely() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;

    state
        .lists
        .create(create_req("Open", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    state
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
        .lists
        .create(create_req("Mine", PrivacyLevel::Personal, None, Some(u1)))
        .await
        .unwrap();

    // anonymous callers see public + locked private, never personal
    let anon = state.lists.list(None, false).await.unwrap();
    assert_eq!(anon.len(), 2);
    assert!(!anon.iter().any(|l| l.name == "Mine"));
    assert!(!anon.iter().find(|l| l.name == "Secrets").unwrap().has_access);

    let anon_hidden = state.lists.list(None, true).await.unwrap();
    assert_eq!(anon_hidden.len(), 1);
    assert_eq!(anon_hidden[0].name, "Open");
}

#[tokio::test]
async fn listings_are_ordered_and_reorderable() {
    let state = test_state();

    let a = state
        .lists
        .create(create_req("A", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    let b = state
        .lists
        .create(create_req("B", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    let c = state
        .lists
        .create(create_req("C", PrivacyLevel::Public, None, None))
        .await
        .unwrap();

    // creation order assigns increasing positions
    assert_eq!((a.order_position, b.order_position, c.order_position), (0, 1, 2));

    state
        .lists
        .reorder(
            &[
                checklist_service::dtos::resources::ReorderItem {
                    id: c.id,
                    order_position: 0,
                },
                checklist_service::dtos::resources::ReorderItem {
                    id: a.id,
                    order_position: 1,
                },
                checklist_service::dtos::resources::ReorderItem {
                    id: b.id,
                    order_position: 2,
                },
            ],
            None,
        )
        .await
        .unwrap();

    let names: Vec<String> = state
        .lists
        .list(None, false)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[tokio::test]
async fn reordering_guarded_resources_needs_access() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    let personal = state
        .lists
        .create(create_req("Mine", PrivacyLevel::Personal, None, Some(u1)))
        .await
        .unwrap();

    let err = state
        .lists
        .reorder(
            &[checklist_service::dtos::resources::ReorderItem {
                id: personal.id,
                order_position: 5,
            }],
            Some(u2),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::PermissionDenied));

    // position untouched
    let stored = state
        .store
        .find_resource(checklist_service::models::ResourceKind::List, personal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.order_position, 0);
}

#[tokio::test]
async fn duplicate_list_names_are_rejected_but_note_names_are_not() {
    let state = test_state();

    state
        .lists
        .create(create_req("Groceries", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    let err = state
        .lists
        .create(create_req("Groceries", PrivacyLevel::Public, None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    state
        .notes
        .create(create_req("Scratch", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
    state
        .notes
        .create(create_req("Scratch", PrivacyLevel::Public, None, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn locked_note_bodies_are_redacted() {
    let state = test_state();
    let u1 = register_user(&state, "alice").await;
    let u2 = register_user(&state, "bob").await;

    let mut req = create_req("Journal", PrivacyLevel::Private, Some("abc123"), Some(u1));
    req.content = Some("today I planted tomatoes".to_string());
    let note = state.notes.create(req).await.unwrap();
    assert_eq!(note.content.as_deref(), Some("today I planted tomatoes"));

    let for_u2 = state.notes.list(Some(u2), false).await.unwrap();
    let locked = for_u2.iter().find(|n| n.id == note.id).unwrap();
    assert!(!locked.has_access);
    assert!(locked.content.is_none());

    state
        .notes
        .verify_password(note.id, "abc123", Some(u2))
        .await
        .unwrap();
    let for_u2 = state.notes.list(Some(u2), false).await.unwrap();
    let unlocked = for_u2.iter().find(|n| n.id == note.id).unwrap();
    assert_eq!(unlocked.content.as_deref(), Some("today I planted tomatoes"));
}

#[tokio::test]
async fn updating_a_missing_resource_reports_not_found() {
    let state = test_state();

    let err = state
        .lists
        .update(
            uuid::Uuid::new_v4(),
            update_req("Ghost", PrivacyLevel::Public, None, None, None),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
