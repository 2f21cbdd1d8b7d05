//! Privacy state machine and authorization gate.
//!
//! Every read of a guarded resource goes through [`compute_access`]; every
//! edit/delete goes through [`authorize_edit`] before any state is touched,
//! and privacy changes go through [`transition`], which yields the next state
//! together with the ledger action the store must apply atomically.

use uuid::Uuid;

use crate::models::{PrivacyLevel, PrivacyState, ResourceKind};
use crate::services::error::ServiceError;
use crate::services::store::GrantsAction;
use crate::utils::{hash_password, verify_password, Password};

/// Privacy-relevant fields of an update request.
#[derive(Debug)]
pub struct PrivacyRequest<'a> {
    pub target: PrivacyLevel,
    pub new_password: Option<&'a str>,
    pub acting_user: Option<Uuid>,
}

/// Outcome of a privacy transition.
#[derive(Debug)]
pub struct Transition {
    pub next: PrivacyState,
    pub grants: GrantsAction,
}

/// Gate an edit or delete of a resource in its *current* state.
///
/// A personal resource is editable only by its owner; a private resource
/// demands the current password up front. Nothing may be mutated before this
/// passes.
pub fn authorize_edit(
    kind: ResourceKind,
    current: &PrivacyState,
    current_password: Option<&str>,
    acting_user: Option<Uuid>,
) -> Result<(), ServiceError> {
    match current {
        PrivacyState::Public => Ok(()),
        PrivacyState::Personal { owner_id } => {
            if acting_user == Some(*owner_id) {
                Ok(())
            } else {
                Err(ServiceError::PermissionDenied)
            }
        }
        PrivacyState::Private { password_hash } => {
            let supplied = current_password.filter(|p| !p.is_empty()).ok_or_else(|| {
                ServiceError::Validation(format!(
                    "Current password is required to edit a private {}.",
                    kind.label()
                ))
            })?;
            if verify_password(&Password::new(supplied.to_string()), password_hash) {
                Ok(())
            } else {
                Err(ServiceError::IncorrectCurrentPassword)
            }
        }
    }
}

/// Compute the next privacy state and the matching ledger action.
///
/// Assumes [`authorize_edit`] already passed for the current state.
pub fn transition(
    kind: ResourceKind,
    current: &PrivacyState,
    request: &PrivacyRequest<'_>,
) -> Result<Transition, ServiceError> {
    let was_private = matches!(current, PrivacyState::Private { .. });

    match request.target {
        PrivacyLevel::Private => match request.new_password.filter(|p| !p.is_empty()) {
            Some(plaintext) => {
                // New or rotated password: every existing grant is cut off and
                // only the acting user (if any) is re-granted.
                let password_hash = hash_password(&Password::new(plaintext.to_string()))
                    .map_err(ServiceError::Internal)?
                    .into_string();
                Ok(Transition {
                    next: PrivacyState::Private { password_hash },
                    grants: GrantsAction::ResetTo(request.acting_user),
                })
            }
            None if was_private => {
                // Metadata-only update: existing password and ledger stand.
                Ok(Transition {
                    next: current.clone(),
                    grants: GrantsAction::Keep,
                })
            }
            None => Err(ServiceError::Validation(format!(
                "A password is required to make a {} private.",
                kind.label()
            ))),
        },
        PrivacyLevel::Public => Ok(Transition {
            next: PrivacyState::Public,
            grants: if was_private {
                GrantsAction::ResetTo(None)
            } else {
                GrantsAction::Keep
            },
        }),
        PrivacyLevel::Personal => {
            let owner_id = request.acting_user.ok_or_else(|| {
                ServiceError::Validation(format!(
                    "You must be signed in to make a {} personal.",
                    kind.label()
                ))
            })?;
            Ok(Transition {
                next: PrivacyState::Personal { owner_id },
                grants: if was_private {
                    GrantsAction::ResetTo(None)
                } else {
                    GrantsAction::Keep
                },
            })
        }
    }
}

/// The authorization gate: may `user_id` read this resource?
///
/// Private access is purely ledger-based; there is no owner concept for
/// private resources, so even the creator needs a grant.
pub fn compute_access(privacy: &PrivacyState, user_id: Option<Uuid>, has_grant: bool) -> bool {
    match privacy {
        PrivacyState::Public => true,
        PrivacyState::Private { .. } => has_grant,
        PrivacyState::Personal { owner_id } => user_id == Some(*owner_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_state(plaintext: &str) -> PrivacyState {
        PrivacyState::Private {
            password_hash: hash_password(&Password::new(plaintext.to_string()))
                .unwrap()
                .into_string(),
        }
    }

    #[test]
    fn public_edits_need_no_secret() {
        assert!(authorize_edit(ResourceKind::List, &PrivacyState::Public, None, None).is_ok());
    }

    #[test]
    fn personal_edits_are_owner_only() {
        let owner = Uuid::new_v4();
        let state = PrivacyState::Personal { owner_id: owner };

        assert!(authorize_edit(ResourceKind::List, &state, None, Some(owner)).is_ok());
        assert!(matches!(
            authorize_edit(ResourceKind::List, &state, None, Some(Uuid::new_v4())),
            Err(ServiceError::PermissionDenied)
        ));
        assert!(matches!(
            authorize_edit(ResourceKind::List, &state, None, None),
            Err(ServiceError::PermissionDenied)
        ));
    }

    #[test]
    fn private_edits_demand_the_current_password() {
        let state = private_state("abc123");

        assert!(matches!(
            authorize_edit(ResourceKind::List, &state, None, None),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            authorize_edit(ResourceKind::List, &state, Some("wrong"), None),
            Err(ServiceError::IncorrectCurrentPassword)
        ));
        assert!(authorize_edit(ResourceKind::List, &state, Some("abc123"), None).is_ok());
    }

    #[test]
    fn becoming_private_requires_a_password() {
        let request = PrivacyRequest {
            target: PrivacyLevel::Private,
            new_password: None,
            acting_user: Some(Uuid::new_v4()),
        };
        assert!(matches!(
            transition(ResourceKind::List, &PrivacyState::Public, &request),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn staying_private_without_new_password_keeps_hash_and_ledger() {
        let state = private_state("abc123");
        let request = PrivacyRequest {
            target: PrivacyLevel::Private,
            new_password: None,
            acting_user: Some(Uuid::new_v4()),
        };

        let t = transition(ResourceKind::List, &state, &request).unwrap();
        assert_eq!(t.next, state);
        assert_eq!(t.grants, GrantsAction::Keep);
    }

    #[test]
    fn rotation_resets_the_ledger_to_the_actor() {
        let state = private_state("abc123");
        let actor = Uuid::new_v4();
        let request = PrivacyRequest {
            target: PrivacyLevel::Private,
            new_password: Some("xyz789"),
            acting_user: Some(actor),
        };

        let t = transition(ResourceKind::List, &state, &request).unwrap();
        assert_eq!(t.grants, GrantsAction::ResetTo(Some(actor)));
        let hash = t.next.password_hash().unwrap();
        assert!(verify_password(&Password::new("xyz789".into()), hash));
        assert!(!verify_password(&Password::new("abc123".into()), hash));
    }

    #[test]
    fn leaving_private_clears_hash_and_revokes_everyone() {
        let state = private_state("abc123");
        let request = PrivacyRequest {
            target: PrivacyLevel::Public,
            new_password: None,
            acting_user: Some(Uuid::new_v4()),
        };

        let t = transition(ResourceKind::List, &state, &request).unwrap();
        assert_eq!(t.next, PrivacyState::Public);
        assert_eq!(t.grants, GrantsAction::ResetTo(None));
    }

    #[test]
    fn becoming_personal_takes_the_actor_as_owner() {
        let actor = Uuid::new_v4();
        let request = PrivacyRequest {
            target: PrivacyLevel::Personal,
            new_password: None,
            acting_user: Some(actor),
        };

        let t = transition(ResourceKind::Note, &PrivacyState::Public, &request).unwrap();
        assert_eq!(t.next, PrivacyState::Personal { owner_id: actor });
        assert_eq!(t.grants, GrantsAction::Keep);

        // anonymous callers cannot claim ownership
        let anonymous = PrivacyRequest {
            target: PrivacyLevel::Personal,
            new_password: None,
            acting_user: None,
        };
        assert!(matches!(
            transition(ResourceKind::Note, &PrivacyState::Public, &anonymous),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn leaving_personal_clears_the_owner() {
        let owner = Uuid::new_v4();
        let state = PrivacyState::Personal { owner_id: owner };
        let request = PrivacyRequest {
            target: PrivacyLevel::Public,
            new_password: None,
            acting_user: Some(owner),
        };

        let t = transition(ResourceKind::List, &state, &request).unwrap();
        assert_eq!(t.next, PrivacyState::Public);
        assert_eq!(t.next.owner_id(), None);
    }

    #[test]
    fn personal_to_private_swaps_owner_for_hash() {
        let owner = Uuid::new_v4();
        let state = PrivacyState::Personal { owner_id: owner };
        let request = PrivacyRequest {
            target: PrivacyLevel::Private,
            new_password: Some("abc123"),
            acting_user: Some(owner),
        };

        let t = transition(ResourceKind::List, &state, &request).unwrap();
        assert_eq!(t.next.owner_id(), None);
        assert!(t.next.password_hash().is_some());
        assert_eq!(t.grants, GrantsAction::ResetTo(Some(owner)));
    }

    #[test]
    fn access_rules() {
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(compute_access(&PrivacyState::Public, None, false));
        assert!(compute_access(&PrivacyState::Public, Some(user), false));

        let private = private_state("pw");
        assert!(!compute_access(&private, Some(user), false));
        assert!(compute_access(&private, Some(user), true));
        assert!(!compute_access(&private, None, false));

        let personal = PrivacyState::Personal { owner_id: user };
        assert!(compute_access(&personal, Some(user), false));
        assert!(!compute_access(&personal, Some(other), true));
        assert!(!compute_access(&personal, None, false));
    }
}
