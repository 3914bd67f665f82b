//! Read-only history walks over a session's event stream.

use super::{ClassSession, ClassSessionError, ClassSessionEvent, Material, SessionUpdated};
use crate::domain::foundation::ClassSessionId;

/// State of the session just before the last event matching `matches`.
///
/// Folds the longest prefix that excludes the last match.
///
/// # Errors
///
/// `NoPriorUpdate` when no event matches.
pub fn state_before_last<F>(
    id: ClassSessionId,
    events: &[ClassSessionEvent],
    matches: F,
) -> Result<ClassSession, ClassSessionError>
where
    F: Fn(&ClassSessionEvent) -> bool,
{
    let boundary = events
        .iter()
        .rposition(matches)
        .ok_or(ClassSessionError::NoPriorUpdate(id))?;
    Ok(ClassSession::replay(id, &events[..boundary]))
}

/// State of the session just before its last content update.
pub fn state_before_last_update(
    id: ClassSessionId,
    events: &[ClassSessionEvent],
) -> Result<ClassSession, ClassSessionError> {
    state_before_last(id, events, ClassSessionEvent::is_content_update)
}

/// How to undo the last content update.
#[derive(Debug, Clone, PartialEq)]
pub struct Revert {
    /// Session as it was just before the update.
    pub prior: ClassSession,
    /// Update restoring the prior value of every field the update set.
    pub restore: SessionUpdated,
}

/// Undo of the last content update.
///
/// Fields the update did not set are left out of `restore`, so changes made
/// since then by other events (a resolved address) survive the undo.
///
/// # Errors
///
/// `NoPriorUpdate` when the history holds no content update.
pub fn revert_last_update(
    id: ClassSessionId,
    events: &[ClassSessionEvent],
) -> Result<Revert, ClassSessionError> {
    let boundary = events
        .iter()
        .rposition(ClassSessionEvent::is_content_update)
        .ok_or(ClassSessionError::NoPriorUpdate(id))?;
    let prior = ClassSession::replay(id, &events[..boundary]);
    let restore = match &events[boundary] {
        ClassSessionEvent::Updated(reverted) => prior.restoring(reverted),
        _ => SessionUpdated::default(),
    };
    Ok(Revert { prior, restore })
}

/// Materials attached before the last content update.
pub fn materials_before_last_update(
    id: ClassSessionId,
    events: &[ClassSessionEvent],
) -> Result<Vec<Material>, ClassSessionError> {
    Ok(state_before_last_update(id, events)?.materials().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::class_session::{
        NewClassSession, SessionUpdated, UpdateStatus, VerificationUpdated,
    };
    use crate::domain::foundation::{ClassId, FileId, Timestamp, UserId};
    use proptest::prelude::*;

    fn created(session_start: Timestamp) -> ClassSession {
        ClassSession::create_new(NewClassSession {
            tutor_id: UserId::new("tutor-1").unwrap(),
            class_id: ClassId::new("class-1").unwrap(),
            title: "A".to_string(),
            description: String::new(),
            start: session_start,
            end: session_start.plus_minutes(45),
            is_online: true,
            address: String::new(),
            ward_id: String::new(),
            location: None,
            materials: Vec::new(),
        })
    }

    fn retitle(title: &str) -> ClassSessionEvent {
        ClassSessionEvent::Updated(SessionUpdated {
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn missing_boundary_is_a_typed_error() {
        let session = created(Timestamp::now());
        let events = session.pending_events().to_vec();

        let result = state_before_last_update(session.id(), &events);

        assert_eq!(result, Err(ClassSessionError::NoPriorUpdate(session.id())));
    }

    #[test]
    fn prefix_excludes_last_update_only() {
        let session = created(Timestamp::now());
        let mut events = session.pending_events().to_vec();
        events.push(retitle("B"));
        events.push(ClassSessionEvent::VerificationUpdated(VerificationUpdated {
            update_status: Some(UpdateStatus::UpdatePending),
            ..Default::default()
        }));
        events.push(retitle("C"));
        events.push(ClassSessionEvent::VerificationUpdated(VerificationUpdated {
            update_status: Some(UpdateStatus::Failed),
            ..Default::default()
        }));

        let before = state_before_last_update(session.id(), &events).unwrap();

        assert_eq!(before.title(), "B");
        assert_eq!(before.update_status(), UpdateStatus::UpdatePending);
    }

    #[test]
    fn materials_before_last_update_reads_prefix() {
        let session = created(Timestamp::now());
        let notes = Material::new(FileId::new("notes").unwrap(), "");
        let mut events = session.pending_events().to_vec();
        events.push(ClassSessionEvent::Updated(SessionUpdated {
            materials: Some(vec![notes.clone()]),
            ..Default::default()
        }));
        events.push(ClassSessionEvent::Updated(SessionUpdated {
            materials: Some(vec![]),
            ..Default::default()
        }));

        let materials = materials_before_last_update(session.id(), &events).unwrap();

        assert_eq!(materials, vec![notes]);
    }

    #[test]
    fn revert_restores_only_what_the_update_set() {
        let session = created(Timestamp::now());
        let mut events = session.pending_events().to_vec();
        events.push(ClassSessionEvent::Updated(SessionUpdated {
            description: Some("first".to_string()),
            ..Default::default()
        }));
        events.push(retitle("B"));

        let revert = revert_last_update(session.id(), &events).unwrap();

        assert_eq!(revert.prior.description(), "first");
        assert_eq!(
            revert.restore,
            SessionUpdated {
                title: Some("A".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn revert_without_update_is_a_typed_error() {
        let session = created(Timestamp::now());
        let events = session.pending_events().to_vec();

        assert_eq!(
            revert_last_update(session.id(), &events),
            Err(ClassSessionError::NoPriorUpdate(session.id()))
        );
    }

    fn arb_follow_up() -> impl Strategy<Value = ClassSessionEvent> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(|t| retitle(&t)),
            any::<bool>().prop_map(|c| ClassSessionEvent::Updated(SessionUpdated {
                is_cancelled: Some(c),
                ..Default::default()
            })),
            (any::<bool>(), any::<bool>()).prop_map(|(t, c)| {
                ClassSessionEvent::VerificationUpdated(VerificationUpdated {
                    tutor_verified: Some(t),
                    class_verified: Some(c),
                    ..Default::default()
                })
            }),
            prop::sample::select(vec![
                UpdateStatus::UpdatePending,
                UpdateStatus::Updated,
                UpdateStatus::Failed
            ])
            .prop_map(|s| ClassSessionEvent::VerificationUpdated(VerificationUpdated {
                update_status: Some(s),
                ..Default::default()
            })),
        ]
    }

    proptest! {
        #[test]
        fn replay_is_deterministic(follow_ups in prop::collection::vec(arb_follow_up(), 0..20)) {
            let session = created(Timestamp::epoch());
            let mut events = session.pending_events().to_vec();
            events.extend(follow_ups);

            let a = ClassSession::from_events(session.id(), &events).unwrap();
            let b = ClassSession::from_events(session.id(), &events).unwrap();

            prop_assert_eq!(a, b);
        }

        #[test]
        fn replaying_in_two_steps_matches_single_replay(
            follow_ups in prop::collection::vec(arb_follow_up(), 0..20),
            split in 0usize..21,
        ) {
            let session = created(Timestamp::epoch());
            let mut events = session.pending_events().to_vec();
            events.extend(follow_ups);
            let k = split.min(events.len());

            let mut stepwise = ClassSession::replay(session.id(), &events[..k]);
            for event in &events[k..] {
                stepwise.apply_committed(event);
            }
            let whole = ClassSession::replay(session.id(), &events);

            prop_assert_eq!(stepwise, whole);
        }
    }
}
