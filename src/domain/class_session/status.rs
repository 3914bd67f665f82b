//! The two verification status axes of a class session.
//!
//! Creation and update verification are independent lifecycles that can
//! race, so they are kept as two enums plus two verified flags. The
//! "advance when both verified" rule lives in [`VerificationState::advance`]
//! and nowhere else.

use serde::{Deserialize, Serialize};

/// Creation verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateStatus {
    #[default]
    CreatePending,
    Created,
    Failed,
}

/// Update verification status.
///
/// A freshly created session is `Updated` by convention: creation counts as
/// its first settled update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateStatus {
    UpdatePending,
    #[default]
    Updated,
    Failed,
}

/// Which external check produced a verification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verifier {
    Tutor,
    Class,
}

impl std::fmt::Display for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verifier::Tutor => write!(f, "tutor"),
            Verifier::Class => write!(f, "class"),
        }
    }
}

/// Snapshot of both axes and both verified flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerificationState {
    pub create_status: CreateStatus,
    pub update_status: UpdateStatus,
    pub tutor_verified: bool,
    pub class_verified: bool,
}

impl VerificationState {
    /// True when neither axis is waiting on a verifier.
    pub fn is_steady(&self) -> bool {
        self.create_status == CreateStatus::Created && self.update_status == UpdateStatus::Updated
    }

    /// True while either axis is pending.
    pub fn is_in_flight(&self) -> bool {
        self.create_status == CreateStatus::CreatePending
            || self.update_status == UpdateStatus::UpdatePending
    }

    /// Enters the update phase. Only the tutor must re-verify; the class
    /// verification is kept across edits.
    pub fn begin_update(self) -> Self {
        Self {
            update_status: UpdateStatus::UpdatePending,
            tutor_verified: false,
            ..self
        }
    }

    /// Records one verifier's answer and advances the pending axis.
    ///
    /// A rejection fails whichever axis is pending (creation first) and can
    /// never be undone by a later approval.
    pub fn record_result(self, verifier: Verifier, is_valid: bool) -> Self {
        let mut next = self;
        match verifier {
            Verifier::Tutor => next.tutor_verified = is_valid,
            Verifier::Class => next.class_verified = is_valid,
        }

        if !is_valid {
            if next.create_status == CreateStatus::CreatePending {
                next.create_status = CreateStatus::Failed;
            } else if next.update_status == UpdateStatus::UpdatePending {
                next.update_status = UpdateStatus::Failed;
            }
        }

        next.advance()
    }

    /// Advances a pending axis once both verifiers approved.
    ///
    /// Creation completes before an update can, so when both axes are
    /// pending only creation advances.
    pub fn advance(self) -> Self {
        if !(self.tutor_verified && self.class_verified) {
            return self;
        }

        if self.create_status == CreateStatus::CreatePending {
            Self {
                create_status: CreateStatus::Created,
                ..self
            }
        } else if self.update_status == UpdateStatus::UpdatePending {
            Self {
                update_status: UpdateStatus::Updated,
                ..self
            }
        } else {
            self
        }
    }

    /// Creation just completed between `self` and `next`.
    pub fn completed_creation(&self, next: &Self) -> bool {
        self.create_status == CreateStatus::CreatePending
            && next.create_status == CreateStatus::Created
    }

    /// An update just completed between `self` and `next`.
    ///
    /// The `Updated` status a session carries from birth does not count;
    /// creation must already be complete.
    pub fn completed_update(&self, next: &Self) -> bool {
        self.update_status == UpdateStatus::UpdatePending
            && next.update_status == UpdateStatus::Updated
            && next.create_status == CreateStatus::Created
    }

    /// An update just failed between `self` and `next`.
    pub fn failed_update(&self, next: &Self) -> bool {
        self.update_status != UpdateStatus::Failed && next.update_status == UpdateStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creating() -> VerificationState {
        VerificationState::default()
    }

    fn steady() -> VerificationState {
        VerificationState {
            create_status: CreateStatus::Created,
            update_status: UpdateStatus::Updated,
            tutor_verified: true,
            class_verified: true,
        }
    }

    #[test]
    fn default_state_is_create_pending_and_updated() {
        let state = creating();
        assert_eq!(state.create_status, CreateStatus::CreatePending);
        assert_eq!(state.update_status, UpdateStatus::Updated);
        assert!(!state.tutor_verified);
        assert!(!state.class_verified);
    }

    #[test]
    fn creation_completes_in_either_order() {
        let a = creating()
            .record_result(Verifier::Tutor, true)
            .record_result(Verifier::Class, true);
        let b = creating()
            .record_result(Verifier::Class, true)
            .record_result(Verifier::Tutor, true);

        assert_eq!(a.create_status, CreateStatus::Created);
        assert_eq!(a, b);
    }

    #[test]
    fn one_approval_is_not_enough() {
        let state = creating().record_result(Verifier::Tutor, true);
        assert_eq!(state.create_status, CreateStatus::CreatePending);
    }

    #[test]
    fn rejection_fails_creation_regardless_of_order() {
        for (first, second) in [(true, false), (false, true), (false, false)] {
            let state = creating()
                .record_result(Verifier::Tutor, first)
                .record_result(Verifier::Class, second);
            assert_eq!(state.create_status, CreateStatus::Failed);

            let state = creating()
                .record_result(Verifier::Class, second)
                .record_result(Verifier::Tutor, first);
            assert_eq!(state.create_status, CreateStatus::Failed);
        }
    }

    #[test]
    fn begin_update_keeps_class_verification() {
        let state = steady().begin_update();
        assert_eq!(state.update_status, UpdateStatus::UpdatePending);
        assert!(!state.tutor_verified);
        assert!(state.class_verified);
    }

    #[test]
    fn update_completes_on_tutor_approval_alone() {
        let before = steady().begin_update();
        let after = before.record_result(Verifier::Tutor, true);

        assert_eq!(after.update_status, UpdateStatus::Updated);
        assert!(before.completed_update(&after));
    }

    #[test]
    fn update_rejection_fails_update_axis_only() {
        let before = steady().begin_update();
        let after = before.record_result(Verifier::Tutor, false);

        assert_eq!(after.update_status, UpdateStatus::Failed);
        assert_eq!(after.create_status, CreateStatus::Created);
        assert!(before.failed_update(&after));
    }

    #[test]
    fn creation_is_preferred_when_both_axes_pending() {
        let state = VerificationState {
            create_status: CreateStatus::CreatePending,
            update_status: UpdateStatus::UpdatePending,
            tutor_verified: true,
            class_verified: true,
        }
        .advance();

        assert_eq!(state.create_status, CreateStatus::Created);
        assert_eq!(state.update_status, UpdateStatus::UpdatePending);
    }

    #[test]
    fn first_creation_is_not_an_update_completion() {
        let before = creating().record_result(Verifier::Tutor, true);
        let after = before.record_result(Verifier::Class, true);

        assert!(before.completed_creation(&after));
        assert!(!before.completed_update(&after));
    }

    #[test]
    fn steady_and_in_flight_are_exclusive() {
        assert!(steady().is_steady());
        assert!(!steady().is_in_flight());
        assert!(creating().is_in_flight());
        assert!(steady().begin_update().is_in_flight());
    }

    #[test]
    fn statuses_serialize_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&CreateStatus::CreatePending).unwrap(),
            "\"CREATE_PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&UpdateStatus::UpdatePending).unwrap(),
            "\"UPDATE_PENDING\""
        );
    }
}
