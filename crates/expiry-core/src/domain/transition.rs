//! Transition model: what a save of the expiry field has to do.
//!
//! `Transition::decide` is a pure function over the submitted and stored values.
//! Executing the side effects (metadata, scheduler) is the job of
//! `app::scheduler::ExpiryScheduler`.

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// One of the four mutually exclusive outcomes of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// First expiry for an item that had none.
    Create { at: Timestamp },

    /// Expiry moved: retire the old registration, then register the new one.
    Reschedule { from: Timestamp, to: Timestamp },

    /// Field cleared back to the default.
    Clear { from: Timestamp },

    /// Value unchanged, or both absent.
    Unchanged,
}

impl Transition {
    /// Decide the transition, in priority order.
    ///
    /// `None` for `submitted` is the "unset" default of the form field.
    pub fn decide(submitted: Option<Timestamp>, stored: Option<Timestamp>) -> Self {
        match (submitted, stored) {
            (Some(at), None) => Transition::Create { at },
            (Some(to), Some(from)) if to != from => Transition::Reschedule { from, to },
            (None, Some(from)) => Transition::Clear { from },
            _ => Transition::Unchanged,
        }
    }

    /// Expiry that remains after the transition is applied.
    pub fn resulting_expiry(&self, stored: Option<Timestamp>) -> Option<Timestamp> {
        match *self {
            Transition::Create { at } => Some(at),
            Transition::Reschedule { to, .. } => Some(to),
            Transition::Clear { .. } => None,
            Transition::Unchanged => stored,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Transition::Unchanged)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::Create { .. } => "create",
            Transition::Reschedule { .. } => "reschedule",
            Transition::Clear { .. } => "clear",
            Transition::Unchanged => "unchanged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const A: Timestamp = Timestamp::from_secs(1_700_000_000);
    const B: Timestamp = Timestamp::from_secs(1_700_050_000);
    const ZERO: Timestamp = Timestamp::from_secs(0);

    #[rstest]
    #[case::create(Some(A), None, Transition::Create { at: A })]
    #[case::reschedule(Some(B), Some(A), Transition::Reschedule { from: A, to: B })]
    #[case::clear(None, Some(B), Transition::Clear { from: B })]
    #[case::unchanged(Some(A), Some(A), Transition::Unchanged)]
    #[case::both_absent(None, None, Transition::Unchanged)]
    #[case::zero_is_present(Some(ZERO), None, Transition::Create { at: ZERO })]
    #[case::clear_zero(None, Some(ZERO), Transition::Clear { from: ZERO })]
    fn decide_follows_priority_order(
        #[case] submitted: Option<Timestamp>,
        #[case] stored: Option<Timestamp>,
        #[case] expected: Transition,
    ) {
        assert_eq!(Transition::decide(submitted, stored), expected);
    }

    #[test]
    fn resulting_expiry_matches_submitted_value() {
        for (submitted, stored) in [
            (Some(A), None),
            (Some(B), Some(A)),
            (None, Some(A)),
            (Some(A), Some(A)),
            (None, None),
        ] {
            let transition = Transition::decide(submitted, stored);
            assert_eq!(transition.resulting_expiry(stored), submitted);
        }
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Transition::Clear { from: A }).unwrap();
        assert_eq!(json["kind"], "clear");
        assert_eq!(json["from"], 1_700_000_000);
    }
}
