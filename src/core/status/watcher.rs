// Threshold-crossing detection.
//
// The watcher never stores an "above threshold" flag; both sides of a
// crossing check are live recomputations, so stored state can never drift
// from the ledger.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::{NotifySignal, Transition};
use crate::core::config::Settings;
use crate::core::error::EngineError;
use crate::core::model::MemberId;
use crate::core::points::ledger::PointsLedger;
use crate::core::points::model::EntryId;
use crate::core::store::ClanStore;

/// The crossing rule: up when the threshold is first reached, down when the
/// total falls back below it.
pub fn transition_between(before: u32, after: u32, threshold: u32) -> Option<Transition> {
    if before < threshold && threshold <= after {
        Some(Transition::CrossedUp)
    } else if before >= threshold && threshold > after {
        Some(Transition::CrossedDown)
    } else {
        None
    }
}

pub struct ThresholdWatcher<'a, S: ClanStore> {
    ledger: PointsLedger<'a, S>,
    threshold: u32,
}

impl<'a, S: ClanStore> ThresholdWatcher<'a, S> {
    pub fn new(store: &'a S, settings: &'a Settings) -> Self {
        Self {
            ledger: PointsLedger::new(store, settings),
            threshold: settings.status_threshold,
        }
    }

    /// Did persisting `new_entries` carry the member across the threshold?
    /// The entries must already be in the store; the baseline is computed by
    /// excluding them, so nothing is mutated. Side-effect free; the caller
    /// dispatches any resulting signal.
    pub fn check_transition(
        &self,
        member: MemberId,
        new_entries: &HashSet<EntryId>,
        as_of: DateTime<Utc>,
    ) -> Result<Option<NotifySignal>, EngineError> {
        let after = self.ledger.current_total(member, &HashSet::new(), as_of)?;
        let before = self.ledger.current_total(member, new_entries, as_of)?;

        Ok(
            transition_between(before, after, self.threshold).map(|transition| NotifySignal {
                member,
                transition,
                current_total: after,
                threshold: self.threshold,
            }),
        )
    }
}
