// Expiration sweep.
//
// Points expire silently with time; no write event fires when they do. An
// external scheduler runs this on a fixed cadence. It only reads and
// produces signals, so a crashed sweep is safe to re-run from scratch.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::{NotifySignal, Transition};
use super::watcher::transition_between;
use crate::core::config::Settings;
use crate::core::error::EngineError;
use crate::core::points::ledger::PointsLedger;
use crate::core::store::ClanStore;

pub struct SweepOutcome {
    pub signals: Vec<NotifySignal>,
    pub members_checked: usize,
}

/// Compare every active member's total now against one sweep interval ago
/// and report expiry-driven losses of status. Upward moves are the write
/// path's job; a snapshot comparison can only lose points, never gain them,
/// so only downward crossings are reported.
///
/// This is the one deliberately O(members x entries) scan in the engine.
pub fn run_expiration_sweep<S: ClanStore>(
    store: &S,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<SweepOutcome, EngineError> {
    let ledger = PointsLedger::new(store, settings);
    let threshold = settings.status_threshold;
    let previous_snapshot = now - settings.sweep_interval();
    let no_exclusions = HashSet::new();

    let mut signals = Vec::new();
    let mut members_checked = 0;

    for member in store.active_members() {
        members_checked += 1;
        let current = ledger.current_total(member.id, &no_exclusions, now)?;
        let previous = ledger.current_total(member.id, &no_exclusions, previous_snapshot)?;

        if transition_between(previous, current, threshold) == Some(Transition::CrossedDown) {
            signals.push(NotifySignal {
                member: member.id,
                transition: Transition::CrossedDown,
                current_total: current,
                threshold,
            });
        }
    }

    Ok(SweepOutcome {
        signals,
        members_checked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::MemberId;
    use crate::core::points::model::{EntryKind, NewEntry};
    use crate::core::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn grant_at(store: &mut MemoryStore, member: MemberId, points: u32, earned_at: DateTime<Utc>) {
        store
            .append_entries(vec![NewEntry {
                member,
                kind: EntryKind::ManualGrant,
                points,
                earned_at,
                source_submission: None,
            }])
            .unwrap();
    }

    #[test]
    fn test_sweep_detects_expiry_driven_loss() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = Settings::default(); // threshold 50, window 180d, sweep 1h

        // 50 points that expired within the last sweep interval: the entry is
        // still visible one interval ago, gone now.
        let window = settings.expiration_window();
        grant_at(
            &mut store,
            member.id,
            50,
            now() - window - Duration::minutes(30),
        );

        let outcome = run_expiration_sweep(&store, &settings, now()).unwrap();
        assert_eq!(outcome.members_checked, 1);
        assert_eq!(outcome.signals.len(), 1);
        assert_eq!(outcome.signals[0].transition, Transition::CrossedDown);
        assert_eq!(outcome.signals[0].current_total, 0);
    }

    #[test]
    fn test_sweep_is_quiet_when_nothing_crossed() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = Settings::default();

        grant_at(&mut store, member.id, 60, now() - Duration::days(2));

        let outcome = run_expiration_sweep(&store, &settings, now()).unwrap();
        assert!(outcome.signals.is_empty());
    }

    #[test]
    fn test_sweep_ignores_loss_that_stays_above_threshold() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = Settings::default();
        let window = settings.expiration_window();

        // 10 points expire this interval but 55 remain
        grant_at(&mut store, member.id, 10, now() - window - Duration::minutes(30));
        grant_at(&mut store, member.id, 55, now() - Duration::days(1));

        let outcome = run_expiration_sweep(&store, &settings, now()).unwrap();
        assert!(outcome.signals.is_empty());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = Settings::default();
        let window = settings.expiration_window();
        grant_at(&mut store, member.id, 50, now() - window - Duration::minutes(30));

        let first = run_expiration_sweep(&store, &settings, now()).unwrap();
        let second = run_expiration_sweep(&store, &settings, now()).unwrap();
        assert_eq!(first.signals.len(), second.signals.len());
        assert_eq!(first.members_checked, second.members_checked);
    }

    #[test]
    fn test_sweep_skips_inactive_members() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = Settings::default();
        let window = settings.expiration_window();
        grant_at(&mut store, member.id, 50, now() - window - Duration::minutes(30));
        store.deactivate_member(member.id).unwrap();

        let outcome = run_expiration_sweep(&store, &settings, now()).unwrap();
        assert_eq!(outcome.members_checked, 0);
        assert!(outcome.signals.is_empty());
    }
}
