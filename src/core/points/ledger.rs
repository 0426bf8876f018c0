// Windowed Dragonstone totals.
//
// current_total is a pure function over the store's visible entries: same
// inputs, same output, nothing mutated. The expiration window is half-open
// (as_of - window, as_of]: an entry exactly one window old has expired, and
// entries stamped after as_of are invisible to that snapshot.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::EntryId;
use crate::core::config::Settings;
use crate::core::error::EngineError;
use crate::core::model::{MemberId, SubmissionStatus};
use crate::core::store::ClanStore;

pub struct PointsLedger<'a, S: ClanStore> {
    store: &'a S,
    settings: &'a Settings,
}

impl<'a, S: ClanStore> PointsLedger<'a, S> {
    pub fn new(store: &'a S, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    /// Sum the member's non-expired points as of `as_of`, skipping the
    /// entries in `excluding`. Group-split entries are capped per entry
    /// before summation; every other kind counts in full. Entries whose
    /// originating submission is no longer accepted never count.
    pub fn current_total(
        &self,
        member: MemberId,
        excluding: &HashSet<EntryId>,
        as_of: DateTime<Utc>,
    ) -> Result<u32, EngineError> {
        let entries = self.store.ledger_entries(member, None);

        // Exclusion ids must belong to this member; anything else is a
        // caller bug and fails fast.
        for excluded in excluding {
            if !entries.iter().any(|e| e.id == *excluded) {
                return Err(EngineError::InconsistentExclusionSet {
                    member,
                    entry: *excluded,
                });
            }
        }

        let cutoff = as_of - self.settings.expiration_window();
        let cap = self.settings.split_points_cap;

        let mut total: u32 = 0;
        for entry in &entries {
            if excluding.contains(&entry.id) {
                continue;
            }
            if entry.earned_at <= cutoff || entry.earned_at > as_of {
                continue;
            }
            // Defensive: entries only exist post-acceptance, but a reversed
            // or deleted submission must take its points with it.
            if let Some(source) = entry.source_submission {
                match self.store.submission(source) {
                    Some(s) if s.status == SubmissionStatus::Accepted => {}
                    _ => continue,
                }
            }
            let value = if entry.kind.is_split() {
                entry.points.min(cap)
            } else {
                entry.points
            };
            total += value;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{SplitDifficulty, SubmissionKind};
    use crate::core::points::model::{EntryKind, NewEntry};
    use crate::core::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_entry(member: MemberId, kind: EntryKind, points: u32, earned_at: DateTime<Utc>) -> NewEntry {
        NewEntry {
            member,
            kind,
            points,
            earned_at,
            source_submission: None,
        }
    }

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_total_is_additive_inside_window() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        store
            .append_entries(vec![
                make_entry(member.id, EntryKind::ManualGrant, 20, now() - Duration::days(1)),
                make_entry(member.id, EntryKind::Mentoring, 10, now() - Duration::days(2)),
                make_entry(member.id, EntryKind::Recruitment, 10, now() - Duration::days(3)),
            ])
            .unwrap();

        let settings = settings();
        let ledger = PointsLedger::new(&store, &settings);
        let total = ledger.current_total(member.id, &HashSet::new(), now()).unwrap();
        assert_eq!(total, 40);
    }

    #[test]
    fn test_expiration_boundary_is_exclusive() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let settings = settings();
        let window = settings.expiration_window();

        store
            .append_entries(vec![
                // Exactly one window old: expired
                make_entry(member.id, EntryKind::ManualGrant, 7, now() - window),
                // One second inside the window: counts
                make_entry(
                    member.id,
                    EntryKind::ManualGrant,
                    3,
                    now() - window + Duration::seconds(1),
                ),
            ])
            .unwrap();

        let ledger = PointsLedger::new(&store, &settings);
        let total = ledger.current_total(member.id, &HashSet::new(), now()).unwrap();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_entries_after_as_of_are_invisible() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        store
            .append_entries(vec![make_entry(
                member.id,
                EntryKind::ManualGrant,
                9,
                now() + Duration::hours(1),
            )])
            .unwrap();

        let settings = settings();
        let ledger = PointsLedger::new(&store, &settings);
        assert_eq!(ledger.current_total(member.id, &HashSet::new(), now()).unwrap(), 0);
    }

    #[test]
    fn test_split_entries_are_capped_per_entry() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let split = EntryKind::GroupSplit {
            difficulty: SplitDifficulty::Elite,
        };
        store
            .append_entries(vec![
                make_entry(member.id, split, 8, now() - Duration::days(1)),
                make_entry(member.id, split, 8, now() - Duration::days(2)),
                make_entry(member.id, EntryKind::Mentoring, 8, now() - Duration::days(3)),
            ])
            .unwrap();

        let settings = settings(); // cap = 5
        let ledger = PointsLedger::new(&store, &settings);
        let total = ledger.current_total(member.id, &HashSet::new(), now()).unwrap();
        // Two splits capped to 5 each, mentoring uncapped
        assert_eq!(total, 18);
    }

    #[test]
    fn test_exclusion_is_pure_and_member_scoped() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let other = store.register_member("Durial321").unwrap();
        let persisted = store
            .append_entries(vec![
                make_entry(member.id, EntryKind::ManualGrant, 20, now() - Duration::days(1)),
                make_entry(member.id, EntryKind::Mentoring, 10, now() - Duration::days(2)),
                make_entry(other.id, EntryKind::ManualGrant, 50, now() - Duration::days(1)),
            ])
            .unwrap();

        let settings = settings();
        let ledger = PointsLedger::new(&store, &settings);

        let excluding: HashSet<EntryId> = [persisted[1].id].into_iter().collect();
        assert_eq!(ledger.current_total(member.id, &excluding, now()).unwrap(), 20);
        // The excluding call must not have changed anything
        assert_eq!(ledger.current_total(member.id, &HashSet::new(), now()).unwrap(), 30);

        // Excluding another member's entry is a caller bug
        let foreign: HashSet<EntryId> = [persisted[2].id].into_iter().collect();
        let result = ledger.current_total(member.id, &foreign, now());
        assert!(matches!(
            result,
            Err(EngineError::InconsistentExclusionSet { .. })
        ));
    }

    #[test]
    fn test_entries_from_unaccepted_submissions_never_count() {
        let mut store = MemoryStore::new();
        let member = store.register_member("Zezima").unwrap();
        let submission = store
            .submit(vec![member.id], SubmissionKind::Mentoring, now())
            .unwrap();

        // An entry pointing at a still-pending submission should not exist
        // in practice; if it does, it must not count.
        store
            .append_entries(vec![NewEntry {
                member: member.id,
                kind: EntryKind::Mentoring,
                points: 10,
                earned_at: now() - Duration::days(1),
                source_submission: Some(submission.id),
            }])
            .unwrap();

        let settings = settings();
        let ledger = PointsLedger::new(&store, &settings);
        assert_eq!(ledger.current_total(member.id, &HashSet::new(), now()).unwrap(), 0);
    }
}
