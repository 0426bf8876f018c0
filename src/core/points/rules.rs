// Point rule tables and ledger-entry materialization.
//
// Values are looked up once, when an entry is created, and stored on the
// entry. A missing table row is an error, never a silent zero.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::model::{EntryKind, MonthlyRank, NewEntry};
use crate::core::error::EngineError;
use crate::core::model::{EventKind, EventRole, SplitDifficulty, Submission, SubmissionKind};

/// Explicit rule configuration, passed by reference into entry creation.
#[derive(Debug, Clone)]
pub struct PointRules {
    pub recruitment: u32,
    pub mentoring: u32,
    pub raid_assist: u32,
    pub monthly_rank: HashMap<MonthlyRank, u32>,
    pub split_difficulty: HashMap<SplitDifficulty, u32>,
    pub event_role: HashMap<(EventKind, EventRole), u32>,
}

impl Default for PointRules {
    fn default() -> Self {
        let monthly_rank = HashMap::from([
            (MonthlyRank::First, 15),
            (MonthlyRank::Second, 10),
            (MonthlyRank::Third, 5),
        ]);
        let split_difficulty = HashMap::from([
            (SplitDifficulty::Easy, 2),
            (SplitDifficulty::Medium, 4),
            (SplitDifficulty::Hard, 6),
            (SplitDifficulty::Elite, 8),
        ]);
        let mut event_role = HashMap::new();
        for kind in [EventKind::Pvm, EventKind::Skilling, EventKind::Social] {
            event_role.insert((kind, EventRole::Host), 10);
            event_role.insert((kind, EventRole::Participant), 5);
            event_role.insert((kind, EventRole::Donor), 5);
        }
        Self {
            recruitment: 10,
            mentoring: 10,
            raid_assist: 5,
            monthly_rank,
            split_difficulty,
            event_role,
        }
    }
}

impl PointRules {
    pub fn monthly_rank_points(&self, rank: MonthlyRank) -> Result<u32, EngineError> {
        self.monthly_rank
            .get(&rank)
            .copied()
            .ok_or_else(|| EngineError::UnknownRuleLookup {
                rule: format!("monthly rank {rank:?}"),
            })
    }

    pub fn split_points(&self, difficulty: SplitDifficulty) -> Result<u32, EngineError> {
        self.split_difficulty
            .get(&difficulty)
            .copied()
            .ok_or_else(|| EngineError::UnknownRuleLookup {
                rule: format!("split difficulty {difficulty:?}"),
            })
    }

    pub fn event_points(&self, kind: EventKind, role: EventRole) -> Result<u32, EngineError> {
        self.event_role
            .get(&(kind, role))
            .copied()
            .ok_or_else(|| EngineError::UnknownRuleLookup {
                rule: format!("event {kind:?} role {role:?}"),
            })
    }
}

/// Materialize the ledger entries an accepted submission spawns: one per
/// team member for the point-earning kinds, none for records and trophies.
/// Fails whole if any rule row is missing; no partial entry lists.
pub fn entries_for_submission(
    submission: &Submission,
    rules: &PointRules,
    accepted_at: DateTime<Utc>,
) -> Result<Vec<NewEntry>, EngineError> {
    let (kind, points) = match submission.kind {
        SubmissionKind::BoardRecord { .. }
        | SubmissionKind::PetDrop { .. }
        | SubmissionKind::CollectionLog { .. }
        | SubmissionKind::CombatAchievement { .. } => return Ok(Vec::new()),
        SubmissionKind::GroupSplit { difficulty } => (
            EntryKind::GroupSplit { difficulty },
            rules.split_points(difficulty)?,
        ),
        SubmissionKind::Mentoring => (EntryKind::Mentoring, rules.mentoring),
        SubmissionKind::Event { kind, role } => {
            (EntryKind::Event { kind, role }, rules.event_points(kind, role)?)
        }
        SubmissionKind::RaidAssist => (EntryKind::RaidAssist, rules.raid_assist),
    };

    Ok(submission
        .team_key()
        .into_iter()
        .map(|member| NewEntry {
            member,
            kind,
            points,
            earned_at: accepted_at,
            source_submission: Some(submission.id),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::SubmissionStatus;
    use chrono::TimeZone;

    fn make_submission(kind: SubmissionKind, team: Vec<u64>) -> Submission {
        Submission {
            id: 7,
            team,
            kind,
            submitted_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            status: SubmissionStatus::Pending,
        }
    }

    #[test]
    fn test_record_submissions_spawn_no_entries() {
        let rules = PointRules::default();
        let s = make_submission(SubmissionKind::BoardRecord { board_id: 1, value: 900 }, vec![1]);
        let entries = entries_for_submission(&s, &rules, s.submitted_at).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_split_spawns_one_entry_per_member() {
        let rules = PointRules::default();
        let s = make_submission(
            SubmissionKind::GroupSplit { difficulty: SplitDifficulty::Hard },
            vec![3, 1, 2],
        );
        let entries = entries_for_submission(&s, &rules, s.submitted_at).unwrap();
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.points, 6);
            assert_eq!(entry.source_submission, Some(7));
        }
    }

    #[test]
    fn test_missing_rule_row_is_an_error() {
        let mut rules = PointRules::default();
        rules.split_difficulty.remove(&SplitDifficulty::Elite);

        let s = make_submission(
            SubmissionKind::GroupSplit { difficulty: SplitDifficulty::Elite },
            vec![1],
        );
        let result = entries_for_submission(&s, &rules, s.submitted_at);
        assert!(matches!(result, Err(EngineError::UnknownRuleLookup { .. })));
    }

    #[test]
    fn test_event_lookup_is_keyed_by_kind_and_role() {
        let rules = PointRules::default();
        assert_eq!(rules.event_points(EventKind::Pvm, EventRole::Host).unwrap(), 10);
        assert_eq!(
            rules.event_points(EventKind::Social, EventRole::Participant).unwrap(),
            5
        );
    }
}
