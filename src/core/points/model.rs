// Ledger entry types for the Dragonstone points system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::model::{EventKind, EventRole, MemberId, SplitDifficulty, SubmissionId};

pub type EntryId = u64;

/// Monthly clan award placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonthlyRank {
    First,
    Second,
    Third,
}

/// Kind tag for one point-earning event. Closed set; point values per kind
/// come from the rule tables in rules.rs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Admin-granted points with a caller-supplied value.
    ManualGrant,
    /// Bringing a new member into the clan.
    Recruitment,
    /// Placing in the monthly clan awards.
    MonthlyRank(MonthlyRank),
    /// Group split content participation. The only capped kind.
    GroupSplit { difficulty: SplitDifficulty },
    /// Mentoring a learner.
    Mentoring,
    /// Community event contribution.
    Event { kind: EventKind, role: EventRole },
    /// Assisting a new member's first raid.
    RaidAssist,
}

impl EntryKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ManualGrant => "Manual grant",
            Self::Recruitment => "Recruitment",
            Self::MonthlyRank(_) => "Monthly award",
            Self::GroupSplit { .. } => "Group split",
            Self::Mentoring => "Mentoring",
            Self::Event { .. } => "Community event",
            Self::RaidAssist => "New-member raid",
        }
    }

    /// Returns true for the one kind whose per-entry value is capped before
    /// summation (split content is discounted relative to other sources).
    pub fn is_split(&self) -> bool {
        matches!(self, Self::GroupSplit { .. })
    }
}

/// One atomic point-earning event. Immutable once created; the point value
/// is materialized from the rule tables at creation time so later rule
/// changes never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub member: MemberId,
    pub kind: EntryKind,
    pub points: u32,
    pub earned_at: DateTime<Utc>,
    /// Back-reference to the submission that produced this entry, when there
    /// is one. Lets a recomputation answer "which entries disappear if this
    /// submission were reversed".
    pub source_submission: Option<SubmissionId>,
}

/// A ledger entry before the store has assigned its id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub member: MemberId,
    pub kind: EntryKind,
    pub points: u32,
    pub earned_at: DateTime<Utc>,
    pub source_submission: Option<SubmissionId>,
}
