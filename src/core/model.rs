//! Data model for members, boards and achievement submissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type MemberId = u64;
pub type BoardId = u64;
pub type SubmissionId = u64;

/// A clan member. Deactivation removes a member from ranking pools but keeps
/// their history; members are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub active: bool,
}

/// Whether lower or higher submitted values rank better on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardOrdering {
    /// Lower is better (completion times).
    Ascending,
    /// Higher is better (kill counts, scores).
    Descending,
}

/// A ranked competition surface, e.g. a boss speedrun leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub ordering: BoardOrdering,
    /// Required team size; 1 means solo. Always >= 1.
    pub team_size: usize,
    /// Display-layer weighting; the engine never applies it.
    pub point_multiplier: f32,
    pub active: bool,
}

/// Review state of a submission. Transitions exactly once, pending to
/// accepted or denied; re-review is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Pending,
    Accepted,
    Denied,
}

/// Combat achievement tiers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CombatTier {
    Easy,
    Medium,
    Hard,
    Elite,
    Master,
    Grandmaster,
}

/// Difficulty bands for group split content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitDifficulty {
    Easy,
    Medium,
    Hard,
    Elite,
}

/// Broad category of a community event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Pvm,
    Skilling,
    Social,
}

/// What a member did for a community event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventRole {
    Host,
    Participant,
    Donor,
}

/// What a submission claims. Closed set; every behavior that varies by kind
/// is an exhaustive match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubmissionKind {
    /// A record attempt on a ranked board. Value semantics depend on the
    /// board: seconds for timed boards, a count otherwise.
    BoardRecord { board_id: BoardId, value: u64 },
    /// A rare pet drop.
    PetDrop { pet: String },
    /// Reaching a collection-log slot milestone.
    CollectionLog { slots: u32 },
    /// Completing a combat achievement tier.
    CombatAchievement { tier: CombatTier },
    /// Participating in group split content.
    GroupSplit { difficulty: SplitDifficulty },
    /// Mentoring a learner through content.
    Mentoring,
    /// Hosting, attending or donating to a community event.
    Event { kind: EventKind, role: EventRole },
    /// Carrying a new member through their first raid.
    RaidAssist,
}

impl SubmissionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BoardRecord { .. } => "Board record",
            Self::PetDrop { .. } => "Pet drop",
            Self::CollectionLog { .. } => "Collection log",
            Self::CombatAchievement { .. } => "Combat achievement",
            Self::GroupSplit { .. } => "Group split",
            Self::Mentoring => "Mentoring",
            Self::Event { .. } => "Community event",
            Self::RaidAssist => "New-member raid",
        }
    }

    /// The board this submission competes on, if any.
    pub fn board_id(&self) -> Option<BoardId> {
        match self {
            Self::BoardRecord { board_id, .. } => Some(*board_id),
            _ => None,
        }
    }

    /// Returns true for kinds that generate ledger entries on acceptance.
    pub fn earns_points(&self) -> bool {
        matches!(
            self,
            Self::GroupSplit { .. } | Self::Mentoring | Self::Event { .. } | Self::RaidAssist
        )
    }
}

/// An achievement claim by one team of members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    /// Members jointly credited. For board records the length must match the
    /// board's team size, checked at acceptance.
    pub team: Vec<MemberId>,
    pub kind: SubmissionKind,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    /// Canonical team identity: sorted, deduplicated member ids. Two
    /// submissions by the same people produce the same key regardless of
    /// listing order.
    pub fn team_key(&self) -> Vec<MemberId> {
        let mut key = self.team.clone();
        key.sort_unstable();
        key.dedup();
        key
    }

    /// The record value for board submissions.
    pub fn record_value(&self) -> Option<u64> {
        match self.kind {
            SubmissionKind::BoardRecord { value, .. } => Some(value),
            _ => None,
        }
    }
}
