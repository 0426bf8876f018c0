//! Storage contract consumed by the engine, plus an in-memory implementation.
//!
//! The engine only ever reads a consistent snapshot through `ClanStore`; the
//! write methods exist so the acceptance flow has an atomic seam. A real
//! deployment backs this with a database transaction; `MemoryStore` backs
//! tests and small embeddings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::error::EngineError;
use super::model::{
    Board, BoardId, BoardOrdering, Member, MemberId, Submission, SubmissionId, SubmissionKind,
    SubmissionStatus,
};
use super::names;
use super::points::model::{EntryId, LedgerEntry, NewEntry};

pub trait ClanStore {
    fn member(&self, id: MemberId) -> Option<Member>;
    fn board(&self, id: BoardId) -> Option<Board>;
    fn submission(&self, id: SubmissionId) -> Option<Submission>;

    /// Accepted submissions on one board, in no particular order.
    fn accepted_submissions(&self, board: BoardId) -> Vec<Submission>;

    /// A member's ledger entries, optionally only those earned strictly
    /// after `since`.
    fn ledger_entries(&self, member: MemberId, since: Option<DateTime<Utc>>) -> Vec<LedgerEntry>;

    fn active_members(&self) -> Vec<Member>;

    /// Flip a pending submission to accepted and persist its ledger entries
    /// as one atomic unit. Returns the persisted entries with assigned ids.
    /// A submission that is no longer pending is a write conflict.
    fn accept_with_entries(
        &mut self,
        id: SubmissionId,
        entries: Vec<NewEntry>,
    ) -> Result<Vec<LedgerEntry>, EngineError>;

    /// Flip a pending submission to denied.
    fn mark_denied(&mut self, id: SubmissionId) -> Result<(), EngineError>;

    /// Persist entries that have no triggering submission (manual grants,
    /// recruitment, monthly awards).
    fn append_entries(&mut self, entries: Vec<NewEntry>) -> Result<Vec<LedgerEntry>, EngineError>;
}

/// In-memory store keyed by id maps, with monotonic id counters.
pub struct MemoryStore {
    members: HashMap<MemberId, Member>,
    boards: HashMap<BoardId, Board>,
    submissions: HashMap<SubmissionId, Submission>,
    entries: HashMap<EntryId, LedgerEntry>,
    next_member: MemberId,
    next_board: BoardId,
    next_submission: SubmissionId,
    next_entry: EntryId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            members: HashMap::new(),
            boards: HashMap::new(),
            submissions: HashMap::new(),
            entries: HashMap::new(),
            next_member: 1,
            next_board: 1,
            next_submission: 1,
            next_entry: 1,
        }
    }

    /// Register a member. Names must be legal in-game names and unique under
    /// normalization.
    pub fn register_member(&mut self, display_name: &str) -> Result<Member, EngineError> {
        if !names::is_valid(display_name) {
            return Err(EngineError::InvalidInput(format!(
                "illegal display name {display_name:?}"
            )));
        }
        let normalized = names::normalize(display_name);
        if self
            .members
            .values()
            .any(|m| names::normalize(&m.display_name) == normalized)
        {
            return Err(EngineError::InvalidInput(format!(
                "display name {display_name:?} is already registered"
            )));
        }

        let member = Member {
            id: self.next_member,
            display_name: display_name.to_string(),
            active: true,
        };
        self.next_member += 1;
        self.members.insert(member.id, member.clone());
        Ok(member)
    }

    pub fn deactivate_member(&mut self, id: MemberId) -> Result<(), EngineError> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(EngineError::UnknownMember(id))?;
        member.active = false;
        Ok(())
    }

    pub fn reactivate_member(&mut self, id: MemberId) -> Result<(), EngineError> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(EngineError::UnknownMember(id))?;
        member.active = true;
        Ok(())
    }

    pub fn add_board(
        &mut self,
        name: &str,
        ordering: BoardOrdering,
        team_size: usize,
    ) -> Result<Board, EngineError> {
        if team_size < 1 {
            return Err(EngineError::InvalidInput(format!(
                "board {name:?} needs a team size of at least 1"
            )));
        }
        let board = Board {
            id: self.next_board,
            name: name.to_string(),
            ordering,
            team_size,
            point_multiplier: 1.0,
            active: true,
        };
        self.next_board += 1;
        self.boards.insert(board.id, board.clone());
        Ok(board)
    }

    /// Record a new pending submission.
    pub fn submit(
        &mut self,
        team: Vec<MemberId>,
        kind: SubmissionKind,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, EngineError> {
        for member in &team {
            if !self.members.contains_key(member) {
                return Err(EngineError::UnknownMember(*member));
            }
        }
        let submission = Submission {
            id: self.next_submission,
            team,
            kind,
            submitted_at,
            status: SubmissionStatus::Pending,
        };
        self.next_submission += 1;
        self.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn persist_entries(&mut self, entries: Vec<NewEntry>) -> Vec<LedgerEntry> {
        let mut persisted = Vec::with_capacity(entries.len());
        for entry in entries {
            let ledger_entry = LedgerEntry {
                id: self.next_entry,
                member: entry.member,
                kind: entry.kind,
                points: entry.points,
                earned_at: entry.earned_at,
                source_submission: entry.source_submission,
            };
            self.next_entry += 1;
            self.entries.insert(ledger_entry.id, ledger_entry.clone());
            persisted.push(ledger_entry);
        }
        persisted
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClanStore for MemoryStore {
    fn member(&self, id: MemberId) -> Option<Member> {
        self.members.get(&id).cloned()
    }

    fn board(&self, id: BoardId) -> Option<Board> {
        self.boards.get(&id).cloned()
    }

    fn submission(&self, id: SubmissionId) -> Option<Submission> {
        self.submissions.get(&id).cloned()
    }

    fn accepted_submissions(&self, board: BoardId) -> Vec<Submission> {
        self.submissions
            .values()
            .filter(|s| s.status == SubmissionStatus::Accepted && s.kind.board_id() == Some(board))
            .cloned()
            .collect()
    }

    fn ledger_entries(&self, member: MemberId, since: Option<DateTime<Utc>>) -> Vec<LedgerEntry> {
        self.entries
            .values()
            .filter(|e| e.member == member)
            .filter(|e| since.map_or(true, |cutoff| e.earned_at > cutoff))
            .cloned()
            .collect()
    }

    fn active_members(&self) -> Vec<Member> {
        self.members.values().filter(|m| m.active).cloned().collect()
    }

    fn accept_with_entries(
        &mut self,
        id: SubmissionId,
        entries: Vec<NewEntry>,
    ) -> Result<Vec<LedgerEntry>, EngineError> {
        let submission = self
            .submissions
            .get_mut(&id)
            .ok_or(EngineError::UnknownSubmission(id))?;
        // A review landed between the caller's read and this write.
        if submission.status != SubmissionStatus::Pending {
            return Err(EngineError::StaleSnapshotRace);
        }
        submission.status = SubmissionStatus::Accepted;
        Ok(self.persist_entries(entries))
    }

    fn mark_denied(&mut self, id: SubmissionId) -> Result<(), EngineError> {
        let submission = self
            .submissions
            .get_mut(&id)
            .ok_or(EngineError::UnknownSubmission(id))?;
        if submission.status != SubmissionStatus::Pending {
            return Err(EngineError::StaleSnapshotRace);
        }
        submission.status = SubmissionStatus::Denied;
        Ok(())
    }

    fn append_entries(&mut self, entries: Vec<NewEntry>) -> Result<Vec<LedgerEntry>, EngineError> {
        for entry in &entries {
            if !self.members.contains_key(&entry.member) {
                return Err(EngineError::UnknownMember(entry.member));
            }
        }
        Ok(self.persist_entries(entries))
    }
}
