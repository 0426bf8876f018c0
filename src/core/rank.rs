// Leaderboard computation: best result per unique team, ordered by the
// board's direction. Always a live recomputation over accepted submissions;
// nothing here is cached or mutated.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::error::EngineError;
use super::model::{Board, BoardId, BoardOrdering, MemberId, Submission, SubmissionId, SubmissionStatus};
use super::store::ClanStore;

/// At least half the team must still be active for the submission to stay
/// in the pool at all. Written as 2 * active >= len so a 3-member team
/// needs 2 active members.
fn team_half_active(team: &[MemberId], active: &HashSet<MemberId>) -> bool {
    let active_count = team.iter().filter(|m| active.contains(m)).count();
    2 * active_count >= team.len()
}

/// Ordering of two submissions under the board's direction: better value
/// first, ties broken by earlier timestamp, then id for determinism.
fn compare(board: &Board, a: &Submission, b: &Submission) -> Ordering {
    let a_value = a.record_value().unwrap_or(0);
    let b_value = b.record_value().unwrap_or(0);
    let by_value = match board.ordering {
        BoardOrdering::Ascending => a_value.cmp(&b_value),
        BoardOrdering::Descending => b_value.cmp(&a_value),
    };
    by_value
        .then(a.submitted_at.cmp(&b.submitted_at))
        .then(a.id.cmp(&b.id))
}

/// Best accepted result per unique team, ordered by the board's direction.
/// `limit` truncates the result; None returns every team.
pub fn top_submissions<'a>(
    board: &Board,
    submissions: &'a [Submission],
    active: &HashSet<MemberId>,
    limit: Option<usize>,
) -> Vec<&'a Submission> {
    let mut best_per_team: HashMap<Vec<MemberId>, &Submission> = HashMap::new();

    for submission in submissions {
        if submission.status != SubmissionStatus::Accepted {
            continue;
        }
        if submission.kind.board_id() != Some(board.id) {
            continue;
        }
        let key = submission.team_key();
        if !team_half_active(&key, active) {
            continue;
        }
        let replaces_incumbent = match best_per_team.get(&key) {
            Some(incumbent) => compare(board, incumbent, submission) == Ordering::Greater,
            None => true,
        };
        if replaces_incumbent {
            best_per_team.insert(key, submission);
        }
    }

    let mut winners: Vec<&Submission> = best_per_team.into_values().collect();
    winners.sort_by(|a, b| compare(board, a, b));
    if let Some(limit) = limit {
        winners.truncate(limit);
    }
    winners
}

/// 1-based rank of a specific submission, or None if it is not its team's
/// best or was filtered out (not accepted, team below half active).
pub fn rank_of(
    board: &Board,
    submissions: &[Submission],
    active: &HashSet<MemberId>,
    submission: SubmissionId,
) -> Option<usize> {
    top_submissions(board, submissions, active, None)
        .iter()
        .position(|s| s.id == submission)
        .map(|index| index + 1)
}

/// Store-backed view over the pure ranking functions.
pub struct RankEngine<'a, S: ClanStore> {
    store: &'a S,
}

impl<'a, S: ClanStore> RankEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn top_submissions(
        &self,
        board_id: BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<Submission>, EngineError> {
        let board = self
            .store
            .board(board_id)
            .ok_or(EngineError::UnknownBoard(board_id))?;
        let submissions = self.store.accepted_submissions(board_id);
        let active = self.active_ids();
        Ok(top_submissions(&board, &submissions, &active, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn rank_of(&self, submission_id: SubmissionId) -> Result<Option<usize>, EngineError> {
        let Some(submission) = self.store.submission(submission_id) else {
            return Ok(None);
        };
        let Some(board_id) = submission.kind.board_id() else {
            return Ok(None);
        };
        let board = self
            .store
            .board(board_id)
            .ok_or(EngineError::UnknownBoard(board_id))?;
        let submissions = self.store.accepted_submissions(board_id);
        let active = self.active_ids();
        Ok(rank_of(&board, &submissions, &active, submission_id))
    }

    fn active_ids(&self) -> HashSet<MemberId> {
        self.store.active_members().iter().map(|m| m.id).collect()
    }
}
