use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::config::Settings;
use super::error::EngineError;
use super::model::{MemberId, SubmissionId, SubmissionStatus};
use super::points::model::{EntryId, EntryKind, LedgerEntry, MonthlyRank, NewEntry};
use super::points::rules::{entries_for_submission, PointRules};
use super::status::model::{NotificationDispatcher, NotifySignal};
use super::status::sweep::{run_expiration_sweep, SweepOutcome};
use super::status::watcher::ThresholdWatcher;
use super::store::ClanStore;

/// Wires the review/grant flow together: validate, materialize ledger
/// entries, apply the atomic store write, then run the per-member threshold
/// checks and hand any signals to the dispatcher.
///
/// Dispatch is fire-and-forget: a delivery problem is the dispatcher's to
/// report and never rolls back an accepted submission or a ledger entry.
pub struct Coordinator<'a, S: ClanStore, D: NotificationDispatcher> {
    store: &'a mut S,
    settings: &'a Settings,
    rules: &'a PointRules,
    dispatcher: &'a D,
}

impl<'a, S: ClanStore, D: NotificationDispatcher> Coordinator<'a, S, D> {
    pub fn new(
        store: &'a mut S,
        settings: &'a Settings,
        rules: &'a PointRules,
        dispatcher: &'a D,
    ) -> Self {
        Self {
            store,
            settings,
            rules,
            dispatcher,
        }
    }

    /// Accept a pending submission: validate the team against its board,
    /// materialize the ledger entries it earns, apply both as one atomic
    /// store write, then check each credited member for a threshold
    /// crossing. Returns the signals that fired (already dispatched).
    pub fn accept_submission(
        &mut self,
        id: SubmissionId,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        let submission = self
            .store
            .submission(id)
            .ok_or(EngineError::UnknownSubmission(id))?;
        if submission.status != SubmissionStatus::Pending {
            return Err(EngineError::StaleSnapshotRace);
        }

        if let Some(board_id) = submission.kind.board_id() {
            let board = self
                .store
                .board(board_id)
                .ok_or(EngineError::UnknownBoard(board_id))?;
            if submission.team.len() != board.team_size {
                return Err(EngineError::MalformedTeam {
                    submission: id,
                    expected: board.team_size,
                    actual: submission.team.len(),
                });
            }
        }

        let entries = entries_for_submission(&submission, self.rules, now)?;
        let persisted = self.store.accept_with_entries(id, entries)?;
        log::info!(
            "accepted submission {} ({}) with {} ledger entries",
            id,
            submission.kind.display_name(),
            persisted.len()
        );

        self.check_and_dispatch(&persisted, now)
    }

    /// Deny a pending submission. No ledger effect.
    pub fn deny_submission(&mut self, id: SubmissionId) -> Result<(), EngineError> {
        let submission = self
            .store
            .submission(id)
            .ok_or(EngineError::UnknownSubmission(id))?;
        if submission.status != SubmissionStatus::Pending {
            return Err(EngineError::StaleSnapshotRace);
        }
        self.store.mark_denied(id)?;
        log::info!("denied submission {}", id);
        Ok(())
    }

    /// Admin grant with a caller-chosen value.
    pub fn grant_manual(
        &mut self,
        member: MemberId,
        points: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        self.grant(member, EntryKind::ManualGrant, points, now)
    }

    /// Points for bringing in a new member.
    pub fn grant_recruitment(
        &mut self,
        member: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        self.grant(member, EntryKind::Recruitment, self.rules.recruitment, now)
    }

    /// Points for placing in the monthly clan awards.
    pub fn award_monthly_rank(
        &mut self,
        member: MemberId,
        rank: MonthlyRank,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        let points = self.rules.monthly_rank_points(rank)?;
        self.grant(member, EntryKind::MonthlyRank(rank), points, now)
    }

    fn grant(
        &mut self,
        member: MemberId,
        kind: EntryKind,
        points: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        let persisted = self.store.append_entries(vec![NewEntry {
            member,
            kind,
            points,
            earned_at: now,
            source_submission: None,
        }])?;
        log::info!(
            "granted {} points to member {} ({})",
            points,
            member,
            kind.display_name()
        );
        self.check_and_dispatch(&persisted, now)
    }

    /// Run the expiration sweep and dispatch every signal it finds.
    pub fn run_sweep(&mut self, now: DateTime<Utc>) -> Result<SweepOutcome, EngineError> {
        let outcome = run_expiration_sweep(&*self.store, self.settings, now)?;
        log::info!(
            "expiration sweep checked {} members, {} crossings",
            outcome.members_checked,
            outcome.signals.len()
        );
        for signal in &outcome.signals {
            self.dispatcher.dispatch(signal);
        }
        Ok(outcome)
    }

    /// One independent crossing check per member credited by the new
    /// entries; simultaneous crossings fire one signal each.
    fn check_and_dispatch(
        &self,
        new_entries: &[LedgerEntry],
        now: DateTime<Utc>,
    ) -> Result<Vec<NotifySignal>, EngineError> {
        let mut per_member: HashMap<MemberId, HashSet<EntryId>> = HashMap::new();
        for entry in new_entries {
            per_member.entry(entry.member).or_default().insert(entry.id);
        }

        let watcher = ThresholdWatcher::new(&*self.store, self.settings);
        let mut signals = Vec::new();
        for (member, entry_ids) in per_member {
            if let Some(signal) = watcher.check_transition(member, &entry_ids, now)? {
                self.dispatcher.dispatch(&signal);
                signals.push(signal);
            }
        }
        Ok(signals)
    }
}
