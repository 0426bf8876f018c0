// Engine error types. All errors are local and synchronous; retry policy
// belongs to the caller (or the storage layer, for write conflicts).

use thiserror::Error;

use super::model::{BoardId, MemberId, SubmissionId};
use super::points::model::EntryId;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A board-bound submission's team does not match the board's required
    /// size. Fatal to that submission; it never enters a ranking pool.
    #[error("submission {submission} has a team of {actual}, board requires {expected}")]
    MalformedTeam {
        submission: SubmissionId,
        expected: usize,
        actual: usize,
    },

    /// A point rule table has no row for the requested combination. Never
    /// silently worth zero; the missing rule has to be fixed.
    #[error("no point rule for {rule}")]
    UnknownRuleLookup { rule: String },

    /// An exclusion set referenced an entry that does not belong to the
    /// member being totalled. This is a caller bug.
    #[error("entry {entry} is not owned by member {member}")]
    InconsistentExclusionSet { member: MemberId, entry: EntryId },

    /// The storage layer observed a conflicting write while applying the
    /// atomic accept-and-ledger-write. The caller may retry; the engine
    /// never does.
    #[error("write conflict while applying review")]
    StaleSnapshotRace,

    #[error("unknown submission id {0}")]
    UnknownSubmission(SubmissionId),

    #[error("unknown board id {0}")]
    UnknownBoard(BoardId),

    #[error("unknown member id {0}")]
    UnknownMember(MemberId),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("settings i/o failed: {0}")]
    Config(#[from] std::io::Error),
}
