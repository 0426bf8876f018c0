// Status transition types and the notification seam.

use serde::{Deserialize, Serialize};

use crate::core::model::MemberId;

/// Direction of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// The member's total rose to or past the threshold.
    CrossedUp,
    /// The member's total fell below the threshold.
    CrossedDown,
}

impl Transition {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CrossedUp => "gained Dragonstone status",
            Self::CrossedDown => "lost Dragonstone status",
        }
    }
}

/// Minimal payload handed to the dispatcher; formatting and transport are
/// the dispatcher's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifySignal {
    pub member: MemberId,
    pub transition: Transition,
    pub current_total: u32,
    pub threshold: u32,
}

/// Delivery seam. Implementations send webhooks or emails; failures are
/// theirs to report and must never affect the ledger, so dispatch has no
/// return channel into the engine.
pub trait NotificationDispatcher {
    fn dispatch(&self, signal: &NotifySignal);
}

/// Default collaborator: just logs the signal.
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn dispatch(&self, signal: &NotifySignal) {
        log::info!(
            "member {} {} ({}/{} points)",
            signal.member,
            signal.transition.display_name(),
            signal.current_total,
            signal.threshold
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_display_names() {
        assert!(Transition::CrossedUp.display_name().contains("gained"));
        assert!(Transition::CrossedDown.display_name().contains("lost"));
    }
}
