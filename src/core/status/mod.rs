// Dragonstone status module.
//
// Architecture:
// - model.rs: Transition signals and the dispatcher seam
// - watcher.rs: Before/after threshold-crossing detection
// - sweep.rs: Periodic expiration-driven crossing detection

pub mod model;
pub mod sweep;
pub mod watcher;
