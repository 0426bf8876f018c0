#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod core;

pub use crate::core::config::{ConfigManager, Settings};
pub use crate::core::coordinator::Coordinator;
pub use crate::core::error::EngineError;
pub use crate::core::points::rules::PointRules;
pub use crate::core::rank::RankEngine;
pub use crate::core::status::model::{
    LogDispatcher, NotificationDispatcher, NotifySignal, Transition,
};
pub use crate::core::store::{ClanStore, MemoryStore};
