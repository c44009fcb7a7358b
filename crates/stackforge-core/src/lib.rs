//! Stack locking and watch rule evaluation for Stackforge.
//!
//! [`StackLock`] gives one engine at a time the right to mutate a stack, stealing
//! the lock from engines that stop answering liveness pings. [`WatchRule`]
//! aggregates submitted metric samples over a sliding window and fires the stack's
//! alarm actions through an [`ActionDispatcher`] when its state changes.

pub mod dispatch;
pub mod excutils;
pub mod stack_lock;
pub mod watchrule;

pub use dispatch::{ActionDispatcher, AlarmTarget, TokioActionDispatcher};
pub use excutils::{is_action_in_progress, ErrorFilter};
pub use stack_lock::{
    generate_engine_id, EngineListener, EngineRegistry, StackLock, StackLockGuard,
    DEFAULT_PING_TIMEOUT,
};
pub use watchrule::{evaluate_all, WatchRule};

use stackforge_schema::{EngineId, StackId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("stack {stack_id} already has an action in progress (held by engine {engine_id})")]
    ActionInProgress {
        stack_id: StackId,
        engine_id: EngineId,
    },
    #[error("unknown watch name {0}")]
    UnknownWatch(String),
    #[error("unknown watch state {0}")]
    UnknownWatchState(String),
    #[error("metric {metric} missing from data for watch {watch}")]
    MissingMetric { watch: String, metric: String },
    #[error("alarm on resource {resource} failed: {message}")]
    ActionFailed { resource: String, message: String },
    #[error("store error: {0}")]
    Store(#[from] stackforge_store::StoreError),
    #[error("config error: {0}")]
    Config(#[from] stackforge_schema::ConfigError),
}
