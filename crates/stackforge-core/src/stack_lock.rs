//! Per-stack mutual exclusion between engines sharing a lock store.
//!
//! An engine acquires a stack by creating its lock record. When the record is
//! already held by another engine, that engine is pinged on the stack's topic; if
//! it does not answer within the ping timeout the lock is considered stale and is
//! stolen with a compare-and-swap. A failed steal means some other engine moved
//! the record first, so the whole sequence is retried exactly once.

use crate::excutils::ErrorFilter;
use crate::CoreError;
use stackforge_schema::{EngineConfig, EngineId, StackId};
use stackforge_store::LockStore;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);

const ACQUIRE_ATTEMPTS: usize = 2;

/// Fresh identity for this engine process.
pub fn generate_engine_id() -> EngineId {
    EngineId::generate()
}

/// Answers liveness pings addressed to an engine.
pub trait EngineListener: Send + Sync {
    /// Whether `engine_id` is alive and listening on `topic`. Callers bound the
    /// wait with their own timeout; a pending future counts as "not listening".
    fn listening(
        &self,
        engine_id: &EngineId,
        topic: &StackId,
    ) -> impl Future<Output = bool> + Send;
}

/// In-process listener: engines registered here answer every ping.
#[derive(Debug, Default)]
pub struct EngineRegistry {
    live: Mutex<HashSet<EngineId>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, engine_id: &EngineId) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(engine_id.clone());
    }

    pub fn unregister(&self, engine_id: &EngineId) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(engine_id);
    }

    fn is_live(&self, engine_id: &EngineId) -> bool {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(engine_id)
    }
}

impl EngineListener for EngineRegistry {
    fn listening(
        &self,
        engine_id: &EngineId,
        _topic: &StackId,
    ) -> impl Future<Output = bool> + Send {
        let live = self.is_live(engine_id);
        async move { live }
    }
}

pub struct StackLock<S, L> {
    store: Arc<S>,
    listener: Arc<L>,
    stack_id: StackId,
    engine_id: EngineId,
    ping_timeout: Duration,
}

impl<S: LockStore, L: EngineListener> StackLock<S, L> {
    pub fn new(store: Arc<S>, listener: Arc<L>, stack_id: StackId, engine_id: EngineId) -> Self {
        Self {
            store,
            listener,
            stack_id,
            engine_id,
            ping_timeout: DEFAULT_PING_TIMEOUT,
        }
    }

    /// Lock for `stack_id` using the engine id and ping timeout from `config`.
    pub fn from_config(
        config: &EngineConfig,
        store: Arc<S>,
        listener: Arc<L>,
        stack_id: StackId,
    ) -> Self {
        Self::new(store, listener, stack_id, config.engine_id().clone())
            .with_ping_timeout(config.ping_timeout())
    }

    #[must_use]
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn stack_id(&self) -> &StackId {
        &self.stack_id
    }

    pub fn engine_id(&self) -> &EngineId {
        &self.engine_id
    }

    /// Engine currently holding this stack, if any.
    pub fn holder(&self) -> Result<Option<EngineId>, CoreError> {
        Ok(self.store.holder(&self.stack_id)?)
    }

    pub async fn acquire(&self) -> Result<(), CoreError> {
        let mut holder = None;
        for attempt in 1..=ACQUIRE_ATTEMPTS {
            let Some(current) = self.store.create(&self.stack_id, &self.engine_id)? else {
                debug!("engine {} acquired lock on stack {}", self.engine_id, self.stack_id);
                return Ok(());
            };

            if current == self.engine_id {
                debug!(
                    "lock on stack {} is already held by this engine {}",
                    self.stack_id, self.engine_id
                );
                return Err(self.in_progress(current));
            }

            if self.engine_alive(&current).await {
                debug!(
                    "lock on stack {} is owned by active engine {current}",
                    self.stack_id
                );
                return Err(self.in_progress(current));
            }

            info!(
                "stale lock detected on stack {}: engine {current} will be stolen by engine {}",
                self.stack_id, self.engine_id
            );
            if self.store.steal(&self.stack_id, &current, &self.engine_id)? {
                info!(
                    "engine {} successfully stole lock on stack {}",
                    self.engine_id, self.stack_id
                );
                return Ok(());
            }

            debug!(
                "lock on stack {} changed hands during steal (attempt {attempt} of {})",
                self.stack_id, ACQUIRE_ATTEMPTS
            );
            holder = Some(current);
        }

        let holder = match self.store.holder(&self.stack_id)? {
            Some(current) => current,
            None => holder.unwrap_or_else(|| self.engine_id.clone()),
        };
        Err(self.in_progress(holder))
    }

    /// Drop this engine's lock record. Releasing an unheld lock only warns.
    pub fn release(&self) -> Result<(), CoreError> {
        if self.store.release(&self.stack_id, &self.engine_id)? {
            debug!("engine {} released lock on stack {}", self.engine_id, self.stack_id);
        } else {
            warn!("lock on stack {} was already released", self.stack_id);
        }
        Ok(())
    }

    /// Acquire the lock and return a guard that releases it when dropped.
    pub async fn thread_lock(&self) -> Result<StackLockGuard<S>, CoreError> {
        self.acquire().await?;
        Ok(StackLockGuard {
            store: Arc::clone(&self.store),
            stack_id: self.stack_id.clone(),
            engine_id: self.engine_id.clone(),
            released: false,
        })
    }

    /// Like [`thread_lock`](Self::thread_lock), but `Ok(None)` when another
    /// engine holds the stack.
    pub async fn try_thread_lock(&self) -> Result<Option<StackLockGuard<S>>, CoreError> {
        ErrorFilter::action_in_progress().apply(self.thread_lock().await)
    }

    async fn engine_alive(&self, engine_id: &EngineId) -> bool {
        let ping = self.listener.listening(engine_id, &self.stack_id);
        tokio::time::timeout(self.ping_timeout, ping)
            .await
            .unwrap_or(false)
    }

    fn in_progress(&self, engine_id: EngineId) -> CoreError {
        CoreError::ActionInProgress {
            stack_id: self.stack_id.clone(),
            engine_id,
        }
    }
}

/// Held stack lock; released on drop, including during unwinding.
pub struct StackLockGuard<S: LockStore> {
    store: Arc<S>,
    stack_id: StackId,
    engine_id: EngineId,
    released: bool,
}

impl<S: LockStore> StackLockGuard<S> {
    pub fn stack_id(&self) -> &StackId {
        &self.stack_id
    }

    /// Release now and report store failures instead of logging them.
    pub fn release(mut self) -> Result<(), CoreError> {
        self.released = true;
        self.store.release(&self.stack_id, &self.engine_id)?;
        debug!("engine {} released lock on stack {}", self.engine_id, self.stack_id);
        Ok(())
    }
}

impl<S: LockStore> Drop for StackLockGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match self.store.release(&self.stack_id, &self.engine_id) {
            Ok(true) => debug!(
                "engine {} released lock on stack {}",
                self.engine_id, self.stack_id
            ),
            Ok(false) => warn!("lock on stack {} was already released", self.stack_id),
            Err(e) => warn!("failed to release lock on stack {}: {e}", self.stack_id),
        }
    }
}
