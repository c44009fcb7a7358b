//! Delivery of watch rule actions to the resources of a stack.

use crate::CoreError;
use stackforge_schema::{StackId, StackStatus};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// What a watch rule needs from the stack it belongs to.
pub trait ActionDispatcher: Send + Sync {
    /// Current status of the stack, `None` when it no longer exists.
    fn stack_status(&self, stack_id: &StackId) -> Option<StackStatus>;

    /// Fire the alarm of resource `action` without waiting for it to finish.
    fn dispatch(&self, stack_id: &StackId, action: &str);
}

/// The stacks a [`TokioActionDispatcher`] delivers alarms into.
pub trait AlarmTarget: Send + Sync + 'static {
    fn stack_status(&self, stack_id: &StackId) -> Option<StackStatus>;

    /// Run the alarm handler of `resource` in `stack_id`.
    fn alarm(
        &self,
        stack_id: &StackId,
        resource: &str,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Dispatches each action as its own task on a tokio runtime. Failures are
/// logged; the watch rule never waits for them.
pub struct TokioActionDispatcher<T> {
    target: Arc<T>,
    handle: Handle,
}

impl<T: AlarmTarget> TokioActionDispatcher<T> {
    pub fn new(target: Arc<T>, handle: Handle) -> Self {
        Self { target, handle }
    }

    /// Dispatcher on the runtime the caller is running in.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current(target: Arc<T>) -> Self {
        Self::new(target, Handle::current())
    }
}

impl<T: AlarmTarget> ActionDispatcher for TokioActionDispatcher<T> {
    fn stack_status(&self, stack_id: &StackId) -> Option<StackStatus> {
        self.target.stack_status(stack_id)
    }

    fn dispatch(&self, stack_id: &StackId, action: &str) {
        let target = Arc::clone(&self.target);
        let stack_id = stack_id.clone();
        let resource = action.to_owned();
        debug!("dispatching alarm {resource} on stack {stack_id}");
        self.handle.spawn(async move {
            if let Err(e) = target.alarm(&stack_id, &resource).await {
                warn!("alarm {resource} on stack {stack_id} failed: {e}");
            }
        });
    }
}
