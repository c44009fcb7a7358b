use serde::{Deserialize, Serialize};

/// The last action the engine ran against a resource or stack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceAction {
    Init,
    Create,
    Delete,
    Update,
    Rollback,
    Suspend,
    Resume,
    Adopt,
    Snapshot,
    Check,
}

impl ResourceAction {
    /// Actions after which a resource's attributes can be read.
    pub fn exposes_attributes(self) -> bool {
        matches!(
            self,
            ResourceAction::Create
                | ResourceAction::Adopt
                | ResourceAction::Suspend
                | ResourceAction::Resume
                | ResourceAction::Update
        )
    }
}

impl std::fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceAction::Init => "INIT",
            ResourceAction::Create => "CREATE",
            ResourceAction::Delete => "DELETE",
            ResourceAction::Update => "UPDATE",
            ResourceAction::Rollback => "ROLLBACK",
            ResourceAction::Suspend => "SUSPEND",
            ResourceAction::Resume => "RESUME",
            ResourceAction::Adopt => "ADOPT",
            ResourceAction::Snapshot => "SNAPSHOT",
            ResourceAction::Check => "CHECK",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    InProgress,
    Failed,
    Complete,
}

impl ResourceStatus {
    /// Statuses in which attribute values are meaningful.
    pub fn is_readable(self) -> bool {
        matches!(self, ResourceStatus::InProgress | ResourceStatus::Complete)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::InProgress => write!(f, "IN_PROGRESS"),
            ResourceStatus::Failed => write!(f, "FAILED"),
            ResourceStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

/// Combined action and status of a stack, e.g. `CREATE_COMPLETE`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackStatus {
    pub action: ResourceAction,
    pub status: ResourceStatus,
}

impl StackStatus {
    pub fn new(action: ResourceAction, status: ResourceStatus) -> Self {
        Self { action, status }
    }

    /// Alarm actions are only delivered to stacks that finished a create or update.
    pub fn accepts_alarms(self) -> bool {
        self.status == ResourceStatus::Complete
            && matches!(self.action, ResourceAction::Create | ResourceAction::Update)
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.action, self.status)
    }
}
