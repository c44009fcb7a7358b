//! Read-only views of the stack a template is resolved against.
//!
//! Parsed nodes hold a `&dyn StackContext` borrowed from the owning stack; the
//! stack must outlive every node parsed against it.

use serde_json::Value;
use stackforge_schema::{ResourceAction, ResourceStatus};

pub trait ResourceView: Send + Sync {
    fn name(&self) -> &str;

    fn action(&self) -> ResourceAction;

    fn status(&self) -> ResourceStatus;

    /// Physical id once created; the logical name before that.
    fn reference_id(&self) -> String;

    /// Attribute names declared by the resource type.
    fn attribute_names(&self) -> Vec<String>;

    /// Value of `name`, narrowed by `path`. `None` when no value is available.
    fn attribute(&self, name: &str, path: &[Value]) -> Option<Value>;

    /// All attribute values as a map.
    fn attributes(&self) -> Value;

    /// Whether attribute reads return meaningful values yet.
    fn attributes_readable(&self) -> bool {
        self.action().exposes_attributes() && self.status().is_readable()
    }
}

/// The resource in a parent stack that a provider template stands in for.
pub trait FacadeView: Send + Sync {
    fn metadata(&self) -> Value;

    fn deletion_policy(&self) -> Value;

    fn update_policy(&self) -> Value;
}

pub trait StackContext: Send + Sync {
    fn parameter(&self, name: &str) -> Option<Value>;

    fn resource(&self, name: &str) -> Option<&dyn ResourceView>;

    fn file(&self, key: &str) -> Option<&str>;

    /// Facade resource of the parent stack, for nested provider stacks.
    fn facade(&self) -> Option<&dyn FacadeView> {
        None
    }
}
