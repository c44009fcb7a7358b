//! In-memory [`StackContext`] for tests and benchmarks.

use crate::context::{FacadeView, ResourceView, StackContext};
use crate::path::traverse;
use serde_json::{Map, Value};
use stackforge_schema::{ResourceAction, ResourceStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MockResource {
    pub name: String,
    pub action: ResourceAction,
    pub status: ResourceStatus,
    pub physical_id: Option<String>,
    pub attributes: Map<String, Value>,
}

impl MockResource {
    /// A resource that finished creating, with no attributes yet.
    pub fn created(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            action: ResourceAction::Create,
            status: ResourceStatus::Complete,
            physical_id: Some(format!("{name}-id")),
            attributes: Map::new(),
        }
    }

    /// A resource that has not been created yet.
    pub fn pending(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            action: ResourceAction::Init,
            status: ResourceStatus::Complete,
            physical_id: None,
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_state(mut self, action: ResourceAction, status: ResourceStatus) -> Self {
        self.action = action;
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_owned(), value);
        self
    }
}

impl ResourceView for MockResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn action(&self) -> ResourceAction {
        self.action
    }

    fn status(&self) -> ResourceStatus {
        self.status
    }

    fn reference_id(&self) -> String {
        self.physical_id.clone().unwrap_or_else(|| self.name.clone())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    fn attribute(&self, name: &str, path: &[Value]) -> Option<Value> {
        traverse(self.attributes.get(name)?, path).cloned()
    }

    fn attributes(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockFacade {
    pub metadata: Value,
    pub deletion_policy: Value,
    pub update_policy: Value,
}

impl FacadeView for MockFacade {
    fn metadata(&self) -> Value {
        self.metadata.clone()
    }

    fn deletion_policy(&self) -> Value {
        self.deletion_policy.clone()
    }

    fn update_policy(&self) -> Value {
        self.update_policy.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockStack {
    pub parameters: BTreeMap<String, Value>,
    pub resources: BTreeMap<String, MockResource>,
    pub files: BTreeMap<String, String>,
    pub facade: Option<MockFacade>,
}

impl MockStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_owned(), value);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: MockResource) -> Self {
        self.resources.insert(resource.name.clone(), resource);
        self
    }

    #[must_use]
    pub fn with_file(mut self, key: &str, content: &str) -> Self {
        self.files.insert(key.to_owned(), content.to_owned());
        self
    }

    #[must_use]
    pub fn with_facade(mut self, facade: MockFacade) -> Self {
        self.facade = Some(facade);
        self
    }
}

impl StackContext for MockStack {
    fn parameter(&self, name: &str) -> Option<Value> {
        self.parameters.get(name).cloned()
    }

    fn resource(&self, name: &str) -> Option<&dyn ResourceView> {
        self.resources.get(name).map(|r| r as &dyn ResourceView)
    }

    fn file(&self, key: &str) -> Option<&str> {
        self.files.get(key).map(String::as_str)
    }

    fn facade(&self) -> Option<&dyn FacadeView> {
        self.facade.as_ref().map(|f| f as &dyn FacadeView)
    }
}
