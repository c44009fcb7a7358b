use crate::context::StackContext;
use crate::functions;
use crate::version::{FunctionKind, Template};
use crate::TemplateError;
use serde_json::{Map, Value};
use stackforge_schema::ResourceName;
use std::sync::OnceLock;

/// One attribute (optionally narrowed by a path) that a node reads from a
/// resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDependency {
    pub resource: ResourceName,
    pub attribute: String,
    pub path: Vec<Value>,
}

/// A parsed template snippet.
///
/// Maps with exactly one key naming a function of the template version become
/// [`FunctionNode`]s; everything else is kept structurally.
#[derive(Debug)]
pub enum Node<'a> {
    Literal(Value),
    List(Vec<Node<'a>>),
    Map(Vec<(String, Node<'a>)>),
    Function(Box<FunctionNode<'a>>),
}

impl<'a> Node<'a> {
    pub fn parse(
        raw: &Value,
        template: &'a Template,
        stack: &'a dyn StackContext,
    ) -> Result<Self, TemplateError> {
        match raw {
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((name, args)) = map.iter().next() {
                        if let Some(kind) = template.version.function(name) {
                            let args = Node::parse(args, template, stack)?;
                            let node = FunctionNode::new(kind, name, args, template, stack)?;
                            return Ok(Node::Function(Box::new(node)));
                        }
                    }
                }
                let entries = map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Node::parse(v, template, stack)?)))
                    .collect::<Result<Vec<_>, TemplateError>>()?;
                Ok(Node::Map(entries))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| Node::parse(item, template, stack))
                .collect::<Result<Vec<_>, _>>()
                .map(Node::List),
            scalar => Ok(Node::Literal(scalar.clone())),
        }
    }

    /// Resolve every function in the tree into a plain value.
    pub fn resolve(&self) -> Result<Value, TemplateError> {
        let mut ready = true;
        self.resolve_tracked(&mut ready)
    }

    /// Resolve, clearing `ready` if any attribute in the tree was not available yet.
    pub(crate) fn resolve_tracked(&self, ready: &mut bool) -> Result<Value, TemplateError> {
        match self {
            Node::Literal(v) => Ok(v.clone()),
            Node::List(items) => items
                .iter()
                .map(|item| item.resolve_tracked(ready))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Node::Map(entries) => {
                let mut out = Map::with_capacity(entries.len());
                for (key, node) in entries {
                    out.insert(key.clone(), node.resolve_tracked(ready)?);
                }
                Ok(Value::Object(out))
            }
            Node::Function(f) => f.result_tracked(ready),
        }
    }

    /// Validate every function in the tree without resolving it.
    pub fn validate(&self) -> Result<(), TemplateError> {
        match self {
            Node::Literal(_) => Ok(()),
            Node::List(items) => items.iter().try_for_each(Node::validate),
            Node::Map(entries) => entries.iter().try_for_each(|(_, node)| node.validate()),
            Node::Function(f) => f.validate(),
        }
    }

    /// Resources this tree references, in first-seen order.
    pub fn dependencies(&self) -> Result<Vec<ResourceName>, TemplateError> {
        let mut out = Vec::new();
        self.collect_dependencies(&mut out)?;
        Ok(out)
    }

    /// Every attribute dependency in the tree, in first-seen order.
    pub fn all_dep_attrs(&self) -> Result<Vec<AttributeDependency>, TemplateError> {
        let mut out = Vec::new();
        self.collect_dep_attrs(&mut out)?;
        Ok(out)
    }

    /// Attribute dependencies on one resource.
    pub fn dep_attrs(&self, resource: &str) -> Result<Vec<AttributeDependency>, TemplateError> {
        Ok(self
            .all_dep_attrs()?
            .into_iter()
            .filter(|dep| dep.resource == resource)
            .collect())
    }

    pub(crate) fn collect_dependencies(
        &self,
        out: &mut Vec<ResourceName>,
    ) -> Result<(), TemplateError> {
        match self {
            Node::Literal(_) => Ok(()),
            Node::List(items) => items
                .iter()
                .try_for_each(|item| item.collect_dependencies(out)),
            Node::Map(entries) => entries
                .iter()
                .try_for_each(|(_, node)| node.collect_dependencies(out)),
            Node::Function(f) => {
                f.args.collect_dependencies(out)?;
                if let Some(name) = functions::referenced_resource(f)? {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
                Ok(())
            }
        }
    }

    pub(crate) fn collect_dep_attrs(
        &self,
        out: &mut Vec<AttributeDependency>,
    ) -> Result<(), TemplateError> {
        match self {
            Node::Literal(_) => Ok(()),
            Node::List(items) => items.iter().try_for_each(|item| item.collect_dep_attrs(out)),
            Node::Map(entries) => entries
                .iter()
                .try_for_each(|(_, node)| node.collect_dep_attrs(out)),
            Node::Function(f) => {
                f.args.collect_dep_attrs(out)?;
                for dep in functions::attribute_dependencies(f)? {
                    if !out.contains(&dep) {
                        out.push(dep);
                    }
                }
                Ok(())
            }
        }
    }

    /// True when the tree contains no functions.
    pub fn is_static(&self) -> bool {
        match self {
            Node::Literal(_) => true,
            Node::List(items) => items.iter().all(Node::is_static),
            Node::Map(entries) => entries.iter().all(|(_, node)| node.is_static()),
            Node::Function(_) => false,
        }
    }

    pub fn as_list(&self) -> Option<&[Node<'a>]> {
        match self {
            Node::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node<'a>> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionNode<'a>> {
        match self {
            Node::Function(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn is_string_literal(&self) -> bool {
        matches!(self, Node::Literal(Value::String(_)))
    }
}

/// An intrinsic function call with its unresolved argument tree.
///
/// The result is computed on first use and cached once it no longer depends on
/// attributes that were unavailable.
pub struct FunctionNode<'a> {
    pub(crate) kind: FunctionKind,
    pub(crate) name: String,
    pub(crate) args: Node<'a>,
    pub(crate) template: &'a Template,
    pub(crate) stack: &'a dyn StackContext,
    cached: OnceLock<Value>,
}

impl std::fmt::Debug for FunctionNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionNode")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl<'a> FunctionNode<'a> {
    pub(crate) fn new(
        kind: FunctionKind,
        name: &str,
        args: Node<'a>,
        template: &'a Template,
        stack: &'a dyn StackContext,
    ) -> Result<Self, TemplateError> {
        let node = Self {
            kind,
            name: name.to_owned(),
            args,
            template,
            stack,
            cached: OnceLock::new(),
        };
        functions::check_args(&node)?;
        Ok(node)
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &Node<'a> {
        &self.args
    }

    pub fn result(&self) -> Result<Value, TemplateError> {
        let mut ready = true;
        self.result_tracked(&mut ready)
    }

    pub(crate) fn result_tracked(&self, ready: &mut bool) -> Result<Value, TemplateError> {
        if let Some(value) = self.cached.get() {
            return Ok(value.clone());
        }
        let mut own_ready = true;
        let value = functions::evaluate(self, &mut own_ready)?;
        if own_ready {
            let _ = self.cached.set(value.clone());
        } else {
            *ready = false;
        }
        Ok(value)
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        self.args.validate()?;
        functions::validate(self)
    }

    /// Whether a resolved value has been cached.
    pub fn is_memoized(&self) -> bool {
        self.cached.get().is_some()
    }
}
