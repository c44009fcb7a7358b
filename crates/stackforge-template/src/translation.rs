//! Rewrites deprecated property spellings into current ones before the
//! properties are validated.
//!
//! Rules run in declaration order against the raw property tree. Each rule walks
//! its path through maps, fanning out over every element of a list it meets on
//! the way. `get_param` references found on the path are resolved first so the
//! rule sees the structure the parameter stands for; a parameter that cannot be
//! resolved yet leaves that subtree untouched.

use crate::context::StackContext;
use crate::properties::{PropertySchema, PropertyType};
use crate::version::{FunctionKind, Template};
use crate::TemplateError;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("invalid translation rule: {0}")]
    InvalidRule(String),
    #[error("cannot define the following properties at the same time: {key}, {name}")]
    Conflict { key: String, name: String },
    #[error("{0}")]
    Unsupported(String),
    #[error("add rule must be used only for lists, {0} is not a list")]
    NotAList(String),
    #[error("finder {finder} could not resolve {value}: {message}")]
    Finder {
        finder: String,
        value: String,
        message: String,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Lookup capability of a service client, used by resolve rules to turn names
/// into ids.
pub trait ClientPlugin: Send + Sync {
    fn find(&self, finder: &str, entity: Option<&str>, value: &str)
        -> Result<String, TranslationError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Add,
    Replace,
    Delete,
    Resolve,
}

#[derive(Clone)]
struct Finder {
    client: Arc<dyn ClientPlugin>,
    method: String,
    entity: Option<String>,
}

impl Finder {
    fn find(&self, value: &str) -> Result<String, TranslationError> {
        self.client.find(&self.method, self.entity.as_deref(), value)
    }
}

#[derive(Clone)]
pub struct TranslationRule {
    kind: RuleKind,
    path: Vec<String>,
    value: Option<Value>,
    value_name: Option<String>,
    value_path: Option<Vec<String>>,
    finder: Option<Finder>,
}

impl fmt::Debug for TranslationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationRule")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("value", &self.value)
            .field("value_name", &self.value_name)
            .field("value_path", &self.value_path)
            .field("finder", &self.finder.as_ref().map(|f| &f.method))
            .finish()
    }
}

impl TranslationRule {
    pub fn new(kind: RuleKind, path: &[&str]) -> Self {
        Self {
            kind,
            path: path.iter().map(|k| (*k).to_owned()).collect(),
            value: None,
            value_name: None,
            value_path: None,
            finder: None,
        }
    }

    /// Literal value: the items to append for Add, the replacement for Replace.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sibling key, next to the target, whose value is used.
    #[must_use]
    pub fn with_value_name(mut self, name: &str) -> Self {
        self.value_name = Some(name.to_owned());
        self
    }

    /// Path from the property root to the value that is used.
    #[must_use]
    pub fn with_value_path(mut self, path: &[&str]) -> Self {
        self.value_path = Some(path.iter().map(|k| (*k).to_owned()).collect());
        self
    }

    #[must_use]
    pub fn with_finder(
        mut self,
        client: Arc<dyn ClientPlugin>,
        method: &str,
        entity: Option<&str>,
    ) -> Self {
        self.finder = Some(Finder {
            client,
            method: method.to_owned(),
            entity: entity.map(str::to_owned),
        });
        self
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn validate(&self) -> Result<(), TranslationError> {
        let invalid = |msg: &str| -> Result<(), TranslationError> {
            Err(TranslationError::InvalidRule(msg.to_owned()))
        };

        if self.path.is_empty() {
            return invalid("path must be a non-empty list of keys");
        }
        if self.value_path.as_ref().is_some_and(Vec::is_empty) {
            return invalid("value_path must be a non-empty list of keys");
        }
        if self.value_name.is_some() && !matches!(self.kind, RuleKind::Add | RuleKind::Replace) {
            return invalid("use value_name only for add and replace rules");
        }

        match self.kind {
            RuleKind::Add => {
                let literal_or_path = self.value.is_some() || self.value_path.is_some();
                if literal_or_path == self.value_name.is_some() {
                    return invalid(
                        "exactly one of value, value_name or value_path is required for an add rule",
                    );
                }
                if self.value.as_ref().is_some_and(|v| !v.is_array()) {
                    return invalid("value must be a list for an add rule");
                }
            }
            RuleKind::Replace => {
                if self.value.is_none() && self.value_name.is_none() && self.value_path.is_none() {
                    return invalid(
                        "either value, value_name or value_path is required for a replace rule",
                    );
                }
            }
            RuleKind::Resolve => {
                if self.finder.is_none() {
                    return invalid("a client plugin and finder are required for a resolve rule");
                }
            }
            RuleKind::Delete => {}
        }
        Ok(())
    }

    /// Apply the rule to `props` in place.
    pub fn execute(
        &self,
        props: &mut Map<String, Value>,
        schema: &PropertySchema,
        template: &Template,
        stack: &dyn StackContext,
    ) -> Result<(), TranslationError> {
        let pass = Pass {
            rule: self,
            template,
            stack,
        };

        let from_path = match &self.value_path {
            Some(path) => match pass.value_at(props, path)? {
                Lookup::Found(value) => Some(value),
                Lookup::Missing => None,
                Lookup::Skip => {
                    debug!(path = ?self.path, value_path = ?path, "translation skipped, source unresolved");
                    return Ok(());
                }
            },
            None => None,
        };

        let source = Source {
            value: from_path.clone().or_else(|| self.value.clone()),
            from_path: from_path.is_some(),
            name: self
                .value_path
                .as_ref()
                .and_then(|p| p.last())
                .cloned()
                .unwrap_or_default(),
        };

        if matches!(self.kind, RuleKind::Add | RuleKind::Replace)
            && source.value.is_none()
            && self.value_name.is_none()
        {
            return Ok(());
        }

        let written = pass.apply(props, &self.path, Some(schema), &source)?;

        if written && source.from_path && self.kind == RuleKind::Replace {
            if let Some(path) = &self.value_path {
                remove_at(props, path);
            }
        }
        Ok(())
    }
}

/// Validate every rule, then apply them in order.
pub fn translate_properties(
    props: &mut Map<String, Value>,
    rules: &[TranslationRule],
    schema: &PropertySchema,
    template: &Template,
    stack: &dyn StackContext,
) -> Result<(), TranslationError> {
    for rule in rules {
        rule.validate()?;
    }
    for rule in rules {
        rule.execute(props, schema, template, stack)?;
    }
    Ok(())
}

struct Pass<'r> {
    rule: &'r TranslationRule,
    template: &'r Template,
    stack: &'r dyn StackContext,
}

struct Source {
    value: Option<Value>,
    from_path: bool,
    name: String,
}

enum Lookup {
    Found(Value),
    Missing,
    Skip,
}

impl Pass<'_> {
    fn value_at(
        &self,
        props: &mut Map<String, Value>,
        path: &[String],
    ) -> Result<Lookup, TranslationError> {
        let Some((key, rest)) = path.split_first() else {
            return Ok(Lookup::Missing);
        };
        if !self.resolve_slot(props, key)? {
            return Ok(Lookup::Skip);
        }
        if rest.is_empty() {
            return Ok(match props.get(key) {
                Some(value) if is_populated(value) => Lookup::Found(value.clone()),
                _ => Lookup::Missing,
            });
        }
        match props.get_mut(key) {
            Some(Value::Object(child)) => self.value_at(child, rest),
            Some(Value::Array(_)) => Err(TranslationError::Unsupported(
                "cannot use value_path for properties inside list-type properties".to_owned(),
            )),
            _ => Ok(Lookup::Missing),
        }
    }

    /// Walk `path` below `data`; true if the rule wrote anything.
    fn apply(
        &self,
        data: &mut Map<String, Value>,
        path: &[String],
        schema: Option<&PropertySchema>,
        source: &Source,
    ) -> Result<bool, TranslationError> {
        let Some((key, rest)) = path.split_first() else {
            return Ok(false);
        };
        if !self.resolve_slot(data, key)? {
            debug!(path = ?self.rule.path, key = %key, "translation skipped, parameter unresolved");
            return Ok(false);
        }
        if rest.is_empty() {
            return self.apply_to(data, key, schema, source);
        }

        if data.get(key).is_none_or(Value::is_null) {
            if self.skips_missing() {
                return Ok(false);
            }
            match schema.and_then(|s| s.get(key)) {
                Some(PropertyType::Map(_)) => {
                    data.insert(key.clone(), Value::Object(Map::new()));
                }
                _ => return Ok(false),
            }
        }

        let child_schema = schema.and_then(|s| s.child(key));
        match data.get_mut(key) {
            Some(Value::Object(child)) => self.apply(child, rest, child_schema, source),
            Some(Value::Array(items)) => {
                let mut written = false;
                for item in items {
                    if let Value::Object(child) = item {
                        written |= self.apply(child, rest, child_schema, source)?;
                    }
                }
                Ok(written)
            }
            _ => Ok(false),
        }
    }

    fn skips_missing(&self) -> bool {
        match self.rule.kind {
            RuleKind::Delete | RuleKind::Resolve => true,
            RuleKind::Replace => self.rule.value_name.is_some(),
            RuleKind::Add => false,
        }
    }

    fn apply_to(
        &self,
        data: &mut Map<String, Value>,
        key: &str,
        schema: Option<&PropertySchema>,
        source: &Source,
    ) -> Result<bool, TranslationError> {
        match self.rule.kind {
            RuleKind::Add => self.add(data, key, schema, source),
            RuleKind::Replace => self.replace(data, key, source),
            RuleKind::Delete => Ok(data.remove(key).is_some()),
            RuleKind::Resolve => self.resolve(data, key),
        }
    }

    fn add(
        &self,
        data: &mut Map<String, Value>,
        key: &str,
        schema: Option<&PropertySchema>,
        source: &Source,
    ) -> Result<bool, TranslationError> {
        let addition = match &self.rule.value_name {
            Some(name) => match data.get(name) {
                Some(value) if !value.is_null() => value.clone(),
                _ => return Ok(false),
            },
            None => match &source.value {
                Some(value) => value.clone(),
                None => return Ok(false),
            },
        };
        let items = match addition {
            Value::Array(items) => items,
            other => vec![other],
        };

        match data.get_mut(key) {
            Some(Value::Array(list)) => {
                list.extend(items);
                Ok(true)
            }
            Some(value) if !value.is_null() => Err(TranslationError::NotAList(key.to_owned())),
            _ => {
                if schema
                    .and_then(|s| s.get(key))
                    .is_some_and(PropertyType::is_list)
                {
                    data.insert(key.to_owned(), Value::Array(items));
                    Ok(true)
                } else {
                    Err(TranslationError::NotAList(key.to_owned()))
                }
            }
        }
    }

    fn replace(
        &self,
        data: &mut Map<String, Value>,
        key: &str,
        source: &Source,
    ) -> Result<bool, TranslationError> {
        let target_set = data.get(key).is_some_and(is_populated);

        if let Some(name) = &self.rule.value_name {
            if target_set && data.get(name).is_some_and(is_populated) {
                return Err(TranslationError::Conflict {
                    key: key.to_owned(),
                    name: name.clone(),
                });
            }
            return match data.remove(name) {
                Some(sibling) if !sibling.is_null() => {
                    data.insert(key.to_owned(), sibling);
                    Ok(true)
                }
                _ => match &source.value {
                    Some(value) => {
                        data.insert(key.to_owned(), value.clone());
                        Ok(true)
                    }
                    None => Ok(false),
                },
            };
        }

        let Some(value) = &source.value else {
            return Ok(false);
        };
        if source.from_path && target_set {
            return Err(TranslationError::Conflict {
                key: key.to_owned(),
                name: source.name.clone(),
            });
        }
        data.insert(key.to_owned(), value.clone());
        Ok(true)
    }

    fn resolve(&self, data: &mut Map<String, Value>, key: &str) -> Result<bool, TranslationError> {
        let Some(finder) = &self.rule.finder else {
            return Ok(false);
        };
        let Some(current) = data.get(key) else {
            return Ok(false);
        };

        let current = match self.function_kind(current) {
            // References to other resources resolve to ids already.
            Some(FunctionKind::GetResource) => return Ok(false),
            Some(_) => self.template.resolve(current, self.stack)?,
            None => current.clone(),
        };

        let resolved = match current {
            Value::String(name) if !name.is_empty() => Value::String(finder.find(&name)?),
            Value::Array(items) if !items.is_empty() => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(name) if !name.is_empty() => {
                            finder.find(&name).map(Value::String)
                        }
                        other => Ok(other),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Ok(false),
        };
        data.insert(key.to_owned(), resolved);
        Ok(true)
    }

    /// Resolve a `get_param` stored at `data[key]`; false when the subtree must
    /// be left alone.
    fn resolve_slot(
        &self,
        data: &mut Map<String, Value>,
        key: &str,
    ) -> Result<bool, TranslationError> {
        match data.get_mut(key) {
            Some(slot) => self.resolve_param(slot),
            None => Ok(true),
        }
    }

    fn resolve_param(&self, value: &mut Value) -> Result<bool, TranslationError> {
        match self.function_kind(value) {
            // Left for validation to report.
            Some(FunctionKind::Removed) => Ok(false),
            Some(FunctionKind::GetParam) => match self.template.resolve(value, self.stack) {
                Ok(resolved) => {
                    *value = resolved;
                    Ok(true)
                }
                Err(TemplateError::MissingParameter(name)) => {
                    debug!(parameter = %name, "parameter not available for translation");
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            },
            Some(_) => Ok(true),
            None => {
                if let Value::Array(items) = value {
                    for item in items {
                        if !self.resolve_param(item)? {
                            return Ok(false);
                        }
                    }
                }
                Ok(true)
            }
        }
    }

    fn function_kind(&self, value: &Value) -> Option<FunctionKind> {
        match value {
            Value::Object(map) if map.len() == 1 => map
                .keys()
                .next()
                .and_then(|name| self.template.version.function(name)),
            _ => None,
        }
    }
}

fn remove_at(props: &mut Map<String, Value>, path: &[String]) {
    match path {
        [] => {}
        [last] => {
            props.remove(last);
        }
        [key, rest @ ..] => {
            if let Some(Value::Object(child)) = props.get_mut(key) {
                remove_at(child, rest);
            }
        }
    }
}

/// Whether a property counts as supplied: not null and not empty.
fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => true,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
