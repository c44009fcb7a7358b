//! Template function resolution and property translation for Stackforge.
//!
//! Templates are parsed against a [`Template`] (version + digest policy) and a
//! borrowed [`StackContext`] into a [`Node`] tree. Nodes resolve lazily into plain
//! `serde_json::Value`s, validate their arguments, and enumerate the resource
//! attributes they depend on without evaluating them. Attribute lookups on
//! resources that are not readable yet resolve to `null` instead of failing, so the
//! convergence loop can re-check later.
//!
//! The [`translation`] module rewrites deprecated property spellings into current
//! ones before property validation, resolving `get_param` references on the way.

pub mod context;
pub mod digest;
pub mod functions;
pub mod mock;
pub mod node;
pub mod path;
pub mod properties;
pub mod translation;
pub mod version;

pub use context::{FacadeView, ResourceView, StackContext};
pub use node::{AttributeDependency, FunctionNode, Node};
pub use properties::{PropertySchema, PropertyType};
pub use translation::{
    translate_properties, ClientPlugin, RuleKind, TranslationError, TranslationRule,
};
pub use version::{FunctionKind, Template, TemplateVersion};

use thiserror::Error;

/// Coarse category of a [`TemplateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed function arguments, unknown algorithm, removed function.
    Validation,
    /// Unresolvable parameter, resource or file reference.
    MissingReference,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("{function}: {message}")]
    Invalid { function: String, message: String },
    #[error("the parameter ({0}) was not provided")]
    MissingParameter(String),
    #[error("the specified reference \"{resource}\" (in {key}) is incorrect")]
    UnknownResource { resource: String, key: String },
    #[error("the referenced attribute ({resource} {attribute}) is incorrect")]
    UnknownAttribute { resource: String, attribute: String },
    #[error("no content found in the \"files\" section for {function} path: {key}")]
    MissingFile { function: String, key: String },
    #[error("the function {0} is not supported in this version of HOT")]
    Removed(String),
    #[error("{0} is only valid inside a provider template with a facade resource")]
    NoFacade(String),
    #[error("unknown template version: {0}")]
    UnknownVersion(String),
}

impl TemplateError {
    pub(crate) fn invalid(function: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            function: function.to_owned(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::MissingParameter(_)
            | TemplateError::UnknownResource { .. }
            | TemplateError::MissingFile { .. }
            | TemplateError::NoFacade(_) => ErrorKind::MissingReference,
            TemplateError::Invalid { .. }
            | TemplateError::UnknownAttribute { .. }
            | TemplateError::Removed(_)
            | TemplateError::UnknownVersion(_) => ErrorKind::Validation,
        }
    }
}
