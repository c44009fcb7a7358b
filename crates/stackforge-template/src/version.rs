use crate::context::StackContext;
use crate::node::Node;
use crate::TemplateError;
use serde_json::Value;
use std::str::FromStr;

/// Intrinsic function implementations a function name can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    GetParam,
    GetResource,
    GetAttr,
    GetAttrAll,
    Join,
    JoinMultiple,
    Replace,
    ReplaceJson,
    GetFile,
    Repeat,
    RepeatWithMap,
    Digest,
    StrSplit,
    MapMerge,
    MapReplace,
    Equals,
    ResourceFacade,
    Removed,
}

/// Supported `heat_template_version` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateVersion {
    V2015_04_30,
    V2016_10_14,
}

const REMOVED_CFN_FUNCTIONS: &[&str] = &[
    "Fn::GetAZs",
    "Fn::Join",
    "Fn::Base64",
    "Fn::Split",
    "Fn::Select",
    "Fn::Replace",
    "Fn::MemberListToMap",
    "Fn::ResourceFacade",
    "Fn::GetAtt",
    "Ref",
];

impl TemplateVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateVersion::V2015_04_30 => "2015-04-30",
            TemplateVersion::V2016_10_14 => "2016-10-14",
        }
    }

    /// The function a key names in this version, if any.
    pub fn function(self, name: &str) -> Option<FunctionKind> {
        let common = match name {
            "get_param" => Some(FunctionKind::GetParam),
            "get_resource" => Some(FunctionKind::GetResource),
            "get_file" => Some(FunctionKind::GetFile),
            "digest" => Some(FunctionKind::Digest),
            "resource_facade" => Some(FunctionKind::ResourceFacade),
            _ if REMOVED_CFN_FUNCTIONS.contains(&name) => Some(FunctionKind::Removed),
            _ => None,
        };
        if common.is_some() {
            return common;
        }

        match self {
            TemplateVersion::V2015_04_30 => match name {
                "get_attr" => Some(FunctionKind::GetAttr),
                "list_join" => Some(FunctionKind::Join),
                "str_replace" => Some(FunctionKind::Replace),
                "repeat" => Some(FunctionKind::Repeat),
                _ => None,
            },
            TemplateVersion::V2016_10_14 => match name {
                "get_attr" => Some(FunctionKind::GetAttrAll),
                "list_join" => Some(FunctionKind::JoinMultiple),
                "str_replace" => Some(FunctionKind::ReplaceJson),
                "repeat" => Some(FunctionKind::RepeatWithMap),
                "str_split" => Some(FunctionKind::StrSplit),
                "map_merge" => Some(FunctionKind::MapMerge),
                "map_replace" => Some(FunctionKind::MapReplace),
                "equals" => Some(FunctionKind::Equals),
                _ => None,
            },
        }
    }
}

impl FromStr for TemplateVersion {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2015-04-30" => Ok(TemplateVersion::V2015_04_30),
            "2016-10-14" | "newton" => Ok(TemplateVersion::V2016_10_14),
            other => Err(TemplateError::UnknownVersion(other.to_owned())),
        }
    }
}

impl std::fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing policy for a template: its version and the hash algorithms `digest`
/// may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub version: TemplateVersion,
    pub digest_algorithms: Vec<String>,
}

impl Template {
    pub fn new(version: TemplateVersion) -> Self {
        Self {
            version,
            digest_algorithms: crate::digest::SUPPORTED_ALGORITHMS
                .iter()
                .map(|a| (*a).to_owned())
                .collect(),
        }
    }

    #[must_use]
    pub fn with_digest_algorithms(mut self, algorithms: &[String]) -> Self {
        self.digest_algorithms = algorithms.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    /// Parse a raw template snippet into a node tree bound to `stack`.
    pub fn parse<'a>(
        &'a self,
        raw: &Value,
        stack: &'a dyn StackContext,
    ) -> Result<Node<'a>, TemplateError> {
        Node::parse(raw, self, stack)
    }

    /// Parse and resolve in one step.
    pub fn resolve(&self, raw: &Value, stack: &dyn StackContext) -> Result<Value, TemplateError> {
        self.parse(raw, stack)?.resolve()
    }
}
