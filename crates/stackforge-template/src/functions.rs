//! Per-function argument checks, evaluation, validation and dependency discovery.
//!
//! Argument shapes that can be judged without resolving anything are checked when
//! a [`FunctionNode`] is constructed (`check_args`); everything else is checked
//! when the function is evaluated.

use crate::context::ResourceView;
use crate::digest::hex_digest;
use crate::node::{AttributeDependency, FunctionNode, Node};
use crate::path::{scalar_to_string, to_spaced_json, traverse, value_to_string};
use crate::version::FunctionKind;
use crate::TemplateError;
use serde_json::{Map, Value};
use stackforge_schema::ResourceName;

const FACADE_ATTRIBUTES: [&str; 3] = ["metadata", "deletion_policy", "update_policy"];

const REPLACE_EXAMPLE: &str = "str_replace:
  template: This is var1 template var2
  params:
    var1: a
    var2: string";

const REPEAT_EXAMPLE: &str = "repeat:
  template: This is %var%
  for_each:
    %var%: ['a', 'b', 'c']";

pub(crate) fn check_args(f: &FunctionNode<'_>) -> Result<(), TemplateError> {
    let name = f.name();
    match f.kind {
        FunctionKind::GetAttr | FunctionKind::GetAttrAll => get_attr_parts(f).map(|_| ()),
        FunctionKind::Join => match f.args.as_list() {
            Some(args) if args.len() == 2 => Ok(()),
            _ => Err(join_usage(name, r#"[ " ", [ "str1", "str2"]]"#)),
        },
        FunctionKind::JoinMultiple => match f.args.as_list() {
            Some(args) if args.len() >= 2 => Ok(()),
            _ => Err(join_usage(name, r#"[ " ", [ "str1", "str2"] ...]"#)),
        },
        FunctionKind::Replace | FunctionKind::ReplaceJson => {
            let (params, _) = replace_parts(f)?;
            if matches!(params, Node::Map(_) | Node::Function(_)) {
                Ok(())
            } else {
                Err(TemplateError::invalid(name, "parameters must be a mapping"))
            }
        }
        FunctionKind::Repeat | FunctionKind::RepeatWithMap => repeat_parts(f).map(|_| ()),
        FunctionKind::StrSplit => {
            if f.args.is_string_literal() || matches!(f.args, Node::Map(_)) {
                Err(str_split_usage(name))
            } else {
                Ok(())
            }
        }
        FunctionKind::Equals => match f.args.as_list() {
            Some(args) if args.len() == 2 => Ok(()),
            _ => Err(TemplateError::invalid(
                name,
                "arguments must be of the form: [value_1, value_2]",
            )),
        },
        FunctionKind::ResourceFacade => match &f.args {
            Node::Literal(Value::String(attr)) if FACADE_ATTRIBUTES.contains(&attr.as_str()) => {
                Ok(())
            }
            _ => Err(TemplateError::invalid(
                name,
                format!("argument should be one of: {}", FACADE_ATTRIBUTES.join(", ")),
            )),
        },
        FunctionKind::GetParam
        | FunctionKind::GetResource
        | FunctionKind::GetFile
        | FunctionKind::Digest
        | FunctionKind::MapMerge
        | FunctionKind::MapReplace
        | FunctionKind::Removed => Ok(()),
    }
}

pub(crate) fn evaluate(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    match f.kind {
        FunctionKind::GetParam => get_param(f, ready),
        FunctionKind::GetResource => get_resource(f, ready),
        FunctionKind::GetAttr | FunctionKind::GetAttrAll => get_attr(f, ready),
        FunctionKind::Join | FunctionKind::JoinMultiple => join(f, ready),
        FunctionKind::Replace | FunctionKind::ReplaceJson => replace(f, ready),
        FunctionKind::GetFile => get_file(f, ready),
        FunctionKind::Repeat | FunctionKind::RepeatWithMap => repeat(f, ready),
        FunctionKind::Digest => digest(f, ready),
        FunctionKind::StrSplit => str_split(f, ready),
        FunctionKind::MapMerge => map_merge(f, ready),
        FunctionKind::MapReplace => map_replace(f, ready),
        FunctionKind::Equals => equals(f, ready),
        FunctionKind::ResourceFacade => resource_facade(f),
        FunctionKind::Removed => Err(TemplateError::Removed(f.name.clone())),
    }
}

pub(crate) fn validate(f: &FunctionNode<'_>) -> Result<(), TemplateError> {
    match f.kind {
        FunctionKind::GetResource => {
            let mut ready = true;
            lookup_resource(f, &f.args, &mut ready).map(|_| ())
        }
        FunctionKind::GetAttr | FunctionKind::GetAttrAll => {
            let (resource, attribute, _) = get_attr_parts(f)?;
            let mut ready = true;
            let resource = lookup_resource(f, resource, &mut ready)?;
            let Some(attribute) = attribute else {
                return Ok(());
            };
            let attribute = attribute_name(f, attribute, &mut ready)?;
            if resource.attribute_names().contains(&attribute) {
                Ok(())
            } else {
                Err(TemplateError::UnknownAttribute {
                    resource: resource.name().to_owned(),
                    attribute,
                })
            }
        }
        FunctionKind::GetFile if f.args.is_static() => get_file(f, &mut true).map(|_| ()),
        FunctionKind::Repeat | FunctionKind::RepeatWithMap => {
            let (for_each, _) = repeat_parts(f)?;
            if matches!(for_each, Node::Map(_) | Node::Function(_)) {
                Ok(())
            } else {
                Err(TemplateError::invalid(
                    f.name(),
                    "the \"for_each\" argument must contain a map",
                ))
            }
        }
        FunctionKind::Digest if f.args.is_static() => {
            let args = f.args.resolve()?;
            digest_usage(f, &args).map(|_| ())
        }
        FunctionKind::Removed => Err(TemplateError::Removed(f.name.clone())),
        _ => Ok(()),
    }
}

/// The resource a `get_resource`/`get_attr` node points at.
pub(crate) fn referenced_resource(
    f: &FunctionNode<'_>,
) -> Result<Option<ResourceName>, TemplateError> {
    let node = match f.kind {
        FunctionKind::GetResource => &f.args,
        FunctionKind::GetAttr | FunctionKind::GetAttrAll => get_attr_parts(f)?.0,
        _ => return Ok(None),
    };
    let mut ready = true;
    let resource = lookup_resource(f, node, &mut ready)?;
    Ok(Some(ResourceName::new(resource.name())))
}

pub(crate) fn attribute_dependencies(
    f: &FunctionNode<'_>,
) -> Result<Vec<AttributeDependency>, TemplateError> {
    if !matches!(f.kind, FunctionKind::GetAttr | FunctionKind::GetAttrAll) {
        return Ok(Vec::new());
    }
    let (resource, attribute, path) = get_attr_parts(f)?;
    let mut ready = true;
    let resource = lookup_resource(f, resource, &mut ready)?;
    let resource_name = ResourceName::new(resource.name());

    match attribute {
        Some(attribute) => {
            let attribute = attribute_name(f, attribute, &mut ready)?;
            let path = resolve_all(path, &mut ready)?;
            Ok(vec![AttributeDependency {
                resource: resource_name,
                attribute,
                path,
            }])
        }
        None => Ok(resource
            .attribute_names()
            .into_iter()
            .map(|attribute| AttributeDependency {
                resource: resource_name.clone(),
                attribute,
                path: Vec::new(),
            })
            .collect()),
    }
}

fn get_param(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let args = f.args.resolve_tracked(ready)?;
    let (name, path) = match &args {
        Value::String(name) if !name.is_empty() => (name.as_str(), &[][..]),
        Value::Array(items) if !items.is_empty() => {
            let Value::String(name) = &items[0] else {
                return Err(TemplateError::invalid(
                    f.name(),
                    "parameter name must be a string",
                ));
            };
            (name.as_str(), &items[1..])
        }
        Value::Null | Value::String(_) | Value::Array(_) => {
            return Err(TemplateError::invalid(f.name(), "function must have arguments"));
        }
        _ => {
            return Err(TemplateError::invalid(
                f.name(),
                "argument must be string or list",
            ));
        }
    };

    let parameter = f
        .stack
        .parameter(name)
        .ok_or_else(|| TemplateError::MissingParameter(name.to_owned()))?;

    Ok(traverse(&parameter, path)
        .cloned()
        .unwrap_or_else(|| Value::String(String::new())))
}

fn get_resource(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let resource = lookup_resource(f, &f.args, ready)?;
    if !resource.attributes_readable() {
        *ready = false;
    }
    Ok(Value::String(resource.reference_id()))
}

fn get_attr(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let (resource, attribute, path) = get_attr_parts(f)?;
    let resource = lookup_resource(f, resource, ready)?;

    let Some(attribute) = attribute else {
        if resource.attributes_readable() {
            return Ok(resource.attributes());
        }
        *ready = false;
        return Ok(Value::Null);
    };

    let attribute = attribute_name(f, attribute, ready)?;
    let path = resolve_all(path, ready)?;
    if !resource.attributes_readable() {
        *ready = false;
        return Ok(Value::Null);
    }
    match resource.attribute(&attribute, &path) {
        Some(value) => Ok(value),
        None => {
            *ready = false;
            Ok(Value::Null)
        }
    }
}

fn join(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let Some((delim, lists)) = f.args.as_list().and_then(|args| args.split_first()) else {
        return Err(join_usage(f.name(), r#"[ " ", [ "str1", "str2"] ...]"#));
    };

    let Value::String(delim) = delim.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(f.name(), "delimiter must be a string"));
    };

    let mut items = Vec::new();
    for list in lists {
        match list.resolve_tracked(ready)? {
            Value::Null => {}
            Value::Array(values) => items.extend(values),
            _ => return Err(TemplateError::invalid(f.name(), "must operate on a list")),
        }
    }

    let strings = if f.kind == FunctionKind::Join {
        items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(String::new()),
                Value::String(s) => Ok(s.clone()),
                _ => Err(TemplateError::invalid(
                    f.name(),
                    "items to join must be strings",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        items.iter().map(value_to_string).collect()
    };
    Ok(Value::String(strings.join(delim.as_str())))
}

fn replace(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let (params, template) = replace_parts(f)?;

    let Value::String(template) = template.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(f.name(), "template must be a string"));
    };
    let Value::Object(params) = params.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(f.name(), "params must be a map"));
    };

    // Longer placeholders first, ties in lexical order.
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();
    keys.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut pairs = Vec::with_capacity(keys.len());
    for key in keys {
        if key.is_empty() {
            return Err(TemplateError::invalid(
                f.name(),
                "param placeholders must not be empty",
            ));
        }
        pairs.push((key.as_str(), replacement(f, &params[key.as_str()])?));
    }

    Ok(Value::String(substitute(&template, &pairs)))
}

fn replacement(f: &FunctionNode<'_>, value: &Value) -> Result<String, TemplateError> {
    if let Some(text) = scalar_to_string(value) {
        return Ok(text);
    }
    if f.kind == FunctionKind::ReplaceJson {
        Ok(to_spaced_json(value))
    } else {
        Err(TemplateError::invalid(
            f.name(),
            "params must be strings or numbers",
        ))
    }
}

/// Split on the first placeholder, substitute the rest into each piece, then
/// rejoin with the first placeholder's value, so replaced text is never rescanned.
fn substitute(text: &str, pairs: &[(&str, String)]) -> String {
    match pairs.split_first() {
        None => text.to_owned(),
        Some(((placeholder, value), rest)) => text
            .split(placeholder)
            .map(|piece| substitute(piece, rest))
            .collect::<Vec<_>>()
            .join(value.as_str()),
    }
}

fn get_file(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let Value::String(key) = f.args.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(f.name(), "argument must be a string"));
    };
    f.stack
        .file(&key)
        .map(|content| Value::String(content.to_owned()))
        .ok_or_else(|| TemplateError::MissingFile {
            function: f.name.clone(),
            key,
        })
}

fn repeat(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let (for_each, template) = repeat_parts(f)?;

    let Value::Object(for_each) = for_each.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(
            f.name(),
            "the \"for_each\" argument must contain a map",
        ));
    };

    let mut keys = Vec::with_capacity(for_each.len());
    let mut lists = Vec::with_capacity(for_each.len());
    for (key, value) in &for_each {
        let items = match value {
            Value::Array(items) => items.clone(),
            Value::Object(map) if f.kind == FunctionKind::RepeatWithMap => {
                map.keys().cloned().map(Value::String).collect()
            }
            _ => {
                return Err(TemplateError::invalid(
                    f.name(),
                    "the values of the \"for_each\" argument must be lists",
                ));
            }
        };
        keys.push(key.as_str());
        lists.push(items);
    }

    let template = template.resolve_tracked(ready)?;
    let repeated = cartesian_product(&lists)
        .iter()
        .map(|combination| substitute_value(&template, &keys, combination))
        .collect();
    Ok(Value::Array(repeated))
}

/// Every combination of one item per list; the last list varies fastest.
fn cartesian_product(lists: &[Vec<Value>]) -> Vec<Vec<&Value>> {
    let mut combinations: Vec<Vec<&Value>> = vec![Vec::new()];
    for list in lists {
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                list.iter().map(move |item| {
                    let mut next = prefix.clone();
                    next.push(item);
                    next
                })
            })
            .collect();
    }
    combinations
}

fn substitute_value(template: &Value, keys: &[&str], values: &[&Value]) -> Value {
    match template {
        Value::String(text) => {
            let mut text = text.clone();
            for (key, value) in keys.iter().zip(values) {
                text = text.replace(key, &value_to_string(value));
            }
            Value::String(text)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_value(item, keys, values))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match substitute_value(&Value::String(k.clone()), keys, values) {
                    Value::String(key) => key,
                    _ => k.clone(),
                };
                out.insert(key, substitute_value(v, keys, values));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn digest(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let args = f.args.resolve_tracked(ready)?;
    let (algorithm, value) = digest_usage(f, &args)?;
    hex_digest(&algorithm, value)
        .map(Value::String)
        .ok_or_else(|| {
            TemplateError::invalid(
                f.name(),
                format!("algorithm {algorithm} is allowed but not available"),
            )
        })
}

fn digest_usage<'v>(
    f: &FunctionNode<'_>,
    args: &'v Value,
) -> Result<(String, &'v str), TemplateError> {
    let strings = match args {
        Value::Array(items) => items.iter().map(Value::as_str).collect::<Option<Vec<_>>>(),
        _ => None,
    };
    let Some(strings) = strings else {
        return Err(TemplateError::invalid(
            f.name(),
            "argument must be a list of strings",
        ));
    };
    let [algorithm, value] = strings.as_slice() else {
        return Err(TemplateError::invalid(
            f.name(),
            r#"usage: ["<algorithm>", "<value>"]"#,
        ));
    };

    let algorithm = algorithm.to_lowercase();
    if !f.template.digest_algorithms.contains(&algorithm) {
        return Err(TemplateError::invalid(
            f.name(),
            format!(
                "algorithm must be one of {}",
                f.template.digest_algorithms.join(", ")
            ),
        ));
    }
    Ok((algorithm, *value))
}

fn str_split(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let args = f.args.resolve_tracked(ready)?;
    let Value::Array(items) = &args else {
        return Err(str_split_usage(f.name()));
    };
    let (delim, text, index) = match items.as_slice() {
        [delim, text] => (delim, text, None),
        [delim, text, index] => (delim, text, Some(index)),
        _ => return Err(str_split_usage(f.name())),
    };

    if text.is_null() {
        return Ok(Value::Null);
    }
    let (Value::String(delim), Value::String(text)) = (delim, text) else {
        return Err(str_split_usage(f.name()));
    };
    if delim.is_empty() {
        return Err(TemplateError::invalid(f.name(), "empty separator"));
    }

    let parts: Vec<&str> = text.split(delim.as_str()).collect();
    let Some(index) = index else {
        return Ok(Value::Array(
            parts.into_iter().map(|p| Value::String(p.to_owned())).collect(),
        ));
    };

    let index = match index {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| str_split_index_usage(f.name()))?;

    let len = parts.len() as i64;
    let position = if index < 0 { len + index } else { index };
    if !(0..len).contains(&position) {
        return Err(TemplateError::invalid(
            f.name(),
            format!("incorrect index, should be between 0 and {}", len - 1),
        ));
    }
    Ok(Value::String(parts[position as usize].to_owned()))
}

fn map_merge(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let Value::Array(maps) = f.args.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(
            f.name(),
            r#"incorrect arguments, should be: [ { "key1": "val1" }, { "key2": "val2" } ]"#,
        ));
    };

    let mut merged = Map::new();
    for map in maps {
        match map {
            Value::Null => {}
            Value::Object(map) => merged.extend(map),
            _ => {
                return Err(TemplateError::invalid(
                    f.name(),
                    "incorrect arguments: items to merge must be maps",
                ));
            }
        }
    }
    Ok(Value::Object(merged))
}

fn map_replace(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let usage = || {
        TemplateError::invalid(
            f.name(),
            r#"incorrect arguments, should be: [ { "key1": "val1" }, {"keys": {"key1": "key2"}, "values": {"val1": "val2"}}]"#,
        )
    };
    let as_map = |value: &Value| match value {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        _ => Err(usage()),
    };

    let args = f.args.resolve_tracked(ready)?;
    let Some([input, replacements]) = args.as_array().map(Vec::as_slice) else {
        return Err(usage());
    };
    let input = as_map(input)?;
    let replacements = as_map(replacements)?;
    if replacements.keys().any(|k| k != "keys" && k != "values") {
        return Err(usage());
    }
    let new_keys = as_map(replacements.get("keys").unwrap_or(&Value::Null))?;
    let new_values = as_map(replacements.get("values").unwrap_or(&Value::Null))?;

    let mut out = Map::with_capacity(input.len());
    for (key, value) in &input {
        let key = match new_keys.get(key) {
            None | Some(Value::Null) => key.clone(),
            Some(Value::String(renamed)) => {
                if input.contains_key(renamed) {
                    return Err(TemplateError::invalid(
                        f.name(),
                        format!("key replacement {renamed} collides with a key in the input map"),
                    ));
                }
                if out.contains_key(renamed) {
                    return Err(TemplateError::invalid(
                        f.name(),
                        format!("key replacement {renamed} collides with a key in the output map"),
                    ));
                }
                renamed.clone()
            }
            Some(_) => return Err(usage()),
        };
        let value = match value {
            Value::String(s) => new_values.get(s).cloned().unwrap_or_else(|| value.clone()),
            other => other.clone(),
        };
        out.insert(key, value);
    }
    Ok(Value::Object(out))
}

fn equals(f: &FunctionNode<'_>, ready: &mut bool) -> Result<Value, TemplateError> {
    let Some([left, right]) = f.args.as_list() else {
        return Err(TemplateError::invalid(
            f.name(),
            "arguments must be of the form: [value_1, value_2]",
        ));
    };
    let left = left.resolve_tracked(ready)?;
    let right = right.resolve_tracked(ready)?;
    Ok(Value::Bool(left == right))
}

fn resource_facade(f: &FunctionNode<'_>) -> Result<Value, TemplateError> {
    let facade = f
        .stack
        .facade()
        .ok_or_else(|| TemplateError::NoFacade(f.name.clone()))?;
    match &f.args {
        Node::Literal(Value::String(attr)) => match attr.as_str() {
            "metadata" => Ok(facade.metadata()),
            "deletion_policy" => Ok(facade.deletion_policy()),
            "update_policy" => Ok(facade.update_policy()),
            _ => Err(TemplateError::invalid(f.name(), "unknown facade attribute")),
        },
        _ => Err(TemplateError::invalid(f.name(), "argument must be a string")),
    }
}

type GetAttrParts<'n, 'a> = (&'n Node<'a>, Option<&'n Node<'a>>, &'n [Node<'a>]);

fn get_attr_parts<'n, 'a>(f: &'n FunctionNode<'a>) -> Result<GetAttrParts<'n, 'a>, TemplateError> {
    let Some(args) = f.args.as_list() else {
        return Err(TemplateError::invalid(f.name(), "argument must be a list"));
    };
    match args {
        [resource] if f.kind == FunctionKind::GetAttrAll => Ok((resource, None, &[])),
        [resource, attribute, path @ ..] => Ok((resource, Some(attribute), path)),
        _ if f.kind == FunctionKind::GetAttrAll => Err(TemplateError::invalid(
            f.name(),
            "arguments can be of the next forms: [resource_name] or \
             [resource_name, attribute, (path), ...]",
        )),
        _ => Err(TemplateError::invalid(
            f.name(),
            "arguments must be of the form [resource_name, attribute, (path), ...]",
        )),
    }
}

fn replace_parts<'n, 'a>(
    f: &'n FunctionNode<'a>,
) -> Result<(&'n Node<'a>, &'n Node<'a>), TemplateError> {
    if !matches!(f.args, Node::Map(_)) {
        return Err(TemplateError::invalid(f.name(), "arguments must be a map"));
    }
    match (f.args.get("params"), f.args.get("template")) {
        (Some(params), Some(template)) => Ok((params, template)),
        _ => Err(TemplateError::invalid(
            f.name(),
            format!("syntax should be {REPLACE_EXAMPLE}"),
        )),
    }
}

fn repeat_parts<'n, 'a>(
    f: &'n FunctionNode<'a>,
) -> Result<(&'n Node<'a>, &'n Node<'a>), TemplateError> {
    if !matches!(f.args, Node::Map(_)) {
        return Err(TemplateError::invalid(f.name(), "arguments must be a map"));
    }
    match (f.args.get("for_each"), f.args.get("template")) {
        (Some(for_each), Some(template)) => Ok((for_each, template)),
        _ => Err(TemplateError::invalid(
            f.name(),
            format!("syntax should be {REPEAT_EXAMPLE}"),
        )),
    }
}

fn lookup_resource<'s>(
    f: &FunctionNode<'s>,
    node: &Node<'s>,
    ready: &mut bool,
) -> Result<&'s dyn ResourceView, TemplateError> {
    let Value::String(name) = node.resolve_tracked(ready)? else {
        return Err(TemplateError::invalid(
            f.name(),
            "resource name must be a string",
        ));
    };
    f.stack
        .resource(&name)
        .ok_or(TemplateError::UnknownResource {
            resource: name,
            key: "unknown".to_owned(),
        })
}

fn attribute_name(
    f: &FunctionNode<'_>,
    node: &Node<'_>,
    ready: &mut bool,
) -> Result<String, TemplateError> {
    match node.resolve_tracked(ready)? {
        Value::String(attribute) => Ok(attribute),
        _ => Err(TemplateError::invalid(
            f.name(),
            "attribute name must be a string",
        )),
    }
}

fn resolve_all(nodes: &[Node<'_>], ready: &mut bool) -> Result<Vec<Value>, TemplateError> {
    nodes.iter().map(|n| n.resolve_tracked(ready)).collect()
}

fn join_usage(name: &str, example: &str) -> TemplateError {
    TemplateError::invalid(name, format!("incorrect arguments, should be: {example}"))
}

fn str_split_usage(name: &str) -> TemplateError {
    TemplateError::invalid(
        name,
        r#"incorrect arguments, should be: [ ",", "apples,pears", <index>]"#,
    )
}

fn str_split_index_usage(name: &str) -> TemplateError {
    TemplateError::invalid(
        name,
        r#"incorrect index, should be: [ ",", "apples,pears", <index>]"#,
    )
}
