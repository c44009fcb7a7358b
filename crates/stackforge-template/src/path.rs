//! Value helpers shared by the intrinsic functions: path traversal and the string
//! renderings used when values are spliced into text.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;
use std::io;

/// Walk `path` into `value`, one map key or list index per step.
///
/// Returns `None` when a step hits a scalar, a missing key, an out-of-range index
/// or a list key that does not parse as an integer.
pub fn traverse<'v>(value: &'v Value, path: &[Value]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key.as_str()?),
        Value::Array(items) => items.get(list_index(key)?),
        _ => None,
    })
}

fn list_index(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) => n.as_u64().map(|i| i as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// JSON with `", "` and `": "` separators, the rendering templates expect when a
/// list or map is joined or substituted into a string.
pub fn to_spaced_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, SpacedFormatter);
    if value.serialize(&mut serializer).is_err() {
        // Writing a `Value` into a Vec cannot fail.
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Text form of a scalar; `None` for lists and maps.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text form of any value, serializing lists and maps as spaced JSON.
pub fn value_to_string(value: &Value) -> String {
    scalar_to_string(value).unwrap_or_else(|| to_spaced_json(value))
}
