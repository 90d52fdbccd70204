//! Dot-qualified field addressing over nested value trees.
//!
//! A leaf inside groups `billing` and `address` named `zip` lives at `billing.address.zip`,
//! both in the value tree and in the error map.

use serde_json::{Map, Value};

/// Separator between address segments.
pub const SEPARATOR: char = '.';

/// Joins a parent address and a child name. No parent yields the bare name.
pub fn qualify(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) if !parent.is_empty() => format!("{parent}{SEPARATOR}{name}"),
        _ => name.to_string(),
    }
}

/// Resolves `address` against `tree`; `None` when any segment is missing.
pub fn resolve<'a>(tree: &'a Value, address: &str) -> Option<&'a Value> {
    if address.is_empty() {
        return None;
    }
    let mut current = tree;
    for segment in address.split(SEPARATOR) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `address`, creating intermediate objects on first write.
///
/// Scalars sitting where an intermediate object is needed are replaced.
pub fn assign(tree: &mut Value, address: &str, value: Value) {
    if address.is_empty() {
        *tree = value;
        return;
    }

    let mut segments = address.split(SEPARATOR).peekable();
    let mut current = tree;
    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();
        let index = match &*current {
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .filter(|index| *index < items.len()),
            _ => None,
        };
        if let Some(index) = index {
            let Value::Array(items) = current else {
                return;
            };
            if last {
                items[index] = value;
                return;
            }
            current = &mut items[index];
            continue;
        }

        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if last {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// True when `address` equals `ancestor` or lies beneath it.
pub fn is_within(address: &str, ancestor: &str) -> bool {
    address == ancestor
        || (address.len() > ancestor.len()
            && address.starts_with(ancestor)
            && address[ancestor.len()..].starts_with(SEPARATOR))
}

/// Address of the enclosing group, if any.
pub fn parent(address: &str) -> Option<&str> {
    address.rsplit_once(SEPARATOR).map(|(head, _)| head)
}
