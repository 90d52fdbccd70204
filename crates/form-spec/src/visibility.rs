use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use crate::path;
use crate::spec::field::FieldSchema;
use crate::spec::visibility::{Condition, Logic, Operator, VisibilityRule};

/// Visibility keyed by qualified address.
pub type VisibilityMap = BTreeMap<String, bool>;

/// Evaluates an optional rule against the current value tree. No rule means visible.
pub fn is_visible(rule: Option<&VisibilityRule>, values: &Value) -> bool {
    let Some(rule) = rule else {
        return true;
    };
    if rule.conditions.is_empty() {
        return true;
    }

    let mut results = rule
        .conditions
        .iter()
        .map(|condition| evaluate_condition(condition, values));
    match rule.logic {
        Logic::And => results.all(|held| held),
        Logic::Or => results.any(|held| held),
    }
}

/// Evaluates one condition. Malformed conditions and unknown operators yield `false`.
pub fn evaluate_condition(condition: &Condition, values: &Value) -> bool {
    let current = path::resolve(values, &condition.target);
    let expected = condition.value.as_ref();

    let held = match &condition.operator {
        Operator::Equals => strict_eq(current, expected),
        Operator::NotEquals => !strict_eq(current, expected),
        Operator::In => match expected {
            Some(Value::Array(items)) => contains(items, current),
            _ => false,
        },
        Operator::NotIn => match expected {
            Some(Value::Array(items)) => !contains(items, current),
            _ => false,
        },
        Operator::Exists => is_present(current),
        Operator::NotExists => !is_present(current),
        Operator::Missing | Operator::Unknown(_) => false,
    };

    trace!(
        field = %condition.target,
        operator = %condition.operator,
        held,
        "visibility condition evaluated"
    );
    held
}

/// Present means neither absent, `null`, nor the empty string.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

/// Strict equality. An absent value only equals an omitted condition value; numbers
/// compare by magnitude so `1` and `1.0` match.
pub fn strict_eq(current: Option<&Value>, expected: Option<&Value>) -> bool {
    match (current, expected) {
        (None, None) => true,
        (Some(left), Some(right)) => values_equal(left, right),
        _ => false,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left == right,
            _ => left == right,
        },
        _ => left == right,
    }
}

fn contains(items: &[Value], current: Option<&Value>) -> bool {
    current.is_some_and(|current| items.iter().any(|item| values_equal(item, current)))
}

/// Resolves visibility for every node in the tree. Descendants of hidden groups are hidden.
pub fn resolve_visibility(fields: &[FieldSchema], values: &Value) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    collect(fields, None, true, values, &mut map);
    map
}

fn collect(
    fields: &[FieldSchema],
    parent: Option<&str>,
    parent_visible: bool,
    values: &Value,
    map: &mut VisibilityMap,
) {
    for field in fields {
        let address = path::qualify(parent, &field.name);
        let visible = parent_visible && is_visible(field.visible_when.as_ref(), values);
        if !field.children.is_empty() {
            collect(&field.children, Some(&address), visible, values, map);
        }
        map.insert(address, visible);
    }
}
