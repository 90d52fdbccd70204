use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::path::{self, SEPARATOR};
use crate::spec::field::{FieldSchema, FieldType};
use crate::spec::visibility::Operator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("field under '{scope}' has an empty name")]
    EmptyName { scope: String },
    #[error("field name '{name}' must not contain '.'")]
    InvalidName { name: String },
    #[error("duplicate field name '{name}' under '{scope}'")]
    DuplicateName { scope: String, name: String },
    #[error("field '{address}' declares children but is not a group")]
    ChildrenOnNonGroup { address: String },
    #[error("visibility cycle detected: {}", path.join(" -> "))]
    VisibilityCycle { path: Vec<String> },
}

/// Problems worth surfacing that do not prevent the schema from rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SchemaWarning {
    NonListMembership { address: String, target: String },
    UnknownOperator { address: String, operator: String },
    MissingOperator { address: String, target: String },
    UnknownTarget { address: String, target: String },
    UnknownDependency { address: String, depends_on: String },
    OptionsOnNonSelection { address: String },
    UnsupportedType { address: String, type_name: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaWarning::NonListMembership { address, target } => write!(
                f,
                "{address}: membership condition on '{target}' has a non-array value"
            ),
            SchemaWarning::UnknownOperator { address, operator } => {
                write!(f, "{address}: unknown operator '{operator}'")
            }
            SchemaWarning::MissingOperator { address, target } => write!(
                f,
                "{address}: condition on '{target}' has no operator and never holds"
            ),
            SchemaWarning::UnknownTarget { address, target } => {
                write!(f, "{address}: condition targets unknown field '{target}'")
            }
            SchemaWarning::UnknownDependency {
                address,
                depends_on,
            } => write!(f, "{address}: dependsOn names unknown field '{depends_on}'"),
            SchemaWarning::OptionsOnNonSelection { address } => write!(
                f,
                "{address}: dependent options declared on a non-selection field"
            ),
            SchemaWarning::UnsupportedType { address, type_name } => {
                write!(f, "{address}: unsupported field type '{type_name}'")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// Every qualified address, in schema order.
    pub addresses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SchemaWarning>,
}

/// Checks load-time invariants of a schema tree.
///
/// Structural problems and visibility cycles are errors; everything else is reported as a
/// warning so authoring mistakes still render.
pub fn check_schema(fields: &[FieldSchema]) -> Result<SchemaReport, SchemaError> {
    let mut nodes = Vec::new();
    collect(fields, None, &mut nodes)?;

    let known: BTreeSet<&str> = nodes.iter().map(|(address, _)| address.as_str()).collect();
    let mut warnings = Vec::new();
    let mut edges: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (address, field) in &nodes {
        if let FieldType::Other(tag) = &field.kind {
            warnings.push(SchemaWarning::UnsupportedType {
                address: address.clone(),
                type_name: tag.clone(),
            });
        }

        let has_dependency = field.depends_on.is_some() || field.hooks.option_resolver.is_some();
        if has_dependency && !field.kind.is_selection() {
            warnings.push(SchemaWarning::OptionsOnNonSelection {
                address: address.clone(),
            });
        }
        if let Some(depends_on) = &field.depends_on
            && owning_node(&known, depends_on).is_none()
        {
            warnings.push(SchemaWarning::UnknownDependency {
                address: address.clone(),
                depends_on: depends_on.clone(),
            });
        }

        let Some(rule) = &field.visible_when else {
            continue;
        };
        for condition in &rule.conditions {
            match &condition.operator {
                Operator::Unknown(raw) => warnings.push(SchemaWarning::UnknownOperator {
                    address: address.clone(),
                    operator: raw.clone(),
                }),
                Operator::Missing => warnings.push(SchemaWarning::MissingOperator {
                    address: address.clone(),
                    target: condition.target.clone(),
                }),
                _ => {}
            }
            if condition.operator.expects_list()
                && !matches!(condition.value, Some(Value::Array(_)))
            {
                warnings.push(SchemaWarning::NonListMembership {
                    address: address.clone(),
                    target: condition.target.clone(),
                });
            }
            match owning_node(&known, &condition.target) {
                Some(target) => edges.entry(address.as_str()).or_default().push(target),
                None => warnings.push(SchemaWarning::UnknownTarget {
                    address: address.clone(),
                    target: condition.target.clone(),
                }),
            }
        }
    }

    if let Some(path) = find_cycle(&edges) {
        return Err(SchemaError::VisibilityCycle { path });
    }

    for warning in &warnings {
        warn!(%warning, "schema warning");
    }

    Ok(SchemaReport {
        addresses: nodes.into_iter().map(|(address, _)| address).collect(),
        warnings,
    })
}

fn collect<'a>(
    fields: &'a [FieldSchema],
    parent: Option<&str>,
    out: &mut Vec<(String, &'a FieldSchema)>,
) -> Result<(), SchemaError> {
    let scope = parent.unwrap_or("<root>").to_string();
    let mut seen = BTreeSet::new();
    for field in fields {
        if field.name.is_empty() {
            return Err(SchemaError::EmptyName { scope });
        }
        if field.name.contains(SEPARATOR) {
            return Err(SchemaError::InvalidName {
                name: field.name.clone(),
            });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateName {
                scope,
                name: field.name.clone(),
            });
        }

        let address = path::qualify(parent, &field.name);
        if !field.children.is_empty() && !field.kind.is_group() {
            return Err(SchemaError::ChildrenOnNonGroup { address });
        }
        out.push((address.clone(), field));
        collect(&field.children, Some(&address), out)?;
    }
    Ok(())
}

/// The deepest known node whose address equals `target` or contains it.
fn owning_node<'a>(known: &BTreeSet<&'a str>, target: &str) -> Option<&'a str> {
    let mut candidate = Some(target);
    while let Some(address) = candidate {
        if let Some(found) = known.get(address) {
            return Some(*found);
        }
        candidate = path::parent(address);
    }
    None
}

fn find_cycle(edges: &BTreeMap<&str, Vec<&str>>) -> Option<Vec<String>> {
    let mut done = BTreeSet::new();
    for start in edges.keys() {
        let mut chain = Vec::new();
        if let Some(cycle) = visit(*start, edges, &mut chain, &mut done) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    node: &'a str,
    edges: &BTreeMap<&'a str, Vec<&'a str>>,
    chain: &mut Vec<&'a str>,
    done: &mut BTreeSet<&'a str>,
) -> Option<Vec<String>> {
    if let Some(start) = chain.iter().position(|entry| *entry == node) {
        let mut cycle: Vec<String> = chain[start..].iter().map(|entry| entry.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    if done.contains(node) {
        return None;
    }

    chain.push(node);
    for next in edges.get(node).into_iter().flatten() {
        if let Some(cycle) = visit(*next, edges, chain, done) {
            return Some(cycle);
        }
    }
    chain.pop();
    done.insert(node);
    None
}
