use form_spec::{FieldOption, path};
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::WidgetKind;

/// What fills a field's widget slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum Widget {
    Builtin(WidgetKind),
    Override(Value),
}

/// A mounted leaf field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldView {
    pub address: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub widget: Widget,
    /// Stored value, or the declared default when nothing is stored yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub required: bool,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// A mounted group and its mounted children.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub address: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub children: Vec<RenderNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    Field(FieldView),
    Group(GroupView),
    Custom { address: String, output: Value },
    Unsupported {
        address: String,
        #[serde(rename = "type")]
        type_name: String,
        message: String,
    },
}

impl RenderNode {
    pub fn address(&self) -> &str {
        match self {
            RenderNode::Field(view) => &view.address,
            RenderNode::Group(view) => &view.address,
            RenderNode::Custom { address, .. } | RenderNode::Unsupported { address, .. } => {
                address
            }
        }
    }
}

/// Depth-first lookup of a mounted node by address.
pub fn find_node<'a>(nodes: &'a [RenderNode], address: &str) -> Option<&'a RenderNode> {
    for node in nodes {
        if node.address() == address {
            return Some(node);
        }
        if let RenderNode::Group(group) = node
            && path::is_within(address, &group.address)
            && let Some(found) = find_node(&group.children, address)
        {
            return Some(found);
        }
    }
    None
}

/// Every mounted address in render order.
pub fn mounted_addresses(nodes: &[RenderNode]) -> Vec<String> {
    let mut out = Vec::new();
    collect_addresses(nodes, &mut out);
    out
}

fn collect_addresses(nodes: &[RenderNode], out: &mut Vec<String>) {
    for node in nodes {
        out.push(node.address().to_string());
        if let RenderNode::Group(group) = node {
            collect_addresses(&group.children, out);
        }
    }
}

/// Indented plain-text outline of the mounted tree.
pub fn render_text(nodes: &[RenderNode]) -> String {
    let mut lines = Vec::new();
    write_lines(nodes, 0, &mut lines);
    lines.join("\n")
}

fn write_lines(nodes: &[RenderNode], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for node in nodes {
        match node {
            RenderNode::Field(view) => {
                let mut entry = format!("{indent}- {} ({}, {})", view.label, view.address, view.kind);
                if view.required {
                    entry.push_str(" [required]");
                }
                if view.disabled {
                    entry.push_str(" [disabled]");
                }
                if let Some(value) = &view.value {
                    entry.push_str(&format!(" = {}", value_to_display(value)));
                }
                if view.loading {
                    entry.push_str(" (loading)");
                }
                lines.push(entry);
                if !view.options.is_empty() {
                    let options = view
                        .options
                        .iter()
                        .map(|option| option.value.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("{indent}    options: {options}"));
                }
                if let Some(fetch_error) = &view.fetch_error {
                    lines.push(format!("{indent}    ! {fetch_error}"));
                }
                if let Some(error) = &view.error {
                    lines.push(format!("{indent}    ! {error}"));
                }
            }
            RenderNode::Group(view) => {
                lines.push(format!("{indent}+ {} ({})", view.label, view.address));
                if let Some(error) = &view.error {
                    lines.push(format!("{indent}    ! {error}"));
                }
                write_lines(&view.children, depth + 1, lines);
            }
            RenderNode::Custom { address, output } => {
                lines.push(format!("{indent}* {address}: {output}"));
            }
            RenderNode::Unsupported {
                address, message, ..
            } => {
                lines.push(format!("{indent}? {address}: {message}"));
            }
        }
    }
}

pub fn render_json(nodes: &[RenderNode]) -> serde_json::Result<Value> {
    serde_json::to_value(nodes)
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(text) => format!("{text:?}"),
        other => other.to_string(),
    }
}
