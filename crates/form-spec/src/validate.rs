use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path;
use crate::spec::field::{FieldSchema, FieldType};
use crate::visibility::is_visible;

/// Rule family that produced a field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    Pattern,
    MinLength,
    MaxLength,
    Min,
    Max,
    Custom,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Pattern => "pattern",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error descriptor recorded by a form store for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldError {
    pub fn new(kind: RuleKind, message: Option<String>) -> Self {
        Self { kind, message }
    }
}

/// Outcome of validating every visible field of a form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, FieldError>,
}

/// Applies a field's declared rules to its current value.
pub fn validate_field(field: &FieldSchema, value: Option<&Value>) -> Option<FieldError> {
    if field.required && is_missing(field, value) {
        return Some(FieldError::new(RuleKind::Required, None));
    }

    let rules = &field.validation;
    if let Some(text) = value.and_then(Value::as_str)
        && !text.is_empty()
    {
        if let Some(pattern) = &rules.pattern
            && let Ok(regex) = Regex::new(&pattern.value)
            && !regex.is_match(text)
        {
            return Some(FieldError::new(RuleKind::Pattern, pattern.message.clone()));
        }

        let length = text.chars().count();
        if let Some(min_length) = &rules.min_length
            && length < min_length.value
        {
            return Some(FieldError::new(
                RuleKind::MinLength,
                min_length.message.clone(),
            ));
        }
        if let Some(max_length) = &rules.max_length
            && length > max_length.value
        {
            return Some(FieldError::new(
                RuleKind::MaxLength,
                max_length.message.clone(),
            ));
        }
    }

    if let Some(number) = value.and_then(numeric) {
        if let Some(min) = &rules.min
            && number < min.value
        {
            return Some(FieldError::new(RuleKind::Min, min.message.clone()));
        }
        if let Some(max) = &rules.max
            && number > max.value
        {
            return Some(FieldError::new(RuleKind::Max, max.message.clone()));
        }
    }

    if let Some(validator) = &field.hooks.custom_validator
        && let Err(message) = validator(value)
    {
        return Some(FieldError::new(RuleKind::Custom, message));
    }

    None
}

/// Validates every visible node, skipping hidden nodes and everything beneath them.
pub fn validate_form(fields: &[FieldSchema], values: &Value) -> ValidationReport {
    let mut errors = BTreeMap::new();
    walk(fields, None, values, &mut errors);
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn walk(
    fields: &[FieldSchema],
    parent: Option<&str>,
    values: &Value,
    errors: &mut BTreeMap<String, FieldError>,
) {
    for field in fields {
        if !is_visible(field.visible_when.as_ref(), values) {
            continue;
        }
        let address = path::qualify(parent, &field.name);
        if let Some(error) = validate_field(field, path::resolve(values, &address)) {
            errors.insert(address.clone(), error);
        }
        if !field.children.is_empty() {
            walk(&field.children, Some(&address), values, errors);
        }
    }
}

fn is_missing(field: &FieldSchema, value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Bool(checked)) => matches!(field.kind, FieldType::Checkbox) && !checked,
        Some(_) => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
