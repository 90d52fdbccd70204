use crate::spec::field::{FieldSchema, FieldType};
use crate::validate::{FieldError, RuleKind};

pub const GROUP_FALLBACK: &str = "Field validation error";

/// Resolves the message shown for a field error.
///
/// Precedence: the field's `errorText`, the host `error_message` hook, the store's message,
/// then a generic text keyed by rule kind.
pub fn resolve_error_message(field: &FieldSchema, error: &FieldError) -> String {
    if let Some(text) = field.error_text.as_deref().filter(|text| !text.is_empty()) {
        return text.to_string();
    }
    if let Some(hook) = &field.hooks.error_message
        && let Some(message) = hook(error).filter(|message| !message.is_empty())
    {
        return message;
    }
    if let Some(message) = error.message.as_deref().filter(|message| !message.is_empty()) {
        return message.to_string();
    }
    if field.kind.is_group() {
        return GROUP_FALLBACK.to_string();
    }
    fallback_message(field, error.kind)
}

/// Built-in message for a rule kind.
pub fn fallback_message(field: &FieldSchema, kind: RuleKind) -> String {
    let label = field.display_label();
    let rules = &field.validation;
    match kind {
        RuleKind::Required => format!("{label} is required"),
        RuleKind::MinLength => match &rules.min_length {
            Some(rule) => format!("{label} must be at least {} characters", rule.value),
            None => generic(field),
        },
        RuleKind::MaxLength => match &rules.max_length {
            Some(rule) => format!("{label} must be at most {} characters", rule.value),
            None => generic(field),
        },
        RuleKind::Pattern => format!("{label} format is invalid"),
        RuleKind::Min => match &rules.min {
            Some(rule) => format!("{label} must be at least {}", rule.value),
            None => generic(field),
        },
        RuleKind::Max => match &rules.max {
            Some(rule) => format!("{label} must be at most {}", rule.value),
            None => generic(field),
        },
        RuleKind::Custom => generic(field),
    }
}

fn generic(field: &FieldSchema) -> String {
    match field.kind {
        FieldType::Select | FieldType::Radio | FieldType::Checkbox => "Invalid selection".into(),
        _ => "Invalid value".into(),
    }
}
