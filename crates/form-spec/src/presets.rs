use regex::Regex;

use crate::spec::field::{FieldSchema, RuleValue};

/// An input filter paired with the validation pattern that backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPreset {
    pub allowed_pattern: &'static str,
    pub pattern: &'static str,
    pub message: &'static str,
}

pub const DIGITS_OR_BLANK: InputPreset = InputPreset {
    allowed_pattern: r"^[0-9]*$",
    pattern: r"^$|^[0-9]+$",
    message: "Only numbers are allowed",
};

pub const POSITIVE_INTEGERS: InputPreset = InputPreset {
    allowed_pattern: r"^[0-9]*$",
    pattern: r"^[1-9][0-9]*$",
    message: "Only numbers greater than 0 are allowed",
};

pub const PERCENT_1_TO_99: InputPreset = InputPreset {
    allowed_pattern: r"^[0-9]*$",
    pattern: r"^(?:[1-9][0-9]?|0?[1-9])$",
    message: "Enter a number greater than 0 and less than 100",
};

impl InputPreset {
    pub fn apply(&self, mut field: FieldSchema) -> FieldSchema {
        field.allowed_pattern = Some(self.allowed_pattern.to_string());
        field.validation.pattern = Some(RuleValue::with_message(
            self.pattern.to_string(),
            self.message,
        ));
        field
    }
}

/// Whether a typed fragment may reach the store. Fields without `allowedPattern`, or with
/// one that does not compile, accept everything.
pub fn accepts_input(field: &FieldSchema, fragment: &str) -> bool {
    match field.allowed_pattern.as_deref().map(Regex::new) {
        Some(Ok(regex)) => regex.is_match(fragment),
        _ => true,
    }
}
