use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How condition results combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Logic {
    #[default]
    And,
    Or,
}

/// Comparison applied between the resolved target value and the condition value.
///
/// A condition that omits `operator` carries [`Operator::Missing`]; like an unrecognized
/// operator it never holds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    #[default]
    Missing,
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    NotExists,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Exists => "exists",
            Operator::NotExists => "notExists",
            Operator::Missing => "",
            Operator::Unknown(raw) => raw,
        }
    }

    /// Operators whose condition value must be an array.
    pub fn expects_list(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Operator::Missing)
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "equals" => Operator::Equals,
            "notEquals" => Operator::NotEquals,
            "in" => Operator::In,
            "notIn" => Operator::NotIn,
            "exists" => Operator::Exists,
            "notExists" => Operator::NotExists,
            "" => Operator::Missing,
            _ => Operator::Unknown(raw),
        }
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One comparison against the value stored at `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    /// Absolute, dot-qualified address of the value under test.
    #[serde(rename = "field")]
    pub target: String,
    #[serde(default, skip_serializing_if = "Operator::is_missing")]
    #[schemars(with = "Option<String>")]
    pub operator: Operator,
    /// `None` when the condition omits `value`; an explicit `null` is kept as `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<Value>")]
    pub value: Option<Value>,
}

impl Condition {
    pub fn new(target: impl Into<String>, operator: Operator, value: Option<Value>) -> Self {
        Self {
            target: target.into(),
            operator,
            value,
        }
    }

    pub fn equals(target: impl Into<String>, value: Value) -> Self {
        Self::new(target, Operator::Equals, Some(value))
    }

    pub fn exists(target: impl Into<String>) -> Self {
        Self::new(target, Operator::Exists, None)
    }
}

/// Declarative rule deciding whether a node is shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct VisibilityRule {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl VisibilityRule {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::Or,
            conditions,
        }
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
