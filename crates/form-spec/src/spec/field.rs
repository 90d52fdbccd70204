use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hooks::{FieldHooks, HookError, OptionSource, RenderContext, WidgetContext};
use crate::spec::visibility::VisibilityRule;
use crate::store::FormStore;

/// Field type tags understood by the engine.
///
/// Unknown tags survive deserialization as [`FieldType::Other`] so the dispatcher can
/// name them in its placeholder instead of rejecting the whole schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Email,
    Select,
    Checkbox,
    Radio,
    Textarea,
    Group,
    AdditionalEmail,
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Textarea => "textarea",
            FieldType::Group => "group",
            FieldType::AdditionalEmail => "additionalEmail",
            FieldType::Other(tag) => tag,
        }
    }

    /// Selection-style fields carry an option list.
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::Radio | FieldType::Checkbox
        )
    }

    pub fn is_group(&self) -> bool {
        matches!(self, FieldType::Group)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "email" => FieldType::Email,
            "select" => FieldType::Select,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            "textarea" => FieldType::Textarea,
            "group" => FieldType::Group,
            "additionalEmail" => FieldType::AdditionalEmail,
            _ => FieldType::Other(tag),
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::from(tag.to_string())
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a selection field's option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            disabled: false,
            help_text: None,
            tooltip: None,
        }
    }
}

/// A rule threshold paired with its optional author-supplied message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleValue<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> RuleValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            message: None,
        }
    }

    pub fn with_message(value: T, message: impl Into<String>) -> Self {
        Self {
            value,
            message: Some(message.into()),
        }
    }
}

/// Declarative validation rules passed through to the form store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<RuleValue<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<RuleValue<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<RuleValue<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<RuleValue<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<RuleValue<f64>>,
}

impl ValidationRules {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }
}

/// A node of the declarative form schema. Group nodes carry `children`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(rename = "type")]
    #[schemars(with = "String")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "ValidationRules::is_empty")]
    pub validation: ValidationRules,
    /// Regex every typed fragment must match before it reaches the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibilityRule>,
    #[serde(default)]
    pub preserve_value: bool,
    /// Absolute address of the field whose value drives this field's options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    #[serde(default)]
    pub show_error_on_blur: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_props: Option<Map<String, Value>>,
    #[serde(skip)]
    pub hooks: FieldHooks,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, kind: impl Into<FieldType>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<FieldSchema>) -> Self {
        Self {
            children,
            ..Self::new(name, FieldType::Group)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_visibility(mut self, rule: VisibilityRule) -> Self {
        self.visible_when = Some(rule);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn depends_on(mut self, address: impl Into<String>) -> Self {
        self.depends_on = Some(address.into());
        self
    }

    pub fn preserve_value(mut self, preserve: bool) -> Self {
        self.preserve_value = preserve;
        self
    }

    pub fn with_option_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(Option<&Value>) -> OptionSource + Send + Sync + 'static,
    {
        self.hooks.option_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn on_value_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value, &mut dyn FormStore) + Send + Sync + 'static,
    {
        self.hooks.on_value_change = Some(Arc::new(hook));
        self
    }

    pub fn on_value_change_debounced<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.hooks.on_value_change_debounced = Some(Arc::new(
            move |value| -> BoxFuture<'static, Result<(), HookError>> { Box::pin(hook(value)) },
        ));
        self
    }

    pub fn with_custom_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<(), Option<String>> + Send + Sync + 'static,
    {
        self.hooks.custom_validator = Some(Arc::new(validator));
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.hooks.render = Some(Arc::new(render));
        self
    }

    pub fn with_override<F>(mut self, widget: F) -> Self
    where
        F: Fn(&WidgetContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.hooks.override_widget = Some(Arc::new(widget));
        self
    }

    /// Value written when the field is scrubbed and no default is declared.
    pub fn empty_value(&self) -> Value {
        let has_choices = !self.options.is_empty() || self.hooks.option_resolver.is_some();
        match self.kind {
            FieldType::Checkbox if has_choices => Value::Array(Vec::new()),
            FieldType::Checkbox => Value::Bool(false),
            FieldType::Group => Value::Object(Map::new()),
            _ => Value::String(String::new()),
        }
    }

    /// Declared default, falling back to [`FieldSchema::empty_value`].
    pub fn fallback_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.empty_value())
    }

    /// Human label used in messages; the name when no label is set.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Finds a schema node by its qualified address.
pub fn find_field<'a>(fields: &'a [FieldSchema], address: &str) -> Option<&'a FieldSchema> {
    let mut scope = fields;
    let mut found = None;
    for segment in address.split('.') {
        let node = scope.iter().find(|field| field.name == segment)?;
        scope = &node.children;
        found = Some(node);
    }
    found
}
