use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use form_spec::FieldType;
use form_spec::FieldSchema;
use form_spec::hooks::{RenderFn, WidgetFn};
use serde::Serialize;

/// Built-in widget behaviors the engine knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    TextInput,
    NumberInput,
    EmailInput,
    Textarea,
    Select,
    Radio,
    Checkbox,
    CheckboxGroup,
    Group,
}

impl WidgetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetKind::TextInput => "textInput",
            WidgetKind::NumberInput => "numberInput",
            WidgetKind::EmailInput => "emailInput",
            WidgetKind::Textarea => "textarea",
            WidgetKind::Select => "select",
            WidgetKind::Radio => "radio",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::CheckboxGroup => "checkboxGroup",
            WidgetKind::Group => "group",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavior selected for one schema node.
#[derive(Clone)]
pub enum Behavior {
    /// Full custom render; nothing else runs for the node.
    Custom(Arc<RenderFn>),
    /// Widget-only override. `builtin` is what the type table would have chosen.
    Override {
        widget: Arc<WidgetFn>,
        builtin: Option<WidgetKind>,
    },
    Builtin(WidgetKind),
    Unsupported(String),
}

impl Behavior {
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            Behavior::Builtin(WidgetKind::Group)
                | Behavior::Override {
                    builtin: Some(WidgetKind::Group),
                    ..
                }
        )
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Custom(_) => f.write_str("Custom(..)"),
            Behavior::Override { builtin, .. } => f
                .debug_struct("Override")
                .field("builtin", builtin)
                .finish_non_exhaustive(),
            Behavior::Builtin(kind) => f.debug_tuple("Builtin").field(kind).finish(),
            Behavior::Unsupported(tag) => f.debug_tuple("Unsupported").field(tag).finish(),
        }
    }
}

/// Type-tag to widget lookup with the two override slots checked first.
#[derive(Debug, Clone)]
pub struct FieldTypeDispatcher {
    table: BTreeMap<FieldType, WidgetKind>,
}

impl Default for FieldTypeDispatcher {
    fn default() -> Self {
        let table = BTreeMap::from([
            (FieldType::Text, WidgetKind::TextInput),
            (FieldType::Number, WidgetKind::NumberInput),
            (FieldType::Email, WidgetKind::EmailInput),
            (FieldType::Textarea, WidgetKind::Textarea),
            (FieldType::Select, WidgetKind::Select),
            (FieldType::Radio, WidgetKind::Radio),
            (FieldType::Checkbox, WidgetKind::Checkbox),
            (FieldType::Group, WidgetKind::Group),
        ]);
        Self { table }
    }
}

impl FieldTypeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a type tag (including an `Other` tag) to a built-in widget.
    pub fn register(&mut self, kind: impl Into<FieldType>, widget: WidgetKind) -> &mut Self {
        self.table.insert(kind.into(), widget);
        self
    }

    pub fn dispatch(&self, field: &FieldSchema) -> Behavior {
        if let Some(render) = &field.hooks.render {
            return Behavior::Custom(Arc::clone(render));
        }
        let builtin = self.builtin(field);
        if let Some(widget) = &field.hooks.override_widget {
            return Behavior::Override {
                widget: Arc::clone(widget),
                builtin,
            };
        }
        match builtin {
            Some(kind) => Behavior::Builtin(kind),
            None => Behavior::Unsupported(field.kind.as_str().to_string()),
        }
    }

    fn builtin(&self, field: &FieldSchema) -> Option<WidgetKind> {
        let widget = *self.table.get(&field.kind)?;
        let has_choices = !field.options.is_empty() || field.hooks.option_resolver.is_some();
        Some(match widget {
            WidgetKind::Checkbox if has_choices => WidgetKind::CheckboxGroup,
            other => other,
        })
    }
}
