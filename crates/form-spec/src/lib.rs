#![allow(missing_docs)]

pub mod check;
pub mod hooks;
pub mod messages;
pub mod path;
pub mod presets;
pub mod spec;
pub mod store;
pub mod validate;
pub mod visibility;

pub use check::{SchemaError, SchemaReport, SchemaWarning, check_schema};
pub use hooks::{
    FieldHooks, HookError, OptionError, OptionFuture, OptionSource, RenderContext, WidgetContext,
};
pub use messages::{fallback_message, resolve_error_message};
pub use presets::{InputPreset, accepts_input};
pub use spec::{
    Condition, FieldOption, FieldSchema, FieldType, Logic, Operator, RuleValue, ValidationRules,
    VisibilityRule, find_field,
};
pub use store::{FormRead, FormStore, MemoryStore};
pub use validate::{FieldError, RuleKind, ValidationReport, validate_field, validate_form};
pub use visibility::{VisibilityMap, evaluate_condition, is_present, is_visible, resolve_visibility};
