use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::spec::field::{FieldOption, FieldSchema};
use crate::store::FormStore;
use crate::validate::FieldError;

/// Error type host callbacks may return.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

pub type OptionFuture = BoxFuture<'static, Result<Vec<FieldOption>, OptionError>>;

/// Result of invoking an option resolver: either a list right away or a pending computation.
pub enum OptionSource {
    Ready(Vec<FieldOption>),
    Pending(OptionFuture),
}

impl OptionSource {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Vec<FieldOption>, OptionError>> + Send + 'static,
    {
        OptionSource::Pending(Box::pin(future))
    }
}

impl fmt::Debug for OptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionSource::Ready(options) => f.debug_tuple("Ready").field(options).finish(),
            OptionSource::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Failure reported by a host option resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("option resolution failed: {0}")]
pub struct OptionError(pub String);

impl OptionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Arguments handed to a full custom render function.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub address: &'a str,
    pub value: Option<&'a Value>,
    pub default_value: Option<&'a Value>,
    pub error: Option<&'a FieldError>,
}

/// Arguments handed to a widget override.
#[derive(Debug)]
pub struct WidgetContext<'a> {
    pub field: &'a FieldSchema,
    pub address: &'a str,
    pub value: Option<&'a Value>,
    pub error: Option<&'a FieldError>,
    pub props: Option<&'a Map<String, Value>>,
}

pub type OptionResolverFn = dyn Fn(Option<&Value>) -> OptionSource + Send + Sync;
pub type ValueChangeFn = dyn Fn(&Value, &mut dyn FormStore) + Send + Sync;
pub type DebouncedChangeFn = dyn Fn(Value) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync;
pub type CustomValidatorFn = dyn Fn(Option<&Value>) -> Result<(), Option<String>> + Send + Sync;
pub type ErrorMessageFn = dyn Fn(&FieldError) -> Option<String> + Send + Sync;
pub type RenderFn = dyn Fn(&RenderContext<'_>) -> Value + Send + Sync;
pub type WidgetFn = dyn Fn(&WidgetContext<'_>) -> Value + Send + Sync;

/// Host callbacks attached to a schema node. Never serialized.
#[derive(Clone, Default)]
pub struct FieldHooks {
    pub option_resolver: Option<Arc<OptionResolverFn>>,
    pub on_value_change: Option<Arc<ValueChangeFn>>,
    pub on_value_change_debounced: Option<Arc<DebouncedChangeFn>>,
    pub custom_validator: Option<Arc<CustomValidatorFn>>,
    pub error_message: Option<Arc<ErrorMessageFn>>,
    pub render: Option<Arc<RenderFn>>,
    pub override_widget: Option<Arc<WidgetFn>>,
}

impl FieldHooks {
    pub fn is_empty(&self) -> bool {
        self.option_resolver.is_none()
            && self.on_value_change.is_none()
            && self.on_value_change_debounced.is_none()
            && self.custom_validator.is_none()
            && self.error_message.is_none()
            && self.render.is_none()
            && self.override_widget.is_none()
    }
}

impl fmt::Debug for FieldHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldHooks")
            .field("option_resolver", &self.option_resolver.is_some())
            .field("on_value_change", &self.on_value_change.is_some())
            .field(
                "on_value_change_debounced",
                &self.on_value_change_debounced.is_some(),
            )
            .field("custom_validator", &self.custom_validator.is_some())
            .field("error_message", &self.error_message.is_some())
            .field("render", &self.render.is_some())
            .field("override_widget", &self.override_widget.is_some())
            .finish()
    }
}
