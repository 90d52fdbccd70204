use std::collections::BTreeSet;
use std::sync::Arc;

use form_spec::hooks::{RenderContext, WidgetContext};
use form_spec::{
    FieldSchema, FieldType, FormRead, FormStore, SchemaReport, check_schema, find_field, is_visible,
    path, presets, resolve_error_message,
};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Number, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::debounce::DebouncedEffectRunner;
use crate::dispatch::{Behavior, FieldTypeDispatcher};
use crate::error::EngineError;
use crate::lifecycle::{LifecycleManager, Presence, Transition};
use crate::options::{DependentOptionResolver, OptionSnapshot, PendingResolution};
use crate::render::{FieldView, GroupView, RenderNode, Widget};

/// Side-channel state of one mounted field.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStatus {
    pub mounted: bool,
    /// A debounced effect is scheduled or running.
    pub loading: bool,
    /// The debounce timer is armed and has not fired.
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionSnapshot>,
}

/// Reactive engine over one schema tree.
///
/// The engine never owns form values. Each call receives the host's store, reads the value
/// tree from it, and writes back only single addresses: hide-transition clears and the
/// values passed to [`FormEngine::handle_change`].
pub struct FormEngine {
    fields: Vec<FieldSchema>,
    report: SchemaReport,
    config: EngineConfig,
    dispatcher: FieldTypeDispatcher,
    lifecycle: LifecycleManager,
    debounce: DebouncedEffectRunner,
    options: DependentOptionResolver,
    mounted: BTreeSet<String>,
    pending: Vec<PendingResolution>,
}

impl FormEngine {
    pub fn new(fields: Vec<FieldSchema>, config: EngineConfig) -> Result<Self, EngineError> {
        let report = check_schema(&fields)?;
        Ok(Self {
            fields,
            report,
            config,
            dispatcher: FieldTypeDispatcher::default(),
            lifecycle: LifecycleManager::new(),
            debounce: DebouncedEffectRunner::new(),
            options: DependentOptionResolver::new(),
            mounted: BTreeSet::new(),
            pending: Vec::new(),
        })
    }

    pub fn with_dispatcher(mut self, dispatcher: FieldTypeDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn report(&self) -> &SchemaReport {
        &self.report
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn field(&self, address: &str) -> Option<&FieldSchema> {
        find_field(&self.fields, address)
    }

    /// Swaps in a regenerated schema. Nodes whose address disappeared are unmounted.
    pub fn replace_schema(&mut self, fields: Vec<FieldSchema>) -> Result<(), EngineError> {
        let report = check_schema(&fields)?;
        let live: BTreeSet<String> = report.addresses.iter().cloned().collect();
        let vanished: Vec<String> = self
            .mounted
            .iter()
            .filter(|address| !live.contains(*address))
            .cloned()
            .collect();
        for address in vanished {
            self.unmount(&address);
        }
        self.lifecycle.retain(|address| live.contains(address));
        self.fields = fields;
        self.report = report;
        Ok(())
    }

    /// Runs one top-down pass and returns the mounted tree.
    ///
    /// Visibility and hide-transition clears are repeated until no clear changes the value
    /// tree, so a field whose rule targets a freshly cleared field settles in the same call.
    /// Schema checking rules out cycles, which bounds the number of rounds.
    pub fn render(&mut self, store: &mut dyn FormStore) -> Vec<RenderNode> {
        let rounds = self.report.addresses.len() + 1;
        for _ in 0..rounds {
            let cleared = sync_lifecycle(&mut self.lifecycle, &self.fields, None, store);
            if cleared.is_empty() {
                break;
            }
            debug!(count = cleared.len(), "hide transitions cleared values");
        }

        let mut live = BTreeSet::new();
        let fields = std::mem::take(&mut self.fields);
        let nodes = self.build(&fields, None, &*store, &mut live);
        self.fields = fields;

        let gone: Vec<String> = self.mounted.difference(&live).cloned().collect();
        for address in gone {
            self.unmount(&address);
        }
        for address in live.difference(&self.mounted) {
            debug!(%address, "field mounted");
        }
        self.mounted = live;
        nodes
    }

    fn build(
        &mut self,
        fields: &[FieldSchema],
        parent: Option<&str>,
        store: &dyn FormStore,
        live: &mut BTreeSet<String>,
    ) -> Vec<RenderNode> {
        let mut nodes = Vec::new();
        for field in fields {
            let address = path::qualify(parent, &field.name);
            if self.lifecycle.state(&address) != Some(Presence::Shown) {
                continue;
            }
            live.insert(address.clone());

            let node = match self.dispatcher.dispatch(field) {
                Behavior::Custom(render) => {
                    let context = RenderContext {
                        address: &address,
                        value: store.get_value(&address),
                        default_value: field.default_value.as_ref(),
                        error: store.get_error(&address),
                    };
                    RenderNode::Custom {
                        output: render(&context),
                        address,
                    }
                }
                Behavior::Unsupported(type_name) => {
                    debug!(%address, %type_name, "unsupported field type");
                    RenderNode::Unsupported {
                        message: format!("{}: {type_name}", self.config.unsupported_label),
                        address,
                        type_name,
                    }
                }
                behavior if behavior.is_group() => {
                    let widget = match &behavior {
                        Behavior::Override { widget, .. } => Some(widget(&WidgetContext {
                            field,
                            address: &address,
                            value: store.get_value(&address),
                            error: store.get_error(&address),
                            props: field.override_props.as_ref(),
                        })),
                        _ => None,
                    };
                    let error = store
                        .get_error(&address)
                        .map(|error| resolve_error_message(field, error));
                    let children = self.build(&field.children, Some(&address), store, live);
                    RenderNode::Group(GroupView {
                        label: field.display_label().to_string(),
                        widget,
                        error,
                        children,
                        address,
                    })
                }
                Behavior::Override { widget, .. } => {
                    let output = widget(&WidgetContext {
                        field,
                        address: &address,
                        value: store.get_value(&address),
                        error: store.get_error(&address),
                        props: field.override_props.as_ref(),
                    });
                    RenderNode::Field(self.field_view(field, address, Widget::Override(output), store))
                }
                Behavior::Builtin(kind) => {
                    RenderNode::Field(self.field_view(field, address, Widget::Builtin(kind), store))
                }
            };
            nodes.push(node);
        }
        nodes
    }

    fn field_view(
        &mut self,
        field: &FieldSchema,
        address: String,
        widget: Widget,
        store: &dyn FormStore,
    ) -> FieldView {
        let parent_value = field
            .depends_on
            .as_deref()
            .and_then(|depends_on| store.get_value(depends_on));
        if let Some(pending) = self.options.observe(field, &address, parent_value) {
            self.pending.push(pending);
        }
        let snapshot = self.options.snapshot(&address);

        let (options, option_loading, fetch_error) = match snapshot {
            Some(snapshot) => (snapshot.options, snapshot.loading, snapshot.fetch_error),
            None => (field.options.clone(), false, false),
        };

        FieldView {
            label: field.display_label().to_string(),
            kind: field.kind.as_str().to_string(),
            widget,
            value: store
                .get_value(&address)
                .cloned()
                .or_else(|| field.default_value.clone()),
            options,
            loading: option_loading || self.debounce.is_loading(&address),
            fetch_error: fetch_error.then(|| self.config.fetch_error_message.clone()),
            error: store
                .get_error(&address)
                .map(|error| resolve_error_message(field, error)),
            required: field.required,
            disabled: field.disabled,
            placeholder: field.placeholder.clone(),
            help_text: field.help_text.clone(),
            address,
        }
    }

    /// Writes a user edit and runs the field's value-change side channels.
    ///
    /// Number fields store numeric strings as numbers. The synchronous hook runs before this
    /// returns; the debounced hook is scheduled on the current tokio runtime, and only while
    /// the field is mounted since nothing would cancel its timer otherwise.
    pub fn handle_change(
        &mut self,
        store: &mut dyn FormStore,
        address: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        let field = find_field(&self.fields, address)
            .ok_or_else(|| EngineError::UnknownField(address.to_string()))?;
        let value = coerce(field, value);
        store.set_value(address, value.clone());

        if let Some(hook) = &field.hooks.on_value_change {
            hook(&value, store);
        }

        if let Some(hook) = &field.hooks.on_value_change_debounced {
            if self.mounted.contains(address) {
                let hook = Arc::clone(hook);
                let delay = self.config.debounce_for(field.debounce_ms);
                if let Err(err) = self.debounce.schedule(address, delay, move || hook(value)) {
                    warn!(%address, error = %err, "debounced change not scheduled");
                }
            } else {
                debug!(%address, "field not mounted, debounced change skipped");
            }
        }

        if field.show_error_on_blur && store.get_error(address).is_some() {
            store.trigger_validation(address);
        }
        Ok(())
    }

    /// Re-validates fields that opt into showing errors on blur.
    pub fn handle_blur(
        &mut self,
        store: &mut dyn FormStore,
        address: &str,
    ) -> Result<(), EngineError> {
        let field = find_field(&self.fields, address)
            .ok_or_else(|| EngineError::UnknownField(address.to_string()))?;
        if field.show_error_on_blur {
            store.trigger_validation(address);
        }
        Ok(())
    }

    /// Whether `text` may be typed into the field: it must match `allowedPattern` and fit
    /// within `maxLength`. Unknown addresses accept nothing.
    pub fn accepts_input(&self, address: &str, text: &str) -> bool {
        let Some(field) = find_field(&self.fields, address) else {
            return false;
        };
        let fits = field
            .max_length
            .is_none_or(|max| text.chars().count() <= max);
        fits && presets::accepts_input(field, text)
    }

    pub fn is_mounted(&self, address: &str) -> bool {
        self.mounted.contains(address)
    }

    pub fn field_status(&self, address: &str) -> FieldStatus {
        FieldStatus {
            mounted: self.is_mounted(address),
            loading: self.debounce.is_loading(address),
            pending: self.debounce.is_pending(address),
            options: self.options.snapshot(address),
        }
    }

    /// Hands queued option resolutions to the caller.
    pub fn take_pending(&mut self) -> Vec<PendingResolution> {
        std::mem::take(&mut self.pending)
    }

    /// Spawns every queued resolution on the current tokio runtime.
    pub fn spawn_pending(&mut self) -> Result<Vec<JoinHandle<bool>>, EngineError> {
        let handle = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        Ok(self
            .take_pending()
            .into_iter()
            .map(|pending| handle.spawn(pending.resolve()))
            .collect())
    }

    /// Drives every queued resolution to completion and returns how many were committed.
    pub async fn settle_pending(&mut self) -> usize {
        let pending = self.take_pending();
        join_all(pending.into_iter().map(PendingResolution::resolve))
            .await
            .into_iter()
            .filter(|committed| *committed)
            .count()
    }

    fn unmount(&mut self, address: &str) {
        debug!(%address, "field unmounted");
        self.debounce.cancel(address);
        self.options.unmount(address);
        self.mounted.remove(address);
    }
}

impl Drop for FormEngine {
    fn drop(&mut self) {
        self.debounce.cancel_all();
    }
}

/// Feeds every reachable node's visibility to the lifecycle manager, applying hide clears.
/// Returns the addresses written.
fn sync_lifecycle(
    lifecycle: &mut LifecycleManager,
    fields: &[FieldSchema],
    parent: Option<&str>,
    store: &mut dyn FormStore,
) -> Vec<String> {
    let mut cleared = Vec::new();
    for field in fields {
        let address = path::qualify(parent, &field.name);
        let visible = is_visible(field.visible_when.as_ref(), store.values());
        if lifecycle.observe(&address, visible) == Some(Transition::Hidden) {
            cleared.extend(lifecycle.hide(field, &address, store));
        }
        if visible && field.kind.is_group() {
            cleared.extend(sync_lifecycle(lifecycle, &field.children, Some(&address), store));
        }
    }
    cleared
}

fn coerce(field: &FieldSchema, value: Value) -> Value {
    if field.kind != FieldType::Number {
        return value;
    }
    let Value::String(text) = &value else {
        return value;
    };
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Value::Number(integer.into());
    }
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => value,
    }
}
