use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::debug;

use crate::path;
use crate::spec::field::FieldSchema;
use crate::validate::{FieldError, ValidationReport, validate_field, validate_form};

/// Read side of the form-state store.
pub trait FormRead {
    /// The whole value tree, as last written.
    fn values(&self) -> &Value;

    fn get_value(&self, address: &str) -> Option<&Value> {
        path::resolve(self.values(), address)
    }

    fn get_error(&self, address: &str) -> Option<&FieldError>;
}

/// Write side of the form-state store. The engine only ever writes single addresses.
pub trait FormStore: FormRead {
    fn set_value(&mut self, address: &str, value: Value);

    /// Re-runs validation for one address, recording or clearing its error.
    fn trigger_validation(&mut self, address: &str);
}

/// In-memory store over a JSON value tree.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    values: Value,
    errors: BTreeMap<String, FieldError>,
    fields: Vec<FieldSchema>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: Value::Object(Map::new()),
            errors: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// Registers `fields` for validation and seeds every declared default at its address.
    pub fn with_defaults(fields: &[FieldSchema]) -> Self {
        let mut store = Self::new();
        store.fields = fields.to_vec();
        seed_defaults(&mut store.values, fields, None);
        store
    }

    /// Overlays `values` on top of the current tree.
    pub fn with_values(mut self, values: Value) -> Self {
        merge(&mut self.values, values);
        self
    }

    pub fn errors(&self) -> &BTreeMap<String, FieldError> {
        &self.errors
    }

    /// Validates every visible field and replaces the recorded errors.
    pub fn validate_all(&mut self) -> ValidationReport {
        let report = validate_form(&self.fields, &self.values);
        self.errors = report.errors.clone();
        report
    }

    pub fn set_error(&mut self, address: &str, error: FieldError) {
        self.errors.insert(address.to_string(), error);
    }

    pub fn into_values(self) -> Value {
        self.values
    }
}

impl FormRead for MemoryStore {
    fn values(&self) -> &Value {
        &self.values
    }

    fn get_error(&self, address: &str) -> Option<&FieldError> {
        self.errors.get(address)
    }
}

impl FormStore for MemoryStore {
    fn set_value(&mut self, address: &str, value: Value) {
        path::assign(&mut self.values, address, value);
    }

    fn trigger_validation(&mut self, address: &str) {
        let Some(field) = crate::spec::field::find_field(&self.fields, address) else {
            debug!(%address, "validation requested for unregistered address");
            return;
        };
        match validate_field(field, path::resolve(&self.values, address)) {
            Some(error) => {
                self.errors.insert(address.to_string(), error);
            }
            None => {
                self.errors.remove(address);
            }
        }
    }
}

fn seed_defaults(values: &mut Value, fields: &[FieldSchema], parent: Option<&str>) {
    for field in fields {
        let address = path::qualify(parent, &field.name);
        if let Some(default) = &field.default_value {
            path::assign(values, &address, default.clone());
        }
        if !field.children.is_empty() {
            seed_defaults(values, &field.children, Some(&address));
        }
    }
}

fn merge(target: &mut Value, overlay: Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, overlay) => *target = overlay,
    }
}
