#![allow(missing_docs)]

pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod options;
pub mod render;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cmd;

pub use config::EngineConfig;
pub use debounce::DebouncedEffectRunner;
pub use dispatch::{Behavior, FieldTypeDispatcher, WidgetKind};
pub use engine::{FieldStatus, FormEngine};
pub use error::EngineError;
pub use lifecycle::{LifecycleManager, Presence, Transition};
pub use options::{DependentOptionResolver, OptionSnapshot, PendingResolution};
pub use render::{
    FieldView, GroupView, RenderNode, Widget, find_node, mounted_addresses, render_json, render_text,
};

pub use form_spec;
