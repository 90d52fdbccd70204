//! Clear-or-preserve decisions applied when a node's visibility flips.

use std::collections::BTreeMap;

use form_spec::path;
use form_spec::{FieldSchema, FormRead, FormStore};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Shown,
    Hidden,
}

impl Presence {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            Presence::Shown
        } else {
            Presence::Hidden
        }
    }
}

/// Edge between two presence states. Steady states produce no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Hidden,
    Shown,
}

/// Tracks the last observed presence of every node by qualified address.
///
/// A node never observed before is treated as `Shown`, so mounting hidden fires a hide
/// transition exactly once.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    states: BTreeMap<String, Presence>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, address: &str) -> Option<Presence> {
        self.states.get(address).copied()
    }

    pub fn observe(&mut self, address: &str, visible: bool) -> Option<Transition> {
        let next = Presence::from_visible(visible);
        let previous = self
            .states
            .insert(address.to_string(), next)
            .unwrap_or(Presence::Shown);
        match (previous, next) {
            (Presence::Shown, Presence::Hidden) => {
                debug!(%address, "field hidden");
                Some(Transition::Hidden)
            }
            (Presence::Hidden, Presence::Shown) => {
                debug!(%address, "field shown");
                Some(Transition::Shown)
            }
            _ => None,
        }
    }

    /// Applies a hide transition for `field` at `address` and returns the addresses written.
    ///
    /// Leaves without `preserveValue` that hold a value are reset to their default or empty
    /// value. Groups recurse into their children; a preserving node keeps its whole subtree
    /// and descendants already hidden are left alone. The subtree's presence state is then
    /// dropped, so showing the node again mounts its descendants afresh.
    pub fn hide(
        &mut self,
        field: &FieldSchema,
        address: &str,
        store: &mut dyn FormStore,
    ) -> Vec<String> {
        let mut cleared = Vec::new();
        if !field.preserve_value {
            if field.kind.is_group() {
                self.hide_children(field, address, store, &mut cleared);
            } else {
                clear_leaf(field, address, store, &mut cleared);
            }
        }
        self.forget_below(address);
        cleared
    }

    fn hide_children(
        &self,
        group: &FieldSchema,
        address: &str,
        store: &mut dyn FormStore,
        cleared: &mut Vec<String>,
    ) {
        for child in &group.children {
            let child_address = path::qualify(Some(address), &child.name);
            if self.state(&child_address) == Some(Presence::Hidden) || child.preserve_value {
                continue;
            }
            if child.kind.is_group() {
                self.hide_children(child, &child_address, store, cleared);
            } else {
                clear_leaf(child, &child_address, store, cleared);
            }
        }
    }

    fn forget_below(&mut self, address: &str) {
        self.states
            .retain(|tracked, _| tracked == address || !path::is_within(tracked, address));
    }

    /// Drops state for `address` and everything beneath it.
    pub fn forget(&mut self, address: &str) {
        self.states
            .retain(|tracked, _| !path::is_within(tracked, address));
    }

    /// Drops state for every address not in `live`.
    pub fn retain(&mut self, live: impl Fn(&str) -> bool) {
        self.states.retain(|tracked, _| live(tracked.as_str()));
    }
}

fn clear_leaf(
    field: &FieldSchema,
    address: &str,
    store: &mut dyn FormStore,
    cleared: &mut Vec<String>,
) {
    if store.get_value(address).is_none() {
        return;
    }
    let fallback = field.fallback_value();
    debug!(%address, value = %fallback, "clearing hidden field");
    store.set_value(address, fallback);
    cleared.push(address.to_string());
}
