//! Dependent option lists with epoch-checked staleness.
//!
//! Every change of a field's watched parent value bumps the field's epoch. A resolution
//! carries the epoch it was started under and is only committed while that epoch is still
//! current, so a slow answer for an older parent value can never overwrite a newer one.
//! Unmounting keeps the epoch, so a remounted field never reuses one still in flight.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use form_spec::{FieldOption, FieldSchema, OptionError, OptionFuture, OptionSource};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct OptionState {
    mounted: bool,
    epoch: u64,
    parent_value: Option<Value>,
    options: Vec<FieldOption>,
    loading: bool,
    fetch_error: bool,
}

type States = Arc<Mutex<HashMap<String, OptionState>>>;

/// What a dependent field currently shows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSnapshot {
    pub epoch: u64,
    pub options: Vec<FieldOption>,
    pub loading: bool,
    pub fetch_error: bool,
}

/// An asynchronous resolution started under a specific epoch.
pub struct PendingResolution {
    address: String,
    epoch: u64,
    future: OptionFuture,
    states: States,
}

impl PendingResolution {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Awaits the resolver and commits its outcome. Returns whether it was committed.
    pub async fn resolve(self) -> bool {
        let PendingResolution {
            address,
            epoch,
            future,
            states,
        } = self;
        let outcome = future.await;
        commit(&states, &address, epoch, outcome)
    }
}

impl fmt::Debug for PendingResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResolution")
            .field("address", &self.address)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependentOptionResolver {
    states: States,
}

impl DependentOptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current parent value of a mounted field.
    ///
    /// Fields without an option resolver always use their static options and never track
    /// state. An unchanged parent value is a no-op. A changed one bumps the epoch, marks the
    /// field loading, clears any fetch error and invokes the resolver; a ready list commits
    /// at once, a pending one is handed back for the caller to drive.
    pub fn observe(
        &self,
        field: &FieldSchema,
        address: &str,
        parent_value: Option<&Value>,
    ) -> Option<PendingResolution> {
        let resolver = field.hooks.option_resolver.as_ref()?;

        let epoch = {
            let mut states = lock(&self.states);
            let state = states.entry(address.to_string()).or_default();
            if state.mounted && state.parent_value.as_ref() == parent_value {
                return None;
            }
            state.mounted = true;
            state.epoch += 1;
            state.parent_value = parent_value.cloned();
            state.loading = true;
            state.fetch_error = false;
            debug!(%address, epoch = state.epoch, "option epoch advanced");
            state.epoch
        };

        match resolver(parent_value) {
            OptionSource::Ready(options) => {
                commit(&self.states, address, epoch, Ok(options));
                None
            }
            OptionSource::Pending(future) => Some(PendingResolution {
                address: address.to_string(),
                epoch,
                future,
                states: Arc::clone(&self.states),
            }),
        }
    }

    /// Commits an outcome obtained outside [`PendingResolution::resolve`].
    pub fn commit(
        &self,
        address: &str,
        epoch: u64,
        outcome: Result<Vec<FieldOption>, OptionError>,
    ) -> bool {
        commit(&self.states, address, epoch, outcome)
    }

    pub fn snapshot(&self, address: &str) -> Option<OptionSnapshot> {
        lock(&self.states)
            .get(address)
            .filter(|state| state.mounted)
            .map(|state| OptionSnapshot {
            epoch: state.epoch,
            options: state.options.clone(),
            loading: state.loading,
            fetch_error: state.fetch_error,
        })
    }

    /// Drops what `address` shows; resolutions still in flight for it will be discarded.
    pub fn unmount(&self, address: &str) {
        if let Some(state) = lock(&self.states).get_mut(address)
            && state.mounted
        {
            release(state);
            debug!(%address, epoch = state.epoch, "option state dropped");
        }
    }

    pub fn unmount_where(&self, matches: impl Fn(&str) -> bool) {
        for (address, state) in lock(&self.states).iter_mut() {
            if state.mounted && matches(address) {
                release(state);
            }
        }
    }
}

fn commit(
    states: &States,
    address: &str,
    epoch: u64,
    outcome: Result<Vec<FieldOption>, OptionError>,
) -> bool {
    let mut states = lock(states);
    let Some(state) = states.get_mut(address).filter(|state| state.mounted) else {
        debug!(%address, epoch, "discarding options for unmounted field");
        return false;
    };
    if state.epoch != epoch {
        debug!(
            %address,
            epoch,
            current = state.epoch,
            "discarding stale option resolution"
        );
        return false;
    }

    state.loading = false;
    match outcome {
        Ok(options) => {
            state.options = options;
            state.fetch_error = false;
        }
        Err(err) => {
            warn!(%address, error = %err, "option resolution failed");
            state.options.clear();
            state.fetch_error = true;
        }
    }
    true
}

fn release(state: &mut OptionState) {
    state.mounted = false;
    state.parent_value = None;
    state.options.clear();
    state.loading = false;
    state.fetch_error = false;
}

fn lock(states: &States) -> MutexGuard<'_, HashMap<String, OptionState>> {
    states.lock().unwrap_or_else(PoisonError::into_inner)
}
