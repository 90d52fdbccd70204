//! Per-key cancellable debounce over the tokio timer.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use form_spec::HookError;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::error::EngineError;

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    timer: Option<AbortHandle>,
    loading: bool,
}

type Slots = Arc<Mutex<HashMap<String, Slot>>>;

/// Holds at most one armed timer per key. Scheduling again replaces the armed timer; an
/// effect whose timer already fired runs to completion but no longer owns the loading flag.
#[derive(Debug, Clone, Default)]
pub struct DebouncedEffectRunner {
    slots: Slots,
}

impl DebouncedEffectRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `effect` to run after `delay`, cancelling any timer still pending under `key`.
    pub fn schedule<F, Fut>(&self, key: &str, delay: Duration, effect: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        let handle = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let mut slots = lock(&self.slots);
        let slot = slots.entry(key.to_string()).or_default();
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            debug!(%key, "superseding pending debounced effect");
            timer.abort();
        }
        slot.loading = true;
        let generation = slot.generation;

        let shared = Arc::clone(&self.slots);
        let owned_key = key.to_string();
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slots = lock(&shared);
                match slots.get_mut(&owned_key) {
                    Some(slot) if slot.generation == generation => slot.timer = None,
                    _ => return,
                }
            }

            let outcome = effect().await;
            if let Err(err) = &outcome {
                warn!(key = %owned_key, error = %err, "debounced effect failed");
            }

            let mut slots = lock(&shared);
            if let Some(slot) = slots.get_mut(&owned_key)
                && slot.generation == generation
            {
                slot.loading = false;
            }
        });
        slot.timer = Some(task.abort_handle());
        Ok(())
    }

    /// Cancels the pending timer under `key` and forgets its state.
    pub fn cancel(&self, key: &str) {
        if let Some(slot) = lock(&self.slots).remove(key)
            && let Some(timer) = slot.timer
        {
            debug!(%key, "cancelled pending debounced effect");
            timer.abort();
        }
    }

    /// Cancels every key for which `matches` holds.
    pub fn cancel_where(&self, matches: impl Fn(&str) -> bool) {
        let mut slots = lock(&self.slots);
        slots.retain(|key, slot| {
            if !matches(key) {
                return true;
            }
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
            false
        });
    }

    pub fn cancel_all(&self) {
        self.cancel_where(|_| true);
    }

    /// True from scheduling until the latest effect for `key` settles.
    pub fn is_loading(&self, key: &str) -> bool {
        lock(&self.slots)
            .get(key)
            .is_some_and(|slot| slot.loading)
    }

    /// True while a timer is armed and has not fired yet.
    pub fn is_pending(&self, key: &str) -> bool {
        lock(&self.slots)
            .get(key)
            .is_some_and(|slot| slot.timer.is_some())
    }
}

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<String, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}
