use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::property::shape::Shape;
use crate::registry::store::PropertyChange;

type Observer<V> = dyn Fn(Option<&V>, Option<&V>) + Send + Sync;
type DispatchFn = dyn Fn(&str, Option<&str>, Option<&str>) + Send + Sync;

/// Observers for one `(name, shape)` pair. Every property declaring the same
/// name and shape shares one slot, so a reload re-parses the raw string once
/// per shape, not once per observer.
pub(crate) struct PropertySlot<V> {
    parse: Arc<dyn Fn(&str) -> Result<V> + Send + Sync>,
    observers: RwLock<Vec<Arc<Observer<V>>>>,
}

impl<V> PropertySlot<V> {
    fn new(parse: Arc<dyn Fn(&str) -> Result<V> + Send + Sync>) -> Self {
        Self {
            parse,
            observers: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_observer(&self, observer: Arc<Observer<V>>) {
        self.observers.write().push(observer);
    }

    /// Re-parses both sides of a change; observers only run when both sides
    /// convert. A side that no longer converts is logged and the
    /// notification skipped, leaving each property's cached value in place.
    fn accept(&self, name: &str, shape: Shape, old_raw: Option<&str>, new_raw: Option<&str>) {
        let old = match old_raw.map(|raw| (*self.parse)(raw)).transpose() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, name, %shape, "previous raw value no longer converts; skipping notification");
                return;
            }
        };
        let new = match new_raw.map(|raw| (*self.parse)(raw)).transpose() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, name, %shape, "new raw value does not convert; skipping notification");
                return;
            }
        };

        let observers: Vec<Arc<Observer<V>>> = self.observers.read().iter().map(Arc::clone).collect();
        for observer in observers {
            (*observer)(old.as_ref(), new.as_ref());
        }
    }
}

struct SlotEntry {
    slot: Arc<dyn Any + Send + Sync>,
    dispatch: Arc<DispatchFn>,
}

impl SlotEntry {
    fn new<V: Send + Sync + 'static>(shape: Shape, slot: Arc<PropertySlot<V>>) -> Self {
        let dispatch = {
            let slot = Arc::clone(&slot);
            Arc::new(move |name: &str, old: Option<&str>, new: Option<&str>| {
                slot.accept(name, shape, old, new);
            })
        };
        Self { slot, dispatch }
    }
}

/// Shared observer registry, keyed by name and declared shape. The registry
/// owns it; properties hold non-owning references and register slots at
/// construction time.
#[derive(Default)]
pub(crate) struct CallbackMap {
    entries: RwLock<HashMap<String, HashMap<Shape, SlotEntry>>>,
}

impl CallbackMap {
    /// Returns the shared slot for `(name, shape)`, creating it from `parse`
    /// on first registration.
    pub(crate) fn slot<V: Send + Sync + 'static>(
        &self,
        name: &str,
        shape: Shape,
        parse: Arc<dyn Fn(&str) -> Result<V> + Send + Sync>,
    ) -> Arc<PropertySlot<V>> {
        let mut entries = self.entries.write();
        let by_shape = entries.entry(name.to_owned()).or_default();

        if let Some(entry) = by_shape.get(&shape) {
            if let Ok(slot) = Arc::clone(&entry.slot).downcast::<PropertySlot<V>>() {
                return slot;
            }
        }

        let slot = Arc::new(PropertySlot::new(parse));
        by_shape.insert(shape, SlotEntry::new(shape, Arc::clone(&slot)));
        slot
    }

    /// Invokes every shape's re-parse hook registered under the changed name.
    /// Hooks run outside the map lock so observers may register properties.
    pub(crate) fn dispatch(&self, change: &PropertyChange) {
        let hooks: Vec<Arc<DispatchFn>> = {
            let entries = self.entries.read();
            match entries.get(&change.name) {
                Some(by_shape) => by_shape
                    .values()
                    .map(|entry| Arc::clone(&entry.dispatch))
                    .collect(),
                None => Vec::new(),
            }
        };

        for hook in hooks {
            (*hook)(&change.name, change.old.as_deref(), change.new.as_deref());
        }
    }
}
