use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::property::shape::Shape;
use crate::registry::callback::{CallbackMap, PropertySlot};
use crate::registry::store::PropertyStore;

/// Shared base for every typed property: lazy parse of the current raw
/// value, a cache keyed by raw-value version, and observer registration on
/// the per-`(name, shape)` callback slot.
///
/// The store and callback map are owned by the registry; this type holds
/// non-owning references and never writes to either.
pub struct SimpleProperty<V> {
    name: String,
    shape: Shape,
    store: Arc<PropertyStore>,
    slot: Arc<PropertySlot<V>>,
    parse: Arc<dyn Fn(&str) -> Result<V> + Send + Sync>,
    cache: RwLock<Option<CacheSlot<V>>>,
}

struct CacheSlot<V> {
    version: u64,
    value: V,
}

impl<V: Clone + Send + Sync + 'static> SimpleProperty<V> {
    pub(crate) fn new(
        name: String,
        shape: Shape,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
        parse: Arc<dyn Fn(&str) -> Result<V> + Send + Sync>,
    ) -> Self {
        let slot = callbacks.slot(&name, shape, Arc::clone(&parse));
        Self {
            name,
            shape,
            store,
            slot,
            parse,
            cache: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Current typed value: `Ok(None)` when no raw value is registered under
    /// the name, an error when the raw value does not convert. The raw
    /// string is parsed at most once per raw-value version; a conversion
    /// failure leaves the previously cached value in place.
    pub fn value(&self) -> Result<Option<V>> {
        let Some(raw) = self.store.lookup(&self.name) else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.read().as_ref() {
            if cached.version == raw.version {
                return Ok(Some(cached.value.clone()));
            }
        }

        let mut cache = self.cache.write();
        if let Some(cached) = cache.as_ref() {
            if cached.version == raw.version {
                return Ok(Some(cached.value.clone()));
            }
        }

        let value = (*self.parse)(&raw.value)?;
        *cache = Some(CacheSlot {
            version: raw.version,
            value: value.clone(),
        });
        Ok(Some(value))
    }

    pub fn value_or(&self, default: V) -> Result<V> {
        Ok(self.value()?.unwrap_or(default))
    }

    /// Like [`value`](Self::value), but absence is an error.
    pub fn required(&self) -> Result<V> {
        self.value()?.ok_or_else(|| Error::Missing(self.name.clone()))
    }

    /// Registers an observer invoked with the `(old, new)` typed values after
    /// a successful re-parse triggered by a reload of this property's name.
    pub fn on_change(&self, observer: impl Fn(Option<&V>, Option<&V>) + Send + Sync + 'static) {
        self.slot.add_observer(Arc::new(observer));
    }
}
