use std::sync::Arc;

use crate::error::Result;
use crate::parser::element::ElementParser;
use crate::parser::grammar;
use crate::property::shape::{resolve_shape, ContainerKind, Shape};
use crate::property::simple::SimpleProperty;
use crate::registry::callback::CallbackMap;
use crate::registry::store::PropertyStore;

/// A configuration key exposed as an ordered list of `T`, parsed from a
/// comma-separated raw string.
pub struct ListProperty<T> {
    inner: SimpleProperty<Vec<T>>,
}

impl<T: Clone + Send + Sync + 'static> ListProperty<T> {
    pub(crate) fn new(
        name: String,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Result<Self> {
        let shape = resolve_shape(&element, ContainerKind::List)?;
        Ok(Self::with_shape(name, shape, element, store, callbacks))
    }

    pub(crate) fn with_shape(
        name: String,
        shape: Shape,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Self {
        let parse: Arc<dyn Fn(&str) -> Result<Vec<T>> + Send + Sync> =
            Arc::new(move |raw| grammar::parse_list(raw, &element));
        Self {
            inner: SimpleProperty::new(name, shape, store, callbacks, parse),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn shape(&self) -> Shape {
        self.inner.shape()
    }

    pub fn value(&self) -> Result<Option<Vec<T>>> {
        self.inner.value()
    }

    pub fn value_or(&self, default: Vec<T>) -> Result<Vec<T>> {
        self.inner.value_or(default)
    }

    pub fn required(&self) -> Result<Vec<T>> {
        self.inner.required()
    }

    pub fn on_change(
        &self,
        observer: impl Fn(Option<&Vec<T>>, Option<&Vec<T>>) + Send + Sync + 'static,
    ) {
        self.inner.on_change(observer)
    }
}

impl<T: Clone + Send + Sync + 'static> std::fmt::Debug for ListProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListProperty")
            .field("name", &self.inner.name())
            .field("shape", &self.inner.shape())
            .finish()
    }
}
