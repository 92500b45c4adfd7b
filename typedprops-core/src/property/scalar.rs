use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::element::ElementParser;
use crate::property::shape::Shape;
use crate::property::simple::SimpleProperty;
use crate::registry::callback::CallbackMap;
use crate::registry::store::PropertyStore;

/// A configuration key exposed as a single value of `T`; the element parser
/// is the whole conversion, no container grammar involved.
pub struct ScalarProperty<T> {
    inner: SimpleProperty<T>,
}

impl<T: Clone + Send + Sync + 'static> ScalarProperty<T> {
    pub(crate) fn new(
        name: String,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Result<Self> {
        let Some(kind) = element.kind() else {
            return Err(Error::UnsupportedShape(
                "cannot declare a scalar shape for a custom element parser".to_owned(),
            ));
        };
        Ok(Self::with_shape(
            name,
            Shape::Scalar(kind),
            element,
            store,
            callbacks,
        ))
    }

    pub(crate) fn with_shape(
        name: String,
        shape: Shape,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Self {
        let parse: Arc<dyn Fn(&str) -> Result<T> + Send + Sync> =
            Arc::new(move |raw| element.parse(raw));
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

    pub fn value(&self) -> Result<Option<T>> {
        self.inner.value()
    }

    pub fn value_or(&self, default: T) -> Result<T> {
        self.inner.value_or(default)
    }

    pub fn required(&self) -> Result<T> {
        self.inner.required()
    }

    pub fn on_change(&self, observer: impl Fn(Option<&T>, Option<&T>) + Send + Sync + 'static) {
        self.inner.on_change(observer)
    }
}
