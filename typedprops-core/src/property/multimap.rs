use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::parser::element::ElementParser;
use crate::parser::grammar;
use crate::property::shape::{resolve_shape, ContainerKind, Shape};
use crate::property::simple::SimpleProperty;
use crate::registry::callback::CallbackMap;
use crate::registry::store::PropertyStore;

/// Insertion-ordered multimap produced by the multimap grammar: keys iterate
/// in first-seen order, values within a key in encounter order. Key counts
/// are small in practice, so lookup is a linear scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multimap<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> Multimap<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.as_str() == key)
            .map(|(_, values)| values.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub(crate) fn append(&mut self, key: &str, value: T) {
        match self
            .entries
            .iter()
            .position(|(existing, _)| existing.as_str() == key)
        {
            Some(index) => self.entries[index].1.push(value),
            None => self.entries.push((key.to_owned(), vec![value])),
        }
    }
}

impl<T> Default for Multimap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Serialize for Multimap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, values) in &self.entries {
            map.serialize_entry(key, values)?;
        }
        map.end()
    }
}

/// A configuration key exposed as a mapping from string keys to ordered
/// lists of `T`, parsed from a comma-separated raw string of `key=value`
/// pairs with key carry-forward.
pub struct MultimapProperty<T> {
    inner: SimpleProperty<Multimap<T>>,
}

impl<T: Clone + Send + Sync + 'static> MultimapProperty<T> {
    pub(crate) fn new(
        name: String,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Result<Self> {
        let shape = resolve_shape(&element, ContainerKind::Multimap)?;
        Ok(Self::with_shape(name, shape, element, store, callbacks))
    }

    pub(crate) fn with_shape(
        name: String,
        shape: Shape,
        element: ElementParser<T>,
        store: Arc<PropertyStore>,
        callbacks: Arc<CallbackMap>,
    ) -> Self {
        let parse: Arc<dyn Fn(&str) -> Result<Multimap<T>> + Send + Sync> =
            Arc::new(move |raw| grammar::parse_multimap(raw, &element));
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

    pub fn value(&self) -> Result<Option<Multimap<T>>> {
        self.inner.value()
    }

    pub fn value_or(&self, default: Multimap<T>) -> Result<Multimap<T>> {
        self.inner.value_or(default)
    }

    pub fn required(&self) -> Result<Multimap<T>> {
        self.inner.required()
    }

    pub fn on_change(
        &self,
        observer: impl Fn(Option<&Multimap<T>>, Option<&Multimap<T>>) + Send + Sync + 'static,
    ) {
        self.inner.on_change(observer)
    }
}

#[cfg(test)]
mod tests {
    use super::Multimap;

    #[test]
    fn append_groups_values_under_their_key() {
        let mut map = Multimap::new();
        map.append("a", 1);
        map.append("b", 2);
        map.append("a", 3);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&[1, 3][..]));
        assert_eq!(map.get("b"), Some(&[2][..]));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn keys_iterate_in_first_seen_order() {
        let mut map = Multimap::new();
        map.append("z", 1);
        map.append("a", 2);
        map.append("z", 3);
        map.append("m", 4);

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }

    #[test]
    fn serializes_as_an_ordered_json_object() {
        let mut map = Multimap::new();
        map.append("b", 1);
        map.append("a", 2);
        map.append("b", 3);

        let rendered = serde_json::to_string(&map).unwrap();
        assert_eq!(rendered, r#"{"b":[1,3],"a":[2]}"#);
    }
}
