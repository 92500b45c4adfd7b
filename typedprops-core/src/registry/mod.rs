pub(crate) mod callback;
pub mod store;

pub use store::{PropertyChange, PropertyStore, RawProperty};

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::parser::element::{ElementKind, ElementParser};
use crate::property::list::ListProperty;
use crate::property::multimap::MultimapProperty;
use crate::property::scalar::ScalarProperty;
use crate::property::shape::Shape;
use crate::registry::callback::CallbackMap;

/// Owns the raw-value store and the observer registry, and hands out typed
/// properties holding non-owning references to both.
///
/// The registry does not fetch or watch configuration sources; snapshots are
/// handed to it fully formed via [`with_properties`](Self::with_properties)
/// and [`reload`](Self::reload).
pub struct ConfigRegistry {
    store: Arc<PropertyStore>,
    callbacks: Arc<CallbackMap>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self {
            store: Arc::new(PropertyStore::default()),
            callbacks: Arc::new(CallbackMap::default()),
        }
    }

    pub fn with_properties(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let registry = Self::new();
        registry.store.replace(pairs.into_iter().collect());
        registry
    }

    /// Replaces the raw snapshot wholesale and notifies observers of every
    /// added, changed, or removed name. The swap is atomic: readers see
    /// either the old snapshot or the new one, never a partial mix.
    /// Notification runs outside the store's write lock.
    pub fn reload(&self, snapshot: impl IntoIterator<Item = (String, String)>) {
        let changes = self.store.replace(snapshot.into_iter().collect());
        for change in &changes {
            tracing::debug!(name = change.name.as_str(), "raw property changed");
            self.callbacks.dispatch(change);
        }
    }

    /// List property for an arbitrary element parser. Fails fast with an
    /// unsupported-parser error when the parser cannot back a declared
    /// shape; no property is half-built.
    pub fn list_property<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        element: ElementParser<T>,
    ) -> Result<ListProperty<T>> {
        ListProperty::new(
            name.to_owned(),
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }

    /// Multimap property for an arbitrary element parser; same construction
    /// contract as [`list_property`](Self::list_property).
    pub fn multimap_property<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        element: ElementParser<T>,
    ) -> Result<MultimapProperty<T>> {
        MultimapProperty::new(
            name.to_owned(),
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }

    /// Scalar property for an arbitrary element parser; same construction
    /// contract as [`list_property`](Self::list_property).
    pub fn scalar_property<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        element: ElementParser<T>,
    ) -> Result<ScalarProperty<T>> {
        ScalarProperty::new(
            name.to_owned(),
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }

    pub fn string_property(&self, name: &str) -> ScalarProperty<String> {
        self.scalar(name, Shape::Scalar(ElementKind::String), ElementParser::string())
    }

    pub fn double_property(&self, name: &str) -> ScalarProperty<f64> {
        self.scalar(name, Shape::Scalar(ElementKind::Double), ElementParser::double())
    }

    pub fn long_property(&self, name: &str) -> ScalarProperty<i64> {
        self.scalar(name, Shape::Scalar(ElementKind::Long), ElementParser::long())
    }

    pub fn int_property(&self, name: &str) -> ScalarProperty<i32> {
        self.scalar(name, Shape::Scalar(ElementKind::Int), ElementParser::int())
    }

    pub fn duration_property(&self, name: &str) -> ScalarProperty<Duration> {
        self.scalar(
            name,
            Shape::Scalar(ElementKind::Duration),
            ElementParser::duration(),
        )
    }

    pub fn string_list_property(&self, name: &str) -> ListProperty<String> {
        self.list(name, Shape::List(ElementKind::String), ElementParser::string())
    }

    pub fn double_list_property(&self, name: &str) -> ListProperty<f64> {
        self.list(name, Shape::List(ElementKind::Double), ElementParser::double())
    }

    pub fn long_list_property(&self, name: &str) -> ListProperty<i64> {
        self.list(name, Shape::List(ElementKind::Long), ElementParser::long())
    }

    pub fn int_list_property(&self, name: &str) -> ListProperty<i32> {
        self.list(name, Shape::List(ElementKind::Int), ElementParser::int())
    }

    pub fn duration_list_property(&self, name: &str) -> ListProperty<Duration> {
        self.list(
            name,
            Shape::List(ElementKind::Duration),
            ElementParser::duration(),
        )
    }

    pub fn string_multimap_property(&self, name: &str) -> MultimapProperty<String> {
        self.multimap(
            name,
            Shape::Multimap(ElementKind::String),
            ElementParser::string(),
        )
    }

    pub fn double_multimap_property(&self, name: &str) -> MultimapProperty<f64> {
        self.multimap(
            name,
            Shape::Multimap(ElementKind::Double),
            ElementParser::double(),
        )
    }

    pub fn long_multimap_property(&self, name: &str) -> MultimapProperty<i64> {
        self.multimap(
            name,
            Shape::Multimap(ElementKind::Long),
            ElementParser::long(),
        )
    }

    pub fn int_multimap_property(&self, name: &str) -> MultimapProperty<i32> {
        self.multimap(
            name,
            Shape::Multimap(ElementKind::Int),
            ElementParser::int(),
        )
    }

    pub fn duration_multimap_property(&self, name: &str) -> MultimapProperty<Duration> {
        self.multimap(
            name,
            Shape::Multimap(ElementKind::Duration),
            ElementParser::duration(),
        )
    }

    fn scalar<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        shape: Shape,
        element: ElementParser<T>,
    ) -> ScalarProperty<T> {
        ScalarProperty::with_shape(
            name.to_owned(),
            shape,
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }

    fn list<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        shape: Shape,
        element: ElementParser<T>,
    ) -> ListProperty<T> {
        ListProperty::with_shape(
            name.to_owned(),
            shape,
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }

    fn multimap<T: Clone + Send + Sync + 'static>(
        &self,
        name: &str,
        shape: Shape,
        element: ElementParser<T>,
    ) -> MultimapProperty<T> {
        MultimapProperty::with_shape(
            name.to_owned(),
            shape,
            element,
            Arc::clone(&self.store),
            Arc::clone(&self.callbacks),
        )
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::ConfigRegistry;
    use crate::error::Error;
    use crate::parser::element::{ElementKind, ElementParser};
    use crate::property::shape::Shape;

    fn registry_with(pairs: &[(&str, &str)]) -> ConfigRegistry {
        ConfigRegistry::with_properties(
            pairs
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned())),
        )
    }

    fn reload_with(registry: &ConfigRegistry, pairs: &[(&str, &str)]) {
        registry.reload(
            pairs
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned())),
        );
    }

    #[test]
    fn container_properties_parse_their_declared_grammar() {
        let registry = registry_with(&[
            ("server.ports", "8080,8081,8082"),
            ("routes", "api=v1,v2,web=v3"),
            ("timeouts", "connect=250ms,read=5s"),
        ]);

        let ports = registry.int_list_property("server.ports");
        assert_eq!(ports.required().unwrap(), vec![8080, 8081, 8082]);
        assert_eq!(ports.shape(), Shape::List(ElementKind::Int));

        let routes = registry.string_multimap_property("routes");
        let routes = routes.required().unwrap();
        assert_eq!(
            routes.get("api"),
            Some(&["v1".to_owned(), "v2".to_owned()][..])
        );
        assert_eq!(routes.get("web"), Some(&["v3".to_owned()][..]));

        let timeouts = registry.duration_multimap_property("timeouts");
        let timeouts = timeouts.required().unwrap();
        assert_eq!(timeouts.get("connect"), Some(&[Duration::from_millis(250)][..]));
        assert_eq!(timeouts.get("read"), Some(&[Duration::from_secs(5)][..]));
    }

    #[test]
    fn scalar_properties_use_the_element_parser_directly() {
        let registry = registry_with(&[("pool.size", "16"), ("greeting", "hello, world")]);

        assert_eq!(registry.int_property("pool.size").required().unwrap(), 16);
        // Scalars see the whole raw string, commas included.
        assert_eq!(
            registry.string_property("greeting").required().unwrap(),
            "hello, world"
        );
    }

    #[test]
    fn custom_parsers_cannot_declare_container_shapes() {
        let registry = registry_with(&[]);
        let error = registry
            .list_property("lengths", ElementParser::custom(|token| Ok(token.len())))
            .expect_err("custom parsers cannot back a declared shape");
        assert!(matches!(error, Error::UnsupportedShape(_)));
    }

    #[test]
    fn absent_names_fall_back_or_fail_per_accessor() {
        let registry = registry_with(&[]);
        let ports = registry.int_list_property("server.ports");

        assert_eq!(ports.value().unwrap(), None);
        assert_eq!(ports.value_or(vec![80]).unwrap(), vec![80]);

        let error = ports.required().expect_err("absent name should fail");
        assert!(matches!(error, Error::Missing(_)));
        assert!(error.to_string().contains("server.ports"));
    }

    #[test]
    fn conversion_errors_are_atomic_and_surface_on_read() {
        let registry = registry_with(&[("server.ports", "8080,eighty,8082")]);
        let ports = registry.int_list_property("server.ports");

        let error = ports.value().expect_err("malformed token should fail");
        assert!(error.to_string().contains("invalid int 'eighty'"));
    }

    #[test]
    fn reload_notifies_observers_with_old_and_new_values() {
        let registry = registry_with(&[("server.ports", "8080")]);
        let ports = registry.int_list_property("server.ports");
        assert_eq!(ports.required().unwrap(), vec![8080]);

        let observed = Arc::new(Mutex::new(Vec::new()));
        {
            let observed = Arc::clone(&observed);
            ports.on_change(move |old: Option<&Vec<i32>>, new: Option<&Vec<i32>>| {
                observed.lock().push((old.cloned(), new.cloned()));
            });
        }

        reload_with(&registry, &[("server.ports", "8080,8081")]);
        assert_eq!(ports.required().unwrap(), vec![8080, 8081]);

        reload_with(&registry, &[]);
        assert_eq!(ports.value().unwrap(), None);

        let observed = observed.lock();
        assert_eq!(
            observed.as_slice(),
            &[
                (Some(vec![8080]), Some(vec![8080, 8081])),
                (Some(vec![8080, 8081]), None),
            ]
        );
    }

    #[test]
    fn unchanged_names_do_not_notify() {
        let registry = registry_with(&[("a", "1"), ("b", "2")]);
        let property = registry.int_property("a");

        let notifications = Arc::new(AtomicUsize::new(0));
        {
            let notifications = Arc::clone(&notifications);
            property.on_change(move |_, _| {
                notifications.fetch_add(1, Ordering::SeqCst);
            });
        }

        reload_with(&registry, &[("a", "1"), ("b", "3")]);
        assert_eq!(notifications.load(Ordering::SeqCst), 0);

        reload_with(&registry, &[("a", "2"), ("b", "3")]);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_reparse_skips_observers_and_keeps_errors_for_readers() {
        let registry = registry_with(&[("server.ports", "8080")]);
        let ports = registry.int_list_property("server.ports");
        assert_eq!(ports.required().unwrap(), vec![8080]);

        let notifications = Arc::new(AtomicUsize::new(0));
        {
            let notifications = Arc::clone(&notifications);
            ports.on_change(move |_, _| {
                notifications.fetch_add(1, Ordering::SeqCst);
            });
        }

        reload_with(&registry, &[("server.ports", "not-a-port")]);
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
        assert!(ports.value().is_err());
    }

    #[test]
    fn properties_sharing_a_name_and_shape_share_notifications() {
        let registry = registry_with(&[("server.ports", "8080")]);
        let first = registry.int_list_property("server.ports");
        let second = registry.int_list_property("server.ports");

        let notifications = Arc::new(AtomicUsize::new(0));
        for property in [&first, &second] {
            let notifications = Arc::clone(&notifications);
            property.on_change(move |_, _| {
                notifications.fetch_add(1, Ordering::SeqCst);
            });
        }

        reload_with(&registry, &[("server.ports", "9090")]);
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
        assert_eq!(second.required().unwrap(), vec![9090]);
    }

    #[test]
    fn readded_names_never_serve_a_stale_cache() {
        let registry = registry_with(&[("flag", "on")]);
        let flag = registry.string_property("flag");
        assert_eq!(flag.required().unwrap(), "on");

        reload_with(&registry, &[]);
        assert_eq!(flag.value().unwrap(), None);

        reload_with(&registry, &[("flag", "off")]);
        assert_eq!(flag.required().unwrap(), "off");
    }
}
