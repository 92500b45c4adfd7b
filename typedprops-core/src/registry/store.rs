use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Raw string value for one configuration key, stamped with the version it
/// was loaded under. Versions come from a store-global counter and are never
/// reused, so a cached parse keyed by version can never match a different raw
/// value, even after a name is removed and later re-added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub value: String,
    pub version: u64,
}

/// One changed entry observed during a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub name: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Shared raw-value store. The registry owns it and is the only writer;
/// properties hold non-owning references and only ever read.
#[derive(Default)]
pub struct PropertyStore {
    entries: RwLock<HashMap<String, RawProperty>>,
    next_version: AtomicU64,
}

impl PropertyStore {
    pub fn lookup(&self, name: &str) -> Option<RawProperty> {
        self.entries.read().get(name).cloned()
    }

    /// Replaces the whole snapshot under the write lock, keeping versions of
    /// unchanged entries so cached parses stay valid. Returns the changes,
    /// sorted by name for deterministic notification order.
    pub(crate) fn replace(&self, snapshot: HashMap<String, String>) -> Vec<PropertyChange> {
        let mut changes = Vec::new();

        {
            let mut entries = self.entries.write();
            let mut next = HashMap::with_capacity(snapshot.len());

            for (name, value) in snapshot {
                match entries.get(&name) {
                    Some(existing) if existing.value == value => {
                        let kept = existing.clone();
                        next.insert(name, kept);
                    }
                    existing => {
                        changes.push(PropertyChange {
                            name: name.clone(),
                            old: existing.map(|raw| raw.value.clone()),
                            new: Some(value.clone()),
                        });
                        let version = self.bump();
                        next.insert(name, RawProperty { value, version });
                    }
                }
            }

            for (name, raw) in entries.iter() {
                if !next.contains_key(name) {
                    changes.push(PropertyChange {
                        name: name.clone(),
                        old: Some(raw.value.clone()),
                        new: None,
                    });
                }
            }

            *entries = next;
        }

        changes.sort_by(|left, right| left.name.cmp(&right.name));
        changes
    }

    fn bump(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed) + 1
    }
}
