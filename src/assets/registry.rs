//! Write-once registry of interactive props
//!
//! As each named asset finishes loading, the session records its scene
//! handle here. Picking iterates the registry and silently skips names
//! whose loads have not landed yet, so interaction decouples cleanly from
//! load-order timing.

use std::collections::HashMap;

/// Opaque reference to a loaded object in the scene. Valid for the
/// lifetime of the session that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropHandle(pub(crate) usize);

impl PropHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Logical prop name → handle of the loaded object. Entries are
/// write-once: the first insert wins and later ones are rejected.
#[derive(Debug, Default)]
pub struct PropRegistry {
    entries: HashMap<String, PropHandle>,
}

impl PropRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly loaded prop. Returns false (and keeps the
    /// existing entry) if the name was already registered.
    pub fn insert(&mut self, name: &str, handle: PropHandle) -> bool {
        if self.entries.contains_key(name) {
            log::warn!("prop '{}' registered twice; keeping first entry", name);
            return false;
        }
        self.entries.insert(name.to_string(), handle);
        true
    }

    pub fn get(&self, name: &str) -> Option<PropHandle> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PropHandle)> {
        self.entries.iter().map(|(name, h)| (name.as_str(), *h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = PropRegistry::new();
        assert!(registry.insert("letter", PropHandle(0)));
        assert_eq!(registry.get("letter"), Some(PropHandle(0)));
        assert!(registry.get("canon").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_entries_are_write_once() {
        let mut registry = PropRegistry::new();
        assert!(registry.insert("canon", PropHandle(3)));
        assert!(!registry.insert("canon", PropHandle(7)));
        assert_eq!(registry.get("canon"), Some(PropHandle(3)));
    }
}
