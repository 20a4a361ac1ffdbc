//! Common lookup trait for the name-keyed asset tables.

/// Read-only registry mapping names to loaded assets.
///
/// Registries are filled once while the context is built and only read
/// afterwards, so there is no mutation in the interface.
///
/// # Type Parameters
///
/// * `V` - The type of value stored in the registry
pub trait Registry<V> {
    /// Check if an entry with the given name exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get an entry by name.
    ///
    /// Returns `None` if no entry with the given name exists.
    fn get(&self, name: &str) -> Option<&V>;

    /// Get the number of entries.
    fn len(&self) -> usize;

    /// Check if the registry is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get an iterator over all names in the registry.
    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_>;
}
