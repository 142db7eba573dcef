//! Registry for managing catalog plugins.

use std::sync::Arc;

use super::{GoogleBooksSource, OpenLibrarySource, Source, SourceError};
use crate::config::Config;
use crate::utils::HttpClient;

bitflags::bitflags! {
    /// Capabilities that a source can support
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const SEARCH = 1 << 0;
        const ID_LOOKUP = 1 << 1;
    }
}

/// Ordered registry of catalog sources
///
/// Sources keep their registration order. Searches fan out to every
/// searchable source; id lookups walk the sources front to back.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in catalogs: Google Books, then Open Library
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)?;

        let mut registry = Self::new();
        registry.register(Arc::new(GoogleBooksSource::with_client(
            client.clone(),
            &config.providers.google_books_url,
            config.api_keys.google_books.clone(),
        )));
        registry.register(Arc::new(OpenLibrarySource::with_client(
            client,
            &config.providers.open_library_url,
            &config.providers.open_library_covers_url,
        )));

        Ok(registry)
    }

    /// Register a source at the end of the precedence order.
    ///
    /// A source with an id that is already registered replaces the old one in place.
    pub fn register(&mut self, source: Arc<dyn Source>) {
        match self.sources.iter().position(|s| s.id() == source.id()) {
            Some(index) => self.sources[index] = source,
            None => self.sources.push(source),
        }
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Get a source by ID, returning an error if not found
    pub fn get_required(&self, id: &str) -> Result<&Arc<dyn Source>, SourceError> {
        self.get(id)
            .ok_or_else(|| SourceError::NotFound(format!("Source '{}' not found", id)))
    }

    /// All registered sources in precedence order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// All source IDs in precedence order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    /// Sources that support a specific capability, in precedence order
    pub fn with_capability(&self, capability: SourceCapabilities) -> Vec<&Arc<dyn Source>> {
        self.all()
            .filter(|s| s.capabilities().contains(capability))
            .collect()
    }

    /// Sources that support search
    pub fn searchable(&self) -> Vec<&Arc<dyn Source>> {
        self.with_capability(SourceCapabilities::SEARCH)
    }

    /// Sources that support lookup by id
    pub fn lookups(&self) -> Vec<&Arc<dyn Source>> {
        self.with_capability(SourceCapabilities::ID_LOOKUP)
    }

    /// Check if a source exists
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MockSource;

    #[test]
    fn test_registry_from_config() {
        let registry = SourceRegistry::from_config(&Config::default()).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert_eq!(
            registry.ids().collect::<Vec<_>>(),
            vec!["google_books", "open_library"]
        );
    }

    #[test]
    fn test_get_source() {
        let registry = SourceRegistry::from_config(&Config::default()).unwrap();

        let google = registry.get("google_books");
        assert!(google.is_some());
        assert_eq!(google.unwrap().name(), "Google Books");

        assert!(registry.get("nonexistent").is_none());
        assert!(registry.get_required("nonexistent").is_err());
    }

    #[test]
    fn test_capabilities() {
        let registry = SourceRegistry::from_config(&Config::default()).unwrap();

        assert_eq!(registry.searchable().len(), 2);
        assert_eq!(registry.lookups().len(), 2);

        let open_library = registry.get("open_library").unwrap();
        assert!(open_library.supports_search());
        assert!(open_library.supports_id_lookup());
    }

    #[test]
    fn test_register_preserves_order() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(MockSource::with_id("b")));
        registry.register(Arc::new(MockSource::with_id("a")));
        registry.register(Arc::new(MockSource::with_id("c")));

        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = SourceRegistry::new();
        registry.register(Arc::new(MockSource::with_id("a")));
        registry.register(Arc::new(MockSource::with_id("b")));
        registry.register(Arc::new(
            MockSource::with_id("a").with_capabilities(SourceCapabilities::ID_LOOKUP),
        ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(!registry.get("a").unwrap().supports_search());
        assert_eq!(registry.searchable().len(), 1);
    }
}
