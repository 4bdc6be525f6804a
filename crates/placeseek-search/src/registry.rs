//! Backend registry - maps URI schemes to database constructors
//!
//! A process-wide registry is built on first use with the built-in backends
//! already registered. Extra backends should be registered at startup,
//! before the first `new_database` call.

use std::collections::HashMap;
use std::sync::OnceLock;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use tracing::info;
use url::Url;

use crate::backends;
use crate::database::FullTextDatabase;
use crate::error::{Result, SearchError};

/// Builds a database from its full connection URI
pub type DatabaseConstructor = fn(Url) -> BoxFuture<'static, Result<Box<dyn FullTextDatabase>>>;

/// Scheme → constructor table
pub struct DatabaseRegistry {
    constructors: RwLock<HashMap<String, DatabaseConstructor>>,
}

impl DatabaseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the `sqlite` and `null` backends registered
    pub fn with_builtin_backends() -> Self {
        let registry = Self::new();
        backends::register_builtin(&registry);
        registry
    }

    /// Bind `scheme` to `constructor`
    ///
    /// A scheme can only be bound once.
    pub fn register(&self, scheme: &str, constructor: DatabaseConstructor) -> Result<()> {
        let scheme = scheme.to_ascii_lowercase();
        let mut constructors = self.constructors.write();

        if constructors.contains_key(&scheme) {
            return Err(SearchError::DuplicateScheme(scheme));
        }

        info!("Registering full-text database scheme: {}", scheme);
        constructors.insert(scheme, constructor);
        Ok(())
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.constructors
            .read()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.constructors.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Open a database for a connection URI
    ///
    /// The constructor's own result, including its errors, is returned as-is.
    pub async fn open(&self, uri: &str) -> Result<Box<dyn FullTextDatabase>> {
        let url = Url::parse(uri).map_err(|e| {
            SearchError::InvalidConfiguration(format!("Invalid database URI '{}': {}", uri, e))
        })?;

        let constructor = self
            .constructors
            .read()
            .get(url.scheme())
            .copied()
            .ok_or_else(|| SearchError::UnknownScheme(url.scheme().to_string()))?;

        info!("Opening full-text database with scheme {}", url.scheme());
        constructor(url).await
    }
}

impl Default for DatabaseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DatabaseRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

static REGISTRY: OnceLock<DatabaseRegistry> = OnceLock::new();

/// The process-wide registry
pub fn registry() -> &'static DatabaseRegistry {
    REGISTRY.get_or_init(DatabaseRegistry::with_builtin_backends)
}

/// Register a backend with the process-wide registry
pub fn register_database(scheme: &str, constructor: DatabaseConstructor) -> Result<()> {
    registry().register(scheme, constructor)
}

/// Open a database through the process-wide registry
pub async fn new_database(uri: &str) -> Result<Box<dyn FullTextDatabase>> {
    registry().open(uri).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn failing_constructor(_url: Url) -> BoxFuture<'static, Result<Box<dyn FullTextDatabase>>> {
        async {
            let outcome: Result<Box<dyn FullTextDatabase>> =
                Err(SearchError::InvalidConfiguration("always fails".to_string()));
            outcome
        }
        .boxed()
    }

    #[test]
    fn test_duplicate_scheme_rejected() {
        let registry = DatabaseRegistry::new();
        registry.register("mock", failing_constructor).unwrap();

        let err = registry.register("mock", failing_constructor).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateScheme(s) if s == "mock"));

        let err = registry.register("MOCK", failing_constructor).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateScheme(_)));
    }

    #[tokio::test]
    async fn test_unknown_scheme() {
        let registry = DatabaseRegistry::new();
        let err = registry.open("postgres://?dsn=x").await.unwrap_err();
        assert!(matches!(err, SearchError::UnknownScheme(s) if s == "postgres"));
    }

    #[tokio::test]
    async fn test_constructor_error_passed_through() {
        let registry = DatabaseRegistry::new();
        registry.register("mock", failing_constructor).unwrap();

        let err = registry.open("mock://").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(m) if m == "always fails"));
    }

    #[tokio::test]
    async fn test_unparseable_uri() {
        let registry = DatabaseRegistry::with_builtin_backends();
        let err = registry.open("not a uri").await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_builtin_backends() {
        let registry = DatabaseRegistry::with_builtin_backends();
        assert_eq!(registry.schemes(), vec!["null", "sqlite"]);
        assert!(registry.is_registered("SQLITE"));
    }

    #[test]
    fn test_global_registry_rejects_builtin_reregistration() {
        let err = register_database("sqlite", failing_constructor).unwrap_err();
        assert!(matches!(err, SearchError::DuplicateScheme(_)));
    }
}
