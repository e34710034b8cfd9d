//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, IdentityProvider, ProductStore};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: Arc<dyn ProductStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create application state backed by the HTTP backend client.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let client = Arc::new(BackendClient::new(&config.backend));
        Self::with_backends(config, client.clone(), client)
    }

    /// Create application state with explicit backends.
    ///
    /// Used by tests to plug in [`crate::backend::MemoryBackend`].
    #[must_use]
    pub fn with_backends(
        config: StorefrontConfig,
        products: Arc<dyn ProductStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the product store.
    #[must_use]
    pub fn products(&self) -> &dyn ProductStore {
        self.inner.products.as_ref()
    }

    /// Get the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }
}
