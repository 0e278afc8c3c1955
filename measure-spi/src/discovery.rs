//! Provider discovery sources
//!
//! A [`Discovery`] enumerates candidate providers. The registry calls it at
//! most once per population and does the ordering itself, so sources return
//! providers in whatever order they find them.

use crate::ServiceProvider;
use measure_core::DiscoveryError;
use std::sync::Arc;

/// Source of candidate providers
pub trait Discovery: Send + Sync {
    fn discover(&self) -> Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError>;
}

impl<F> Discovery for F
where
    F: Fn() -> Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError> + Send + Sync,
{
    fn discover(&self) -> Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError> {
        self()
    }
}

/// Link-time registration entry, created by [`submit_provider!`](crate::submit_provider)
pub struct ProviderRegistration {
    pub constructor: fn() -> Arc<dyn ServiceProvider>,
}

inventory::collect!(ProviderRegistration);

/// Register a provider with [`InventoryDiscovery`]
///
/// The expression is evaluated each time discovery runs.
///
/// ```ignore
/// measure_spi::submit_provider!(SiProvider::new());
/// ```
#[macro_export]
macro_rules! submit_provider {
    ($provider:expr) => {
        $crate::inventory::submit! {
            $crate::ProviderRegistration {
                constructor: || -> ::std::sync::Arc<dyn $crate::ServiceProvider> {
                    ::std::sync::Arc::new($provider)
                },
            }
        }
    };
}

/// Discovers every provider registered with [`submit_provider!`](crate::submit_provider)
/// in the linked binary. Enumeration order is unspecified.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryDiscovery;

impl Discovery for InventoryDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError> {
        let mut providers = Vec::new();
        for reg in inventory::iter::<ProviderRegistration> {
            providers.push((reg.constructor)());
        }
        Ok(providers)
    }
}

/// Fixed list of providers, enumerated in insertion order
#[derive(Default, Clone)]
pub struct StaticDiscovery {
    providers: Vec<Arc<dyn ServiceProvider>>,
}

impl StaticDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider<P: ServiceProvider>(self, provider: P) -> Self {
        self.with_shared(Arc::new(provider))
    }

    pub fn with_shared(mut self, provider: Arc<dyn ServiceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl FromIterator<Arc<dyn ServiceProvider>> for StaticDiscovery {
    fn from_iter<I: IntoIterator<Item = Arc<dyn ServiceProvider>>>(iter: I) -> Self {
        Self {
            providers: iter.into_iter().collect(),
        }
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn ServiceProvider>>, DiscoveryError> {
        Ok(self.providers.clone())
    }
}
