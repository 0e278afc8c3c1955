//! Provider Registry
//!
//! Providers are held in an immutable snapshot sorted by priority, highest
//! first. Readers load the published snapshot without locking. Writers
//! (first discovery, `set_current`, `reset`) serialize on one mutex, build a
//! replacement snapshot, and publish it atomically; a published snapshot is
//! never modified.

use crate::discovery::{Discovery, InventoryDiscovery, StaticDiscovery};
use crate::{ProviderInfo, ServiceProvider};
use arc_swap::ArcSwapOption;
use measure_core::{Result, SpiError};
use parking_lot::Mutex;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};

const LOG_TARGET: &str = "measure_spi";

type ProviderList = Vec<Arc<dyn ServiceProvider>>;

/// Read-only view of one published snapshot, in preference order
#[derive(Clone)]
pub struct Providers(Arc<ProviderList>);

impl Providers {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name()).collect()
    }

    pub fn describe(&self) -> Vec<ProviderInfo> {
        self.0.iter().map(|p| p.describe()).collect()
    }

    /// True when both views come from the same published snapshot
    pub fn same_snapshot(&self, other: &Providers) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Providers {
    type Target = [Arc<dyn ServiceProvider>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Providers {
    type Item = &'a Arc<dyn ServiceProvider>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn ServiceProvider>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Registry of discovered service providers
pub struct ProviderRegistry {
    discovery: Box<dyn Discovery>,
    providers: ArcSwapOption<ProviderList>,
    write_lock: Mutex<()>,
}

impl ProviderRegistry {
    /// Create an unpopulated registry. `discovery` runs on first read.
    pub fn new(discovery: impl Discovery + 'static) -> Self {
        Self {
            discovery: Box::new(discovery),
            providers: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_providers<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ServiceProvider>>,
    {
        Self::new(providers.into_iter().collect::<StaticDiscovery>())
    }

    pub fn is_populated(&self) -> bool {
        self.providers.load().is_some()
    }

    /// All providers, highest priority first, with any provider passed to
    /// [`set_current`](Self::set_current) at the front.
    pub fn available(&self) -> Result<Providers> {
        self.snapshot().map(Providers)
    }

    /// The first provider whose name equals `name`. Among providers sharing
    /// a name, the one with the highest priority wins.
    pub fn of(&self, name: &str) -> Result<Arc<dyn ServiceProvider>> {
        if name.is_empty() {
            return Err(SpiError::NullArgument { argument: "name" });
        }

        let providers = self.snapshot()?;
        providers
            .iter()
            .find(|p| p.name() == name)
            .cloned()
            .ok_or_else(|| SpiError::NotFound {
                name: name.to_string(),
                available: providers.iter().map(|p| p.name().to_string()).collect(),
            })
    }

    pub fn current(&self) -> Result<Arc<dyn ServiceProvider>> {
        self.snapshot()?
            .first()
            .cloned()
            .ok_or(SpiError::NoProviderAvailable)
    }

    /// Make `provider` the current provider, regardless of its priority.
    ///
    /// Nothing changes when `provider` is already the current instance.
    /// Otherwise `provider` moves to the front: its own entry is removed if
    /// present, else the first entry with the same name (the one [`of`](Self::of)
    /// would return) is replaced. All other providers keep their relative
    /// order. Returns the provider that was current before, or `None` if the
    /// registry was empty.
    pub fn set_current(
        &self,
        provider: Arc<dyn ServiceProvider>,
    ) -> Result<Option<Arc<dyn ServiceProvider>>> {
        if provider.name().is_empty() {
            return Err(SpiError::NullArgument { argument: "provider" });
        }

        let _guard = self.write_lock.lock();
        let providers = self.populate_locked()?;
        let previous = providers.first().cloned();

        if previous.as_ref().is_some_and(|head| same_instance(head, &provider)) {
            return Ok(previous);
        }

        let replaced = providers
            .iter()
            .position(|p| same_instance(p, &provider))
            .or_else(|| providers.iter().position(|p| p.name() == provider.name()));

        let mut reordered = Vec::with_capacity(providers.len() + 1);
        reordered.push(provider.clone());
        reordered.extend(
            providers
                .iter()
                .enumerate()
                .filter(|&(i, _)| Some(i) != replaced)
                .map(|(_, p)| p.clone()),
        );
        self.providers.store(Some(Arc::new(reordered)));

        // Logged under the lock so event order matches publication order.
        let name = provider.name();
        match previous {
            None => debug!(
                target: LOG_TARGET,
                provider = name,
                "Measurement service provider set to {}",
                name
            ),
            Some(_) => debug!(
                target: LOG_TARGET,
                provider = name,
                "Measurement service provider replaced by {}",
                name
            ),
        }

        Ok(previous)
    }

    /// Drop the published snapshot; the next read runs discovery again.
    pub fn reset(&self) {
        let _guard = self.write_lock.lock();
        self.providers.store(None);
        trace!(target: LOG_TARGET, "provider registry reset");
    }

    fn snapshot(&self) -> Result<Arc<ProviderList>> {
        if let Some(providers) = self.providers.load_full() {
            return Ok(providers);
        }

        let _guard = self.write_lock.lock();
        self.populate_locked()
    }

    /// Caller must hold `write_lock`.
    fn populate_locked(&self) -> Result<Arc<ProviderList>> {
        // Another thread may have published while we waited for the lock.
        if let Some(providers) = self.providers.load_full() {
            return Ok(providers);
        }

        let mut loaded = match self.discovery.discover() {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(target: LOG_TARGET, error = %err, "provider discovery failed");
                return Err(err.into());
            }
        };

        // Stable: equal priorities keep discovery order.
        loaded.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let published = Arc::new(loaded);
        self.providers.store(Some(published.clone()));
        debug!(target: LOG_TARGET, count = published.len(), "providers discovered");
        Ok(published)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers = self.providers.load_full();
        f.debug_struct("ProviderRegistry")
            .field("providers", &providers.as_deref())
            .finish_non_exhaustive()
    }
}

/// Same allocation, ignoring trait-object metadata
fn same_instance(a: &Arc<dyn ServiceProvider>, b: &Arc<dyn ServiceProvider>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Process-wide registry, populated from providers registered with
/// [`submit_provider!`](crate::submit_provider).
pub fn global() -> &'static ProviderRegistry {
    static GLOBAL: OnceLock<ProviderRegistry> = OnceLock::new();
    GLOBAL.get_or_init(|| ProviderRegistry::new(InventoryDiscovery))
}
