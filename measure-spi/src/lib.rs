//! Measurement Service Provider Registry
//!
//! Lets a host pick which implementation backs the measurement services at
//! runtime:
//! - Providers implement [`ServiceProvider`] and declare a priority
//! - A [`Discovery`] source enumerates them once, on first use
//! - [`ProviderRegistry`] orders them and tracks the current provider
//!
//! All registry operations are safe to call from multiple threads. Reads
//! never block once the registry is populated.
//!
//! ```ignore
//! measure_spi::submit_provider!(MyProvider::default());
//!
//! let provider = measure_spi::current()?;
//! let formats = provider.format_service();
//! ```

mod discovery;
mod provider;
mod registry;

pub use discovery::{Discovery, InventoryDiscovery, ProviderRegistration, StaticDiscovery};
pub use provider::{ProviderInfo, ServiceProvider};
pub use registry::{global, ProviderRegistry, Providers};

pub use measure_core::{DiscoveryError, Result, SpiError};

#[doc(hidden)]
pub use inventory;

use std::sync::Arc;

/// Providers of the [global](global()) registry, highest priority first
pub fn available() -> Result<Providers> {
    global().available()
}

/// Provider of the [global](global()) registry with the given name
pub fn of(name: &str) -> Result<Arc<dyn ServiceProvider>> {
    global().of(name)
}

/// Current provider of the [global](global()) registry
pub fn current() -> Result<Arc<dyn ServiceProvider>> {
    global().current()
}

/// Replace the current provider of the [global](global()) registry
pub fn set_current(provider: Arc<dyn ServiceProvider>) -> Result<Option<Arc<dyn ServiceProvider>>> {
    global().set_current(provider)
}

/// Re-export core types for provider authors
pub mod prelude {
    pub use crate::{
        Discovery, ProviderInfo, ProviderRegistry, Providers, ServiceProvider, StaticDiscovery,
    };
    pub use measure_core::prelude::*;
}
