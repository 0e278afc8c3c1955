//! Service provider trait

use measure_core::{FormatService, QuantityFactory, QuantityType, SystemOfUnitsService};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Summary of a provider, for hosts that list what is installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub priority: i32,
    pub system_of_units: bool,
    pub format: bool,
}

/// Pluggable implementation of the measurement services
///
/// Providers are shared as `Arc<dyn ServiceProvider>`. The registry orders
/// them by [`priority`](ServiceProvider::priority) and looks them up by
/// [`name`](ServiceProvider::name); the service accessors are passed through
/// untouched.
pub trait ServiceProvider: Send + Sync + 'static {
    /// Identity used for lookup. Should be unique enough to tell providers
    /// apart, e.g. the crate or type name.
    fn name(&self) -> &str;

    /// Higher wins when several providers are installed
    fn priority(&self) -> i32 {
        0
    }

    fn system_of_units_service(&self) -> Option<Arc<dyn SystemOfUnitsService>>;

    fn format_service(&self) -> Option<Arc<dyn FormatService>>;

    fn quantity_factory(&self, quantity: QuantityType) -> Option<Arc<dyn QuantityFactory>>;

    fn describe(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.name().to_string(),
            priority: self.priority(),
            system_of_units: self.system_of_units_service().is_some(),
            format: self.format_service().is_some(),
        }
    }
}

impl fmt::Debug for dyn ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .finish()
    }
}
