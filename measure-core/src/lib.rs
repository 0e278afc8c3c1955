//! Measure Core - Fundamental types
//!
//! This crate provides the types shared by service providers and hosts:
//! - `SpiError`: Structured errors for provider lookup and selection
//! - `QuantityType`: Key for per-quantity factories
//! - Capability contracts: `SystemOfUnitsService`, `FormatService`, `QuantityFactory`

mod error;
mod service;

pub use error::{codes, DiscoveryError, ErrorReport, Result, SpiError};
pub use service::{FormatService, QuantityFactory, QuantityType, SystemOfUnitsService};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        DiscoveryError, FormatService, QuantityFactory, QuantityType, SpiError,
        SystemOfUnitsService,
    };
    pub use crate::error::codes;
}
