//! Capability contracts exposed by service providers
//!
//! The registry stores and returns these services but never looks inside
//! them. Each contract exposes `as_any` so a host can downcast to the
//! concrete service of the provider it selected.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key identifying a quantity type, e.g. `QuantityType::of::<Length>()`
#[derive(Clone, Copy)]
pub struct QuantityType {
    id: TypeId,
    name: &'static str,
}

impl QuantityType {
    pub fn of<Q: ?Sized + 'static>() -> Self {
        QuantityType {
            id: TypeId::of::<Q>(),
            name: std::any::type_name::<Q>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics only
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    pub fn is<Q: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<Q>()
    }
}

impl PartialEq for QuantityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QuantityType {}

impl Hash for QuantityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuantityType({})", self.name)
    }
}

impl fmt::Display for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Service giving access to systems of units
pub trait SystemOfUnitsService: Send + Sync {
    /// Names of the systems of units this service can return
    fn available_systems(&self) -> Vec<String>;

    /// Name of the system used when none is requested
    fn default_system(&self) -> Option<String> {
        self.available_systems().into_iter().next()
    }

    fn as_any(&self) -> &dyn Any;
}

/// Service giving access to unit and quantity formats
pub trait FormatService: Send + Sync {
    fn available_formats(&self) -> Vec<String>;

    fn as_any(&self) -> &dyn Any;
}

/// Factory creating quantities of one quantity type
pub trait QuantityFactory: Send + Sync {
    fn quantity_type(&self) -> QuantityType;

    fn as_any(&self) -> &dyn Any;
}

impl dyn SystemOfUnitsService {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

impl dyn FormatService {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

impl dyn QuantityFactory {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}
