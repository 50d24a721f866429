//! Capability identities and conformance declarations.
//!
//! # Responsibility
//! - Name the extendable capabilities used as top-level registry keys.
//! - Let implementations declare which capabilities they conform to.
//!
//! # Invariants
//! - One `CapabilityId` per capability type; equality follows `TypeId`.
//! - Conformance is declared explicitly by the implementation and is checked
//!   once, when the implementation is registered.

use std::any::{type_name, TypeId};
use std::fmt::{Debug, Display, Formatter};

/// An extendable capability.
///
/// Implemented for the trait object type of a capability trait:
///
/// ```ignore
/// pub trait DataBundle: Extension {
///     fn ingest(&self) -> Result<(), String>;
/// }
///
/// impl Capability for dyn DataBundle {
///     const NAME: &'static str = "DataBundle";
/// }
/// ```
pub trait Capability: Extension {
    /// Display name used in diagnostics and error messages.
    const NAME: &'static str;
}

/// Registrable implementation of one or more capabilities.
pub trait Extension: Send + Sync + 'static {
    /// Capabilities this implementation declares conformance to.
    fn capabilities(&self) -> Vec<CapabilityId>;

    /// Concrete implementation type name.
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Returns whether `capability` is part of the declared conformance.
    fn conforms_to(&self, capability: CapabilityId) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Runtime identity of one capability type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilityId {
    name: &'static str,
    type_id: TypeId,
}

impl CapabilityId {
    pub fn of<C: Capability + ?Sized>() -> Self {
        Self {
            name: C::NAME,
            type_id: TypeId::of::<C>(),
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl Debug for CapabilityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CapabilityId({})", self.name)
    }
}

impl Display for CapabilityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}
