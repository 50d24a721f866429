//! Per-capability registration manager.
//!
//! # Responsibility
//! - Own the `name -> implementation` mapping for exactly one capability.
//! - Enforce name uniqueness and declared conformance at registration time.
//!
//! # Invariants
//! - Names are unique within one manager.
//! - Every stored implementation declares conformance to the manager capability.
//! - Mutation only happens through manager operations; views are read-only.

use crate::extension::capability::{Capability, CapabilityId};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type ExtensionMap<C> = BTreeMap<String, Arc<C>>;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry registration/resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Operation on a capability that was never declared.
    CapabilityNotDeclared(&'static str),
    /// Name already taken under this capability.
    DuplicateRegistration {
        capability: &'static str,
        name: String,
    },
    /// Implementation does not declare conformance to the capability.
    TypeMismatch {
        capability: &'static str,
        type_name: &'static str,
    },
    /// Name absent; `available` is sorted.
    NameNotRegistered {
        capability: &'static str,
        name: String,
        available: Vec<String>,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapabilityNotDeclared(capability) => {
                write!(f, "capability is not an extendable type: {capability}")
            }
            Self::DuplicateRegistration { capability, name } => {
                write!(f, "{capability} extension `{name}` is already registered")
            }
            Self::TypeMismatch {
                capability,
                type_name,
            } => write!(
                f,
                "extension type `{type_name}` does not conform to capability {capability}"
            ),
            Self::NameNotRegistered {
                capability,
                name,
                available,
            } => write!(
                f,
                "no {capability} extension registered under name `{name}`, options are: [{}]",
                available.join(", ")
            ),
        }
    }
}

impl Error for RegistryError {}

/// Read-only live view of one manager's registrations.
///
/// Registrations and removals made through the manager after the view was
/// obtained are visible through it.
pub struct RegisteredView<C: Capability + ?Sized> {
    extensions: Arc<RwLock<ExtensionMap<C>>>,
}

impl<C: Capability + ?Sized> RegisteredView<C> {
    pub fn get(&self, name: &str) -> Option<Arc<C>> {
        read_map(&self.extensions).get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        read_map(&self.extensions).contains_key(name)
    }

    /// Returns registered names in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        read_map(&self.extensions).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read_map(&self.extensions).len()
    }

    pub fn is_empty(&self) -> bool {
        read_map(&self.extensions).is_empty()
    }

    /// Point-in-time copy of the mapping.
    pub fn snapshot(&self) -> BTreeMap<String, Arc<C>> {
        read_map(&self.extensions).clone()
    }
}

impl<C: Capability + ?Sized> Clone for RegisteredView<C> {
    fn clone(&self) -> Self {
        Self {
            extensions: Arc::clone(&self.extensions),
        }
    }
}

/// Registration manager for one capability `C`.
pub struct CapabilityManager<C: Capability + ?Sized> {
    extensions: Arc<RwLock<ExtensionMap<C>>>,
}

impl<C: Capability + ?Sized> Default for CapabilityManager<C> {
    fn default() -> Self {
        Self {
            extensions: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<C: Capability + ?Sized> CapabilityManager<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capability(&self) -> CapabilityId {
        CapabilityId::of::<C>()
    }

    /// Resolves the implementation registered under `name`.
    pub fn load(&self, name: &str) -> RegistryResult<Arc<C>> {
        let extensions = read_map(&self.extensions);
        match extensions.get(name) {
            Some(extension) => Ok(Arc::clone(extension)),
            None => Err(RegistryError::NameNotRegistered {
                capability: C::NAME,
                name: name.to_string(),
                available: extensions.keys().cloned().collect(),
            }),
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        read_map(&self.extensions).contains_key(name)
    }

    /// Registers `extension` under `name` and hands it back unchanged.
    ///
    /// # Errors
    /// - `DuplicateRegistration` when `name` is already taken.
    /// - `TypeMismatch` when `extension` does not declare conformance to `C`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        extension: Arc<C>,
    ) -> RegistryResult<Arc<C>> {
        let name = name.into();
        let mut extensions = write_map(&self.extensions);
        if extensions.contains_key(name.as_str()) {
            warn!(
                "event=extension_register module=registry status=error capability={} name={} reason=duplicate",
                C::NAME,
                name
            );
            return Err(RegistryError::DuplicateRegistration {
                capability: C::NAME,
                name,
            });
        }
        if !extension.conforms_to(CapabilityId::of::<C>()) {
            warn!(
                "event=extension_register module=registry status=error capability={} name={} reason=type_mismatch type={}",
                C::NAME,
                name,
                extension.type_name()
            );
            return Err(RegistryError::TypeMismatch {
                capability: C::NAME,
                type_name: extension.type_name(),
            });
        }

        debug!(
            "event=extension_register module=registry status=ok capability={} name={} type={}",
            C::NAME,
            name,
            extension.type_name()
        );
        extensions.insert(name, Arc::clone(&extension));
        Ok(extension)
    }

    /// Deferred form of [`register`](Self::register).
    ///
    /// The returned closure performs the same checks once the implementation
    /// is supplied.
    pub fn registration(
        &mut self,
        name: impl Into<String>,
    ) -> impl FnOnce(Arc<C>) -> RegistryResult<Arc<C>> + '_ {
        let name = name.into();
        move |extension| self.register(name, extension)
    }

    /// Removes and returns the implementation registered under `name`.
    pub fn unregister(&mut self, name: &str) -> RegistryResult<Arc<C>> {
        let mut extensions = write_map(&self.extensions);
        match extensions.remove(name) {
            Some(extension) => {
                debug!(
                    "event=extension_unregister module=registry status=ok capability={} name={}",
                    C::NAME,
                    name
                );
                Ok(extension)
            }
            None => Err(RegistryError::NameNotRegistered {
                capability: C::NAME,
                name: name.to_string(),
                available: extensions.keys().cloned().collect(),
            }),
        }
    }

    pub fn clear(&mut self) {
        let mut extensions = write_map(&self.extensions);
        debug!(
            "event=extension_clear module=registry status=ok capability={} removed={}",
            C::NAME,
            extensions.len()
        );
        extensions.clear();
    }

    pub fn registered_view(&self) -> RegisteredView<C> {
        RegisteredView {
            extensions: Arc::clone(&self.extensions),
        }
    }

    pub fn len(&self) -> usize {
        read_map(&self.extensions).len()
    }

    pub fn is_empty(&self) -> bool {
        read_map(&self.extensions).is_empty()
    }
}

// Startup is single-threaded; a poisoned lock still holds a consistent map
// because every write is a single insert/remove/clear.
fn read_map<C: ?Sized>(
    map: &RwLock<ExtensionMap<C>>,
) -> RwLockReadGuard<'_, ExtensionMap<C>> {
    map.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_map<C: ?Sized>(
    map: &RwLock<ExtensionMap<C>>,
) -> RwLockWriteGuard<'_, ExtensionMap<C>> {
    map.write().unwrap_or_else(PoisonError::into_inner)
}
