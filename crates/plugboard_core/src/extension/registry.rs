//! Top-level extension registry keyed by capability.
//!
//! # Responsibility
//! - Hold one `CapabilityManager` per declared capability.
//! - Offer one uniform entry point keyed by capability type.
//!
//! # Invariants
//! - Names from different capabilities never collide.
//! - Every operation on an undeclared capability fails with
//!   `CapabilityNotDeclared`.

use crate::extension::capability::{Capability, CapabilityId};
use crate::extension::manager::{CapabilityManager, RegisteredView, RegistryError, RegistryResult};
use log::debug;
use once_cell::sync::Lazy;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static GLOBAL_REGISTRY: Lazy<Mutex<ExtensionRegistry>> =
    Lazy::new(|| Mutex::new(ExtensionRegistry::new()));

/// Returns the process-wide default registry.
///
/// Production wiring declares and registers during startup through this
/// instance; tests should construct their own `ExtensionRegistry`.
pub fn global_registry() -> MutexGuard<'static, ExtensionRegistry> {
    GLOBAL_REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Directory of capability managers.
#[derive(Default)]
pub struct ExtensionRegistry {
    managers: BTreeMap<CapabilityId, Box<dyn Any + Send + Sync>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `C` as extendable with a fresh, empty manager.
    ///
    /// Redeclaring replaces the previous manager and drops its registrations.
    pub fn declare<C: Capability + ?Sized>(&mut self) -> CapabilityId {
        let capability = CapabilityId::of::<C>();
        let replaced = self
            .managers
            .insert(capability, Box::new(CapabilityManager::<C>::new()))
            .is_some();
        debug!(
            "event=capability_declare module=registry status=ok capability={} replaced={}",
            capability, replaced
        );
        capability
    }

    pub fn is_declared<C: Capability + ?Sized>(&self) -> bool {
        self.managers.contains_key(&CapabilityId::of::<C>())
    }

    /// Returns declared capabilities ordered by name.
    pub fn declared_capabilities(&self) -> Vec<CapabilityId> {
        self.managers.keys().copied().collect()
    }

    pub fn manager<C: Capability + ?Sized>(&self) -> RegistryResult<&CapabilityManager<C>> {
        self.managers
            .get(&CapabilityId::of::<C>())
            .and_then(|manager| manager.downcast_ref::<CapabilityManager<C>>())
            .ok_or(RegistryError::CapabilityNotDeclared(C::NAME))
    }

    pub fn manager_mut<C: Capability + ?Sized>(
        &mut self,
    ) -> RegistryResult<&mut CapabilityManager<C>> {
        self.managers
            .get_mut(&CapabilityId::of::<C>())
            .and_then(|manager| manager.downcast_mut::<CapabilityManager<C>>())
            .ok_or(RegistryError::CapabilityNotDeclared(C::NAME))
    }

    pub fn load<C: Capability + ?Sized>(&self, name: &str) -> RegistryResult<Arc<C>> {
        self.manager::<C>()?.load(name)
    }

    pub fn is_registered<C: Capability + ?Sized>(&self, name: &str) -> RegistryResult<bool> {
        Ok(self.manager::<C>()?.is_registered(name))
    }

    pub fn register<C: Capability + ?Sized>(
        &mut self,
        name: impl Into<String>,
        extension: Arc<C>,
    ) -> RegistryResult<Arc<C>> {
        self.manager_mut::<C>()?.register(name, extension)
    }

    /// Deferred registration; resolving the manager happens now, the
    /// duplicate and conformance checks happen when the closure runs.
    pub fn registration<C: Capability + ?Sized>(
        &mut self,
        name: impl Into<String>,
    ) -> RegistryResult<impl FnOnce(Arc<C>) -> RegistryResult<Arc<C>> + '_> {
        Ok(self.manager_mut::<C>()?.registration(name))
    }

    pub fn unregister<C: Capability + ?Sized>(&mut self, name: &str) -> RegistryResult<Arc<C>> {
        self.manager_mut::<C>()?.unregister(name)
    }

    pub fn clear<C: Capability + ?Sized>(&mut self) -> RegistryResult<()> {
        self.manager_mut::<C>()?.clear();
        Ok(())
    }

    pub fn registered_view<C: Capability + ?Sized>(&self) -> RegistryResult<RegisteredView<C>> {
        Ok(self.manager::<C>()?.registered_view())
    }
}

#[cfg(test)]
mod tests {
    use super::{global_registry, ExtensionRegistry};
    use crate::extension::capability::{Capability, CapabilityId, Extension};
    use crate::extension::manager::RegistryError;
    use std::sync::Arc;

    trait Bundle: Extension {}

    impl Capability for dyn Bundle {
        const NAME: &'static str = "Bundle";
    }

    struct Quandl;

    impl Extension for Quandl {
        fn capabilities(&self) -> Vec<CapabilityId> {
            vec![CapabilityId::of::<dyn Bundle>()]
        }
    }

    impl Bundle for Quandl {}

    #[test]
    fn operations_fail_before_declare() {
        let mut registry = ExtensionRegistry::new();
        let err = registry
            .register::<dyn Bundle>("quandl", Arc::new(Quandl))
            .err()
            .expect("undeclared capability must fail");
        assert_eq!(err, RegistryError::CapabilityNotDeclared("Bundle"));
        assert!(registry.is_registered::<dyn Bundle>("quandl").is_err());
        assert!(registry.clear::<dyn Bundle>().is_err());
        assert!(registry.registered_view::<dyn Bundle>().is_err());
        assert!(registry.registration::<dyn Bundle>("quandl").is_err());
        let err = registry
            .unregister::<dyn Bundle>("quandl")
            .err()
            .expect("undeclared capability must fail");
        assert_eq!(err, RegistryError::CapabilityNotDeclared("Bundle"));
        assert!(registry.load::<dyn Bundle>("quandl").is_err());
    }

    #[test]
    fn redeclare_replaces_manager() {
        let mut registry = ExtensionRegistry::new();
        let capability = registry.declare::<dyn Bundle>();
        assert_eq!(capability.name(), "Bundle");
        registry
            .register::<dyn Bundle>("quandl", Arc::new(Quandl))
            .expect("register");

        registry.declare::<dyn Bundle>();
        assert!(!registry
            .is_registered::<dyn Bundle>("quandl")
            .expect("declared"));
        assert_eq!(registry.declared_capabilities(), vec![capability]);
    }

    #[test]
    fn deferred_registration_through_facade() {
        let mut registry = ExtensionRegistry::new();
        registry.declare::<dyn Bundle>();
        let quandl: Arc<dyn Bundle> = Arc::new(Quandl);
        let complete = registry
            .registration::<dyn Bundle>("quandl")
            .expect("declared capability");
        let returned = complete(Arc::clone(&quandl)).expect("registration");
        assert!(Arc::ptr_eq(&returned, &quandl));
        assert!(registry.is_registered::<dyn Bundle>("quandl").expect("declared"));
    }

    #[test]
    fn global_registry_is_shared() {
        global_registry().declare::<dyn Bundle>();
        assert!(global_registry().is_declared::<dyn Bundle>());
    }
}
