//! Core extension plumbing for plugboard.
//! Holds the capability registry and the dotted-path argument builder.

pub mod args;
pub mod extension;
pub mod logging;

pub use args::namespace::{create_args, update_namespace, Namespace, NamespaceValue};
pub use args::parse::{parse_extension_arg, ExtensionArg, ExtensionArgError};
pub use extension::capability::{Capability, CapabilityId, Extension};
pub use extension::manager::{CapabilityManager, RegisteredView, RegistryError, RegistryResult};
pub use extension::registry::{global_registry, ExtensionRegistry};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
