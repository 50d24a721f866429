//! Namespace output formatters, resolved by name through the registry.

use plugboard_core::{
    Capability, CapabilityId, Extension, ExtensionRegistry, Namespace, NamespaceValue,
    RegistryResult,
};
use std::sync::Arc;

/// Renders a namespace tree for display.
pub trait NamespaceFormatter: Extension {
    fn render(&self, namespace: &Namespace) -> Result<String, String>;
}

impl Capability for dyn NamespaceFormatter {
    const NAME: &'static str = "NamespaceFormatter";
}

/// Pretty-printed JSON object.
pub struct JsonFormatter;

impl Extension for JsonFormatter {
    fn capabilities(&self) -> Vec<CapabilityId> {
        vec![CapabilityId::of::<dyn NamespaceFormatter>()]
    }
}

impl NamespaceFormatter for JsonFormatter {
    fn render(&self, namespace: &Namespace) -> Result<String, String> {
        serde_json::to_string_pretty(namespace)
            .map_err(|err| format!("failed to serialize namespace: {err}"))
    }
}

/// Indented `name = value` listing.
pub struct TreeFormatter;

impl Extension for TreeFormatter {
    fn capabilities(&self) -> Vec<CapabilityId> {
        vec![CapabilityId::of::<dyn NamespaceFormatter>()]
    }
}

impl NamespaceFormatter for TreeFormatter {
    fn render(&self, namespace: &Namespace) -> Result<String, String> {
        let mut out = String::new();
        write_tree(namespace, 0, &mut out);
        Ok(out)
    }
}

fn write_tree(namespace: &Namespace, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (name, value) in namespace {
        match value {
            NamespaceValue::Leaf(leaf) => {
                out.push_str(&format!("{indent}{name} = {leaf}\n"));
            }
            NamespaceValue::Namespace(child) => {
                out.push_str(&format!("{indent}{name}\n"));
                write_tree(child, depth + 1, out);
            }
        }
    }
}

/// Declares the formatter capability and registers the built-in formatters.
pub fn register_builtin_formatters(registry: &mut ExtensionRegistry) -> RegistryResult<()> {
    registry.declare::<dyn NamespaceFormatter>();
    registry.register::<dyn NamespaceFormatter>("json", Arc::new(JsonFormatter))?;
    registry.register::<dyn NamespaceFormatter>("tree", Arc::new(TreeFormatter))?;
    Ok(())
}
