//! Nested namespace tree built from dotted-path arguments.
//!
//! # Responsibility
//! - Model namespace nodes as either a leaf value or a nested namespace.
//! - Apply parsed `path=value` arguments onto a caller-supplied root.
//!
//! # Invariants
//! - Paths are applied shortest first, so a leaf is always in place before a
//!   longer path tries to descend through it.
//! - Descending through a leaf fails with `ConflictingAssignment`.
//! - A failed build leaves the root untouched.

use crate::args::parse::{parse_extension_arg, ExtensionArgError};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{btree_map, BTreeMap};

/// One attribute value in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NamespaceValue {
    Leaf(String),
    Namespace(Namespace),
}

impl NamespaceValue {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Namespace(_) => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Leaf(_) => None,
            Self::Namespace(namespace) => Some(namespace),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

impl From<String> for NamespaceValue {
    fn from(value: String) -> Self {
        Self::Leaf(value)
    }
}

impl From<&str> for NamespaceValue {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<Namespace> for NamespaceValue {
    fn from(namespace: Namespace) -> Self {
        Self::Namespace(namespace)
    }
}

/// Attribute container addressed by name.
///
/// Serializes as a nested JSON object with string leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    attrs: BTreeMap<String, NamespaceValue>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn get_attr(&self, name: &str) -> Option<&NamespaceValue> {
        self.attrs.get(name)
    }

    /// Sets `name`, returning the replaced value if any.
    pub fn set_attr(
        &mut self,
        name: impl Into<String>,
        value: impl Into<NamespaceValue>,
    ) -> Option<NamespaceValue> {
        self.attrs.insert(name.into(), value.into())
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<NamespaceValue> {
        self.attrs.remove(name)
    }

    /// Looks up a `a.b.c` style path.
    pub fn get_path(&self, dotted_path: &str) -> Option<&NamespaceValue> {
        let mut segments = dotted_path.split('.');
        let mut current = self.attrs.get(segments.next()?)?;
        for segment in segments {
            current = current.as_namespace()?.attrs.get(segment)?;
        }
        Some(current)
    }

    pub fn leaf(&self, dotted_path: &str) -> Option<&str> {
        self.get_path(dotted_path)?.as_leaf()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, NamespaceValue> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a NamespaceValue);
    type IntoIter = btree_map::Iter<'a, String, NamespaceValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

/// Builds nested namespaces on `root` from `key=value` style arguments.
///
/// Every argument is parsed before `root` is touched. Paths are then applied
/// in ascending length of the dotted path; equal lengths apply in
/// lexicographic order.
///
/// # Errors
/// - `InvalidSyntax` for the first malformed argument.
/// - `ConflictingAssignment` when a path descends through a leaf.
pub fn create_args<I, S>(args: I, root: &mut Namespace) -> Result<(), ExtensionArgError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut extension_args = BTreeMap::new();
    for arg in args {
        parse_extension_arg(arg.as_ref(), &mut extension_args)?;
    }

    let mut ordered: Vec<(&String, &String)> = extension_args.iter().collect();
    ordered.sort_by_key(|(name, _)| name.len());

    let mut staged = root.clone();
    for (name, value) in ordered {
        let path: Vec<&str> = name.split('.').collect();
        update_namespace(&mut staged, &path, value)?;
    }
    *root = staged;

    debug!(
        "event=namespace_build module=args status=ok paths={}",
        extension_args.len()
    );
    Ok(())
}

/// Assigns `value` at `path` below `namespace`, creating intermediate
/// namespaces on demand.
pub fn update_namespace(
    namespace: &mut Namespace,
    path: &[&str],
    value: &str,
) -> Result<(), ExtensionArgError> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };

    let mut current = namespace;
    for segment in parents {
        let entry = current
            .attrs
            .entry((*segment).to_string())
            .or_insert_with(|| NamespaceValue::Namespace(Namespace::new()));
        current = match entry {
            NamespaceValue::Namespace(child) => child,
            NamespaceValue::Leaf(_) => {
                return Err(ExtensionArgError::ConflictingAssignment(
                    (*segment).to_string(),
                ))
            }
        };
    }

    // A replaced sub-namespace is dropped with everything below it.
    if let Some(NamespaceValue::Namespace(dropped)) = current.set_attr(*last, value) {
        warn!(
            "event=namespace_overwrite module=args status=ok segment={} dropped_attrs={}",
            last,
            dropped.len()
        );
    }
    Ok(())
}
