//! `key=value` / `key.sub=value` extension argument parsing.
//!
//! # Invariants
//! - The path is a dot-separated chain of identifiers; no segment is empty or
//!   starts with a digit.
//! - The value is everything after the first `=` and may be empty.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static EXTENSION_ARG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^\d\W]\w*(?:\.[^\d\W]\w*)*)=(.*)$").expect("valid extension arg regex")
});

/// Extension argument parse/apply errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionArgError {
    /// Raw argument is not in `key=value` or `key.namespace=value` form.
    InvalidSyntax(String),
    /// A dotted path tries to descend into a segment already holding a value.
    ConflictingAssignment(String),
}

impl Display for ExtensionArgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSyntax(raw) => write!(
                f,
                "invalid extension argument `{raw}`, must be in key=value form"
            ),
            Self::ConflictingAssignment(segment) => {
                write!(f, "conflicting assignments at namespace level `{segment}`")
            }
        }
    }
}

impl Error for ExtensionArgError {}

/// One parsed `path=value` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionArg {
    path: Vec<String>,
    value: String,
}

impl ExtensionArg {
    pub fn parse(raw: &str) -> Result<Self, ExtensionArgError> {
        let captures = EXTENSION_ARG_RE
            .captures(raw)
            .ok_or_else(|| ExtensionArgError::InvalidSyntax(raw.to_string()))?;
        let (Some(path), Some(value)) = (captures.get(1), captures.get(2)) else {
            return Err(ExtensionArgError::InvalidSyntax(raw.to_string()));
        };

        Ok(Self {
            path: path.as_str().split('.').map(str::to_string).collect(),
            value: value.as_str().to_string(),
        })
    }

    /// Path segments, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_parts(self) -> (Vec<String>, String) {
        (self.path, self.value)
    }
}

impl FromStr for ExtensionArg {
    type Err = ExtensionArgError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

/// Parses `raw` and inserts `dotted path -> value` into `args`.
///
/// A path already present is overwritten; the last occurrence wins.
pub fn parse_extension_arg(
    raw: &str,
    args: &mut BTreeMap<String, String>,
) -> Result<(), ExtensionArgError> {
    let arg = ExtensionArg::parse(raw)?;
    let dotted_path = arg.dotted_path();
    let (_, value) = arg.into_parts();
    if let Some(previous) = args.insert(dotted_path.clone(), value) {
        debug!(
            "event=extension_arg_overwrite module=args status=ok path={} previous_len={}",
            dotted_path,
            previous.len()
        );
    }
    Ok(())
}
