//! Dotted-path extension arguments.
//!
//! Turns flat `key=value` and `key.sub.key=value` strings into a nested
//! [`Namespace`](namespace::Namespace) tree for configuration code.

pub mod namespace;
pub mod parse;
