//! Extension-point registry.
//!
//! A capability is declared once, implementations are registered under
//! string names, and resolution code loads them back by name. Each capability
//! owns an isolated name space.
//!
//! Discovery and loading of extension code is out of scope; callers register
//! implementations they already hold.

pub mod capability;
pub mod manager;
pub mod registry;
