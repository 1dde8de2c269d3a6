//! Shared domain types for the opsdesk operator console.
//!
//! Everything here mirrors a backend record as it travels over the wire
//! (camelCase JSON). The console crate layers view state, filtering and the
//! optimistic update flow on top of these types.

pub mod entities;
pub mod status;

pub use entities::*;
pub use status::*;

/// Case-insensitive equality using Unicode lowercasing, the same folding
/// the console's text search applies.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
