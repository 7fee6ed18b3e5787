//! Shared types for the simspace engine: instance identity and the
//! world-scoped topic namespace convention.
//!
//! # Invariants
//! - World identity is id-based, never name-based. A recreated world reuses
//!   the name but never the [`WorldId`].
//! - Every topic belonging to a world lives under [`topic_namespace`] of that
//!   world's name; teardown relies on this prefix to find them.

pub mod types;

pub use types::{WorldId, scoped_topic, topic_namespace};

pub fn crate_info() -> &'static str {
    "simspace-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
