//! Transport directory: the process-wide registry of advertised topics.
//!
//! # Invariants
//! - Advertise is idempotent; unadvertise of an absent topic is a no-op.
//! - `enumerate` returns a consistent snapshot: no topic is ever observed
//!   half-added or half-removed.
//! - Unrelated worlds can advertise and retract concurrently without
//!   interfering with each other.

mod directory;

pub use directory::TopicDirectory;

pub fn crate_info() -> &'static str {
    "simspace-transport v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("transport"));
    }
}
