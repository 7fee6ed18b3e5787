//! Physics engine instances for simspace worlds.
//!
//! A [`PhysicsEngine`] is created by and owned by exactly one world. Other
//! components may hold shared handles to it; the engine is destroyed by
//! ordinary drop when the last handle goes away, never by a deferred
//! collection cycle.
//!
//! # Invariants
//! - The back-reference to the owning world is weak: it never extends the
//!   world's lifetime and is used only for diagnostics.
//! - A held engine handle stays usable (steppable) even after its world has
//!   been removed from the registry.

mod engine;

pub use engine::{OwningWorld, PhysicsEngine, PhysicsKind, PhysicsParams};

pub fn crate_info() -> &'static str {
    "simspace-physics v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("physics"));
    }
}
