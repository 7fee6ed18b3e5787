//! World kernel: the named-world registry and its teardown protocol.
//!
//! A [`World`] is the shared simulation resource: it owns a physics engine
//! and a namespace of advertised topics, and any number of components hold
//! handles (`Arc<World>`) to it at once. The [`WorldRegistry`] is the single
//! authority for resolving names to worlds; the [`TeardownCoordinator`]
//! retracts a removed world's side effects synchronously and defers its
//! destruction until every external handle is gone.
//!
//! # Invariants
//! - A name resolves to exactly one live world while it is Active, and to
//!   none after removal; never to a half-destroyed object.
//! - A removed world's topics are gone from the directory before
//!   `remove_all` returns.
//! - The registry's own handle is released first on removal; external
//!   holders alone determine when memory is reclaimed.

pub mod registry;
pub mod teardown;
pub mod world;

pub use registry::{WorldError, WorldRegistry};
pub use teardown::{DrainStatus, TeardownCoordinator};
pub use world::{Lifecycle, World, WorldConfig};

pub fn crate_info() -> &'static str {
    "simspace-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
