use serde::{Deserialize, Serialize};
use simspace_common::WorldId;
use simspace_physics::{OwningWorld, PhysicsEngine, PhysicsKind, PhysicsParams};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

/// Lifecycle of a world. Transitions are monotonic; a world never returns to
/// an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    /// Registered and resolvable by name.
    Active = 0,
    /// Removal has begun; name resolution is denied.
    RemovalRequested = 1,
    /// Side effects retracted, memory not yet reclaimed.
    Draining = 2,
    /// Reference counts reached floor; destruction may proceed.
    Finalized = 3,
}

impl Lifecycle {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Lifecycle::Active,
            1 => Lifecycle::RemovalRequested,
            2 => Lifecycle::Draining,
            _ => Lifecycle::Finalized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Active => "active",
            Lifecycle::RemovalRequested => "removal-requested",
            Lifecycle::Draining => "draining",
            Lifecycle::Finalized => "finalized",
        }
    }
}

/// Configuration for creating a world.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WorldConfig {
    pub physics_kind: PhysicsKind,
    pub physics_params: PhysicsParams,
}

/// The shared simulation resource: a named world owning one physics engine.
///
/// Worlds are always handled through `Arc<World>`. The registry holds one
/// handle while the world is Active; any component that looked the world up
/// holds its own. The world (and, through ownership, its engine) is destroyed
/// when the last handle is released.
///
/// Identity is the [`WorldId`], not the name: a world recreated under the
/// same name is a distinct instance.
#[derive(Debug)]
pub struct World {
    name: String,
    id: WorldId,
    physics: Arc<PhysicsEngine>,
    lifecycle: AtomicU8,
}

/// The topics every world advertises at creation, as
/// `(message type, topic suffix)` pairs under the world's namespace.
pub const STANDARD_TOPICS: [(&str, &str); 3] = [
    ("msgs.WorldStatistics", "world_stats"),
    ("msgs.PosesStamped", "pose/info"),
    ("msgs.Contacts", "physics/contacts"),
];

impl World {
    /// Build a world with its physics engine, wiring the engine's weak
    /// back-reference to the world.
    pub fn new(name: impl Into<String>, config: WorldConfig) -> Arc<Self> {
        let name = name.into();
        let physics = Arc::new(PhysicsEngine::new(
            config.physics_kind,
            config.physics_params,
        ));
        let world = Arc::new(Self {
            name,
            id: WorldId::new(),
            physics,
            lifecycle: AtomicU8::new(Lifecycle::Active as u8),
        });
        let back: Weak<World> = Arc::downgrade(&world);
        let back: Weak<dyn OwningWorld> = back;
        world.physics.attach_world(back);
        world
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    /// Hand out a shared handle to the physics engine.
    pub fn physics(&self) -> Arc<PhysicsEngine> {
        Arc::clone(&self.physics)
    }

    /// Number of live handles to the physics engine, including the world's
    /// own owning handle. Diagnostic read; never mutated directly.
    pub fn physics_refs(&self) -> usize {
        Arc::strong_count(&self.physics)
    }

    /// Advance the world one simulation step.
    pub fn step(&self) {
        self.physics.step();
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::from_u8(self.lifecycle.load(Ordering::Acquire))
    }

    /// Advance the lifecycle to `next` if it is further along than the
    /// current state; earlier states are never re-entered.
    pub(crate) fn advance_lifecycle(&self, next: Lifecycle) {
        self.lifecycle.fetch_max(next as u8, Ordering::AcqRel);
    }
}

impl OwningWorld for World {
    fn world_name(&self) -> &str {
        &self.name
    }
}

impl Drop for World {
    fn drop(&mut self) {
        tracing::debug!(name = %self.name, id = %self.id.0, "world destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_active_with_engine_attached() {
        let world = World::new("default", WorldConfig::default());
        assert_eq!(world.lifecycle(), Lifecycle::Active);
        assert_eq!(world.physics_refs(), 1); // only the world's owning handle

        let engine = world.physics();
        assert_eq!(engine.world_name().as_deref(), Some("default"));
        assert_eq!(world.physics_refs(), 2);
        drop(engine);
        assert_eq!(world.physics_refs(), 1);
    }

    #[test]
    fn engine_back_reference_is_wired_and_weak() {
        let world = World::new("default", WorldConfig::default());
        let engine = world.physics();
        assert_eq!(engine.world_name().as_deref(), Some("default"));

        // The back-reference must not keep the world alive.
        drop(world);
        assert_eq!(engine.world_name(), None);
    }

    #[test]
    fn same_name_yields_distinct_instances() {
        let a = World::new("default", WorldConfig::default());
        let b = World::new("default", WorldConfig::default());
        assert_ne!(a.id(), b.id());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn lifecycle_never_regresses() {
        let world = World::new("default", WorldConfig::default());
        world.advance_lifecycle(Lifecycle::Draining);
        world.advance_lifecycle(Lifecycle::RemovalRequested);
        assert_eq!(world.lifecycle(), Lifecycle::Draining);
        world.advance_lifecycle(Lifecycle::Finalized);
        assert_eq!(world.lifecycle(), Lifecycle::Finalized);
    }

    #[test]
    fn step_drives_the_engine() {
        let world = World::new("default", WorldConfig::default());
        world.step();
        world.step();
        assert_eq!(world.physics().steps(), 2);
    }
}
