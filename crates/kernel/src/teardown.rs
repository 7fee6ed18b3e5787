use crate::world::{Lifecycle, World};
use serde::Serialize;
use simspace_common::WorldId;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Default cadence of the drain monitor. Internal detail: correctness depends
/// only on eventual finalization once counts reach floor, not on this value.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Diagnostic snapshot of one draining world.
///
/// `world_refs` counts handles held outside the coordinator's placeholder;
/// `physics_refs` counts engine handles including the world's own. A drain
/// that never completes shows up here with `world_refs > 0` or
/// `physics_refs > 1`: a handle leak, observable rather than fatal.
#[derive(Debug, Clone, Serialize)]
pub struct DrainStatus {
    pub name: String,
    pub id: WorldId,
    pub world_refs: usize,
    pub physics_refs: usize,
}

struct PendingDrain {
    name: String,
    world: Weak<World>,
}

/// Drives the removal protocol's deferred half.
///
/// The registry retracts a removed world's topics synchronously, then hands
/// its own handle here. The coordinator keeps that handle as a placeholder
/// and spawns a monitor thread which polls the shared-reference counts.
/// When the world's count is exactly one (the placeholder) and the engine is
/// held only by its world, the monitor marks the world Finalized and drops
/// the placeholder; ordinary ownership then destroys the engine with its
/// world.
///
/// There is no timeout: a world whose handles are never released drains
/// forever, visible through [`pending`](TeardownCoordinator::pending).
pub struct TeardownCoordinator {
    poll_interval: Duration,
    pending: Arc<Mutex<BTreeMap<WorldId, PendingDrain>>>,
}

impl Default for TeardownCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl TeardownCoordinator {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            pending: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Take over the last registry-side handle to `world` and monitor it to
    /// finalization. The world must already have its topics retracted.
    pub fn schedule(&self, world: Arc<World>) {
        let id = world.id();
        let name = world.name().to_string();
        {
            let mut pending = self.pending.lock().expect("pending drains lock poisoned");
            pending.insert(
                id,
                PendingDrain {
                    name: name.clone(),
                    world: Arc::downgrade(&world),
                },
            );
        }
        tracing::debug!(name = %name, id = %id.0, "drain scheduled");

        let pending = Arc::clone(&self.pending);
        let poll_interval = self.poll_interval;
        std::thread::spawn(move || {
            monitor_drain(world, pending, poll_interval);
        });
    }

    /// Snapshot of all drains still waiting on external holders.
    pub fn pending(&self) -> Vec<DrainStatus> {
        let pending = self.pending.lock().expect("pending drains lock poisoned");
        pending
            .iter()
            .filter_map(|(id, drain)| {
                let world = drain.world.upgrade()?;
                // Our upgrade and the monitor's placeholder are bookkeeping;
                // report only the handles the rest of the system holds.
                let world_refs = Arc::strong_count(&world).saturating_sub(2);
                Some(DrainStatus {
                    name: drain.name.clone(),
                    id: *id,
                    world_refs,
                    physics_refs: world.physics_refs(),
                })
            })
            .collect()
    }

    /// True when no drains are in flight.
    pub fn is_idle(&self) -> bool {
        self.pending
            .lock()
            .expect("pending drains lock poisoned")
            .is_empty()
    }
}

/// Monitor loop for one draining world. Owns the placeholder handle; exits
/// by dropping it once the counts reach floor.
fn monitor_drain(
    world: Arc<World>,
    pending: Arc<Mutex<BTreeMap<WorldId, PendingDrain>>>,
    poll_interval: Duration,
) {
    loop {
        // Floor: the placeholder is the last world handle and the engine is
        // held only by its owning world. The engine must not outlive its
        // world, so both conditions gate finalization.
        if Arc::strong_count(&world) == 1 && world.physics_refs() == 1 {
            break;
        }
        std::thread::sleep(poll_interval);
    }

    world.advance_lifecycle(Lifecycle::Finalized);
    pending
        .lock()
        .expect("pending drains lock poisoned")
        .remove(&world.id());
    tracing::info!(name = %world.name(), id = %world.id().0, "world finalized");
    // Dropping the placeholder reclaims the world and, through ownership,
    // its physics engine.
}
