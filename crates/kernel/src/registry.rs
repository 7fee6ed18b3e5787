use crate::teardown::TeardownCoordinator;
use crate::world::{Lifecycle, STANDARD_TOPICS, World, WorldConfig};
use simspace_common::{scoped_topic, topic_namespace};
use simspace_transport::TopicDirectory;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Errors from registry operations.
///
/// Absence is not an error anywhere in this crate: `lookup` of an unknown or
/// removed name returns `None`, the normal steady state after removal.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("world already exists: {0}")]
    AlreadyExists(String),
}

/// The single authority mapping world names to live worlds.
///
/// The registry holds one handle per Active world; `lookup` hands out more.
/// `remove_all` retracts each world's topics synchronously, stops resolving
/// the name, and passes the registry's handle to the [`TeardownCoordinator`]
/// so destruction waits on external holders without blocking the caller.
pub struct WorldRegistry {
    worlds: RwLock<BTreeMap<String, Arc<World>>>,
    directory: Arc<TopicDirectory>,
    coordinator: TeardownCoordinator,
}

impl WorldRegistry {
    pub fn new(directory: Arc<TopicDirectory>) -> Self {
        Self {
            worlds: RwLock::new(BTreeMap::new()),
            directory,
            coordinator: TeardownCoordinator::default(),
        }
    }

    /// Registry with a custom drain-monitor cadence. Tests use a short
    /// interval to keep finalization waits tight.
    pub fn with_poll_interval(directory: Arc<TopicDirectory>, poll_interval: Duration) -> Self {
        Self {
            worlds: RwLock::new(BTreeMap::new()),
            directory,
            coordinator: TeardownCoordinator::new(poll_interval),
        }
    }

    /// Create and register a world under `name`.
    ///
    /// Builds the world and its physics engine, advertises the world's
    /// standard topics, keeps the registry's own handle, and returns an
    /// independent handle to the caller.
    pub fn create(&self, name: &str, config: WorldConfig) -> Result<Arc<World>, WorldError> {
        let mut worlds = self.worlds.write().expect("world registry lock poisoned");
        match worlds.entry(name.to_string()) {
            Entry::Occupied(_) => Err(WorldError::AlreadyExists(name.to_string())),
            Entry::Vacant(slot) => {
                let world = World::new(name, config);
                for (msg_type, suffix) in STANDARD_TOPICS {
                    self.directory.advertise(msg_type, &scoped_topic(name, suffix));
                }
                slot.insert(Arc::clone(&world));
                tracing::info!(name, id = %world.id().0, "world created");
                Ok(world)
            }
        }
    }

    /// Resolve `name` to a handle, or `None` if the name is unknown or the
    /// world is past removal.
    pub fn lookup(&self, name: &str) -> Option<Arc<World>> {
        self.worlds
            .read()
            .expect("world registry lock poisoned")
            .get(name)
            .filter(|world| world.lifecycle() == Lifecycle::Active)
            .cloned()
    }

    /// Remove every registered world.
    ///
    /// For each world, in order: mark removal requested, retract its topic
    /// namespace from the directory, stop resolving the name, and hand the
    /// registry's handle to the coordinator. Topic retraction completes
    /// before this returns; finalization does not. Idempotent: a second call
    /// while worlds are draining finds nothing left to do.
    pub fn remove_all(&self) {
        // The map lock is held for the whole walk so a concurrent `create`
        // of a just-removed name cannot advertise before its namespace is
        // retracted here.
        let mut worlds = self.worlds.write().expect("world registry lock poisoned");
        for (name, world) in std::mem::take(&mut *worlds) {
            let _span = tracing::info_span!("remove_world", name = %name).entered();
            world.advance_lifecycle(Lifecycle::RemovalRequested);
            let retracted = self.directory.unadvertise_namespace(&topic_namespace(&name));
            tracing::debug!(retracted, "world topics retracted");
            world.advance_lifecycle(Lifecycle::Draining);
            self.coordinator.schedule(world);
        }
    }

    /// Number of Active worlds.
    pub fn len(&self) -> usize {
        self.worlds
            .read()
            .expect("world registry lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all Active worlds.
    pub fn names(&self) -> Vec<String> {
        self.worlds
            .read()
            .expect("world registry lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// The topic directory this registry advertises into.
    pub fn directory(&self) -> &Arc<TopicDirectory> {
        &self.directory
    }

    /// Drain diagnostics.
    pub fn coordinator(&self) -> &TeardownCoordinator {
        &self.coordinator
    }
}
