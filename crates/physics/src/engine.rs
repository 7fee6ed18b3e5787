use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, Weak};

/// Identifies the simulation backend an engine instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicsKind {
    #[default]
    Ode,
    Bullet,
    Dart,
    Simbody,
}

impl PhysicsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicsKind::Ode => "ode",
            PhysicsKind::Bullet => "bullet",
            PhysicsKind::Dart => "dart",
            PhysicsKind::Simbody => "simbody",
        }
    }
}

impl FromStr for PhysicsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ode" => Ok(PhysicsKind::Ode),
            "bullet" => Ok(PhysicsKind::Bullet),
            "dart" => Ok(PhysicsKind::Dart),
            "simbody" => Ok(PhysicsKind::Simbody),
            other => Err(format!("unknown physics backend: {other}")),
        }
    }
}

/// Tunable engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Gravity vector applied to all bodies.
    pub gravity: Vec3,
    /// Simulated seconds advanced per step.
    pub max_step_size: f64,
    /// Target steps per wall-clock second; 0 means unthrottled.
    pub real_time_update_rate: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.8),
            max_step_size: 0.001,
            real_time_update_rate: 1000.0,
        }
    }
}

/// The owning world, as the engine sees it. Implemented by the kernel's
/// `World`; kept minimal so the engine never depends on world internals.
pub trait OwningWorld: Send + Sync {
    fn world_name(&self) -> &str;
}

#[derive(Debug, Default)]
struct EngineState {
    sim_time: f64,
    steps: u64,
}

/// A single simulation backend instance.
///
/// Owned by exactly one world for its whole Active lifetime. The world hands
/// out shared handles to collaborators; dropping the last handle destroys the
/// engine deterministically.
pub struct PhysicsEngine {
    kind: PhysicsKind,
    params: PhysicsParams,
    // Weak: diagnostics only, must not keep the world alive.
    world: OnceLock<Weak<dyn OwningWorld>>,
    state: Mutex<EngineState>,
}

impl PhysicsEngine {
    pub fn new(kind: PhysicsKind, params: PhysicsParams) -> Self {
        Self {
            kind,
            params,
            world: OnceLock::new(),
            state: Mutex::new(EngineState::default()),
        }
    }

    /// Record the owning world. Called once during world construction;
    /// later calls are ignored.
    pub fn attach_world(&self, world: Weak<dyn OwningWorld>) {
        let _ = self.world.set(world);
    }

    pub fn kind(&self) -> PhysicsKind {
        self.kind
    }

    pub fn params(&self) -> &PhysicsParams {
        &self.params
    }

    /// Name of the owning world, if it is still alive.
    pub fn world_name(&self) -> Option<String> {
        self.world
            .get()
            .and_then(Weak::upgrade)
            .map(|w| w.world_name().to_string())
    }

    /// Advance simulated time by one `max_step_size` increment.
    pub fn step(&self) {
        let mut state = self.state.lock().expect("engine state lock poisoned");
        state.sim_time += self.params.max_step_size;
        state.steps += 1;
    }

    /// Accumulated simulated seconds.
    pub fn sim_time(&self) -> f64 {
        self.state.lock().expect("engine state lock poisoned").sim_time
    }

    /// Number of steps taken.
    pub fn steps(&self) -> u64 {
        self.state.lock().expect("engine state lock poisoned").steps
    }
}

impl std::fmt::Debug for PhysicsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsEngine")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("world", &self.world_name())
            .finish()
    }
}

impl Drop for PhysicsEngine {
    fn drop(&mut self) {
        tracing::debug!(kind = self.kind.as_str(), "physics engine destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [
            PhysicsKind::Ode,
            PhysicsKind::Bullet,
            PhysicsKind::Dart,
            PhysicsKind::Simbody,
        ] {
            assert_eq!(kind.as_str().parse::<PhysicsKind>().unwrap(), kind);
        }
        assert!("quantum".parse::<PhysicsKind>().is_err());
    }

    #[test]
    fn step_accumulates_sim_time() {
        let engine = PhysicsEngine::new(PhysicsKind::Ode, PhysicsParams::default());
        for _ in 0..100 {
            engine.step();
        }
        assert_eq!(engine.steps(), 100);
        assert!((engine.sim_time() - 0.1).abs() < 1e-9);
    }

    struct FakeWorld(String);

    impl OwningWorld for FakeWorld {
        fn world_name(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn back_reference_does_not_extend_world_lifetime() {
        let engine = PhysicsEngine::new(PhysicsKind::Ode, PhysicsParams::default());
        let world: Arc<dyn OwningWorld> = Arc::new(FakeWorld("default".into()));
        engine.attach_world(Arc::downgrade(&world));
        assert_eq!(engine.world_name().as_deref(), Some("default"));

        drop(world);
        assert_eq!(engine.world_name(), None);
    }

    #[test]
    fn attach_world_is_set_once() {
        let engine = PhysicsEngine::new(PhysicsKind::Ode, PhysicsParams::default());
        let first: Arc<dyn OwningWorld> = Arc::new(FakeWorld("first".into()));
        let second: Arc<dyn OwningWorld> = Arc::new(FakeWorld("second".into()));
        engine.attach_world(Arc::downgrade(&first));
        engine.attach_world(Arc::downgrade(&second));
        assert_eq!(engine.world_name().as_deref(), Some("first"));
    }
}
