use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

/// Process-wide directory of advertised topics, keyed by message type name.
///
/// The directory knows nothing about worlds. It stores which topic names are
/// currently advertised for each message type; world teardown retracts
/// entries by namespace prefix through [`unadvertise_namespace`].
///
/// Interior locking lets a single shared instance serve concurrent
/// advertise/unadvertise calls from unrelated worlds. BTreeMap/BTreeSet keep
/// snapshots in deterministic order.
///
/// [`unadvertise_namespace`]: TopicDirectory::unadvertise_namespace
#[derive(Debug, Default)]
pub struct TopicDirectory {
    topics: RwLock<BTreeMap<String, BTreeSet<String>>>,
}

/// True if `topic` falls under the namespace `prefix`.
///
/// Matches on path-segment boundaries: "/sim/default" covers
/// "/sim/default/world_stats" but not "/sim/default_2/world_stats".
fn in_namespace(topic: &str, prefix: &str) -> bool {
    match topic.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

impl TopicDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `topic` under `msg_type`. Idempotent.
    pub fn advertise(&self, msg_type: &str, topic: &str) {
        let mut topics = self.topics.write().expect("topic directory lock poisoned");
        let inserted = topics
            .entry(msg_type.to_string())
            .or_default()
            .insert(topic.to_string());
        if inserted {
            tracing::debug!(msg_type, topic, "advertised topic");
        }
    }

    /// Remove `topic` from `msg_type`. No-op if absent.
    ///
    /// A message type left with no topics is dropped from the directory so
    /// `enumerate` never reports empty type entries.
    pub fn unadvertise(&self, msg_type: &str, topic: &str) {
        let mut topics = self.topics.write().expect("topic directory lock poisoned");
        if let Some(set) = topics.get_mut(msg_type) {
            if set.remove(topic) {
                tracing::debug!(msg_type, topic, "unadvertised topic");
            }
            if set.is_empty() {
                topics.remove(msg_type);
            }
        }
    }

    /// Retract every topic under the namespace `prefix`, across all message
    /// types, in one atomic pass. Returns the number of topics removed.
    pub fn unadvertise_namespace(&self, prefix: &str) -> usize {
        let mut topics = self.topics.write().expect("topic directory lock poisoned");
        let mut removed = 0;
        topics.retain(|_, set| {
            let before = set.len();
            set.retain(|topic| !in_namespace(topic, prefix));
            removed += before - set.len();
            !set.is_empty()
        });
        if removed > 0 {
            tracing::debug!(prefix, removed, "retracted topic namespace");
        }
        removed
    }

    /// Snapshot of all advertised topics, grouped by message type.
    pub fn enumerate(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.topics
            .read()
            .expect("topic directory lock poisoned")
            .clone()
    }

    /// Count the advertised topics under the namespace `prefix`.
    pub fn topics_under(&self, prefix: &str) -> usize {
        self.topics
            .read()
            .expect("topic directory lock poisoned")
            .values()
            .flat_map(|set| set.iter())
            .filter(|topic| in_namespace(topic, prefix))
            .count()
    }

    /// Total number of advertised topics across all message types.
    pub fn len(&self) -> usize {
        self.topics
            .read()
            .expect("topic directory lock poisoned")
            .values()
            .map(BTreeSet::len)
            .sum()
    }

    /// True if nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.topics
            .read()
            .expect("topic directory lock poisoned")
            .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simspace_common::scoped_topic;
    use std::sync::Arc;

    #[test]
    fn advertise_is_idempotent() {
        let dir = TopicDirectory::new();
        dir.advertise("msgs.WorldStatistics", "/sim/default/world_stats");
        dir.advertise("msgs.WorldStatistics", "/sim/default/world_stats");
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn unadvertise_absent_is_noop() {
        let dir = TopicDirectory::new();
        dir.unadvertise("msgs.WorldStatistics", "/sim/default/world_stats");
        assert!(dir.is_empty());
    }

    #[test]
    fn unadvertise_drops_emptied_type() {
        let dir = TopicDirectory::new();
        dir.advertise("msgs.PosesStamped", "/sim/default/pose/info");
        dir.unadvertise("msgs.PosesStamped", "/sim/default/pose/info");
        assert!(dir.enumerate().is_empty());
    }

    #[test]
    fn enumerate_snapshots_all_types() {
        let dir = TopicDirectory::new();
        dir.advertise("msgs.WorldStatistics", "/sim/a/world_stats");
        dir.advertise("msgs.PosesStamped", "/sim/a/pose/info");
        dir.advertise("msgs.PosesStamped", "/sim/b/pose/info");

        let snapshot = dir.enumerate();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["msgs.PosesStamped"].len(), 2);
    }

    #[test]
    fn namespace_retraction_spares_other_worlds() {
        let dir = TopicDirectory::new();
        for world in ["default", "default_2"] {
            dir.advertise("msgs.WorldStatistics", &scoped_topic(world, "world_stats"));
            dir.advertise("msgs.PosesStamped", &scoped_topic(world, "pose/info"));
        }

        let removed = dir.unadvertise_namespace("/sim/default");
        assert_eq!(removed, 2);
        assert_eq!(dir.topics_under("/sim/default"), 0);
        assert_eq!(dir.topics_under("/sim/default_2"), 2);
    }

    #[test]
    fn namespace_matches_segment_boundaries_only() {
        assert!(in_namespace("/sim/default/world_stats", "/sim/default"));
        assert!(in_namespace("/sim/default", "/sim/default"));
        assert!(!in_namespace("/sim/default_2/world_stats", "/sim/default"));
    }

    #[test]
    fn concurrent_advertise_from_unrelated_worlds() {
        let dir = Arc::new(TopicDirectory::new());
        let mut handles = Vec::new();
        for w in 0..8 {
            let dir = Arc::clone(&dir);
            handles.push(std::thread::spawn(move || {
                let world = format!("world_{w}");
                for t in 0..50 {
                    dir.advertise("msgs.PosesStamped", &scoped_topic(&world, &format!("t{t}")));
                }
                // Retract half again from this thread.
                for t in 0..25 {
                    dir.unadvertise("msgs.PosesStamped", &scoped_topic(&world, &format!("t{t}")));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        for w in 0..8 {
            assert_eq!(dir.topics_under(&format!("/sim/world_{w}")), 25);
        }
    }
}
