use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a world instance.
///
/// Two worlds created under the same name at different times are distinct
/// instances with distinct ids. Callers that cached a handle before a removal
/// compare ids, not names, to decide whether they are looking at the same
/// world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub Uuid);

impl WorldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorldId {
    fn default() -> Self {
        Self::new()
    }
}

/// The topic namespace prefix for a world name.
///
/// Every topic advertised on behalf of a world lives under this prefix; it is
/// the contract between the registry and anything publishing world-scoped
/// topics.
pub fn topic_namespace(world_name: &str) -> String {
    format!("/sim/{world_name}")
}

/// Build a fully-qualified world-scoped topic name.
pub fn scoped_topic(world_name: &str, suffix: &str) -> String {
    format!("/sim/{world_name}/{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_id_uniqueness() {
        let a = WorldId::new();
        let b = WorldId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn namespace_is_prefix_of_scoped_topics() {
        let ns = topic_namespace("default");
        let topic = scoped_topic("default", "world_stats");
        assert_eq!(ns, "/sim/default");
        assert!(topic.starts_with(&ns));
        assert_eq!(topic, "/sim/default/world_stats");
    }

    #[test]
    fn similar_names_do_not_share_namespace() {
        // "/sim/default" must not claim topics of "/sim/default_2".
        let topic = scoped_topic("default_2", "world_stats");
        let ns = format!("{}/", topic_namespace("default"));
        assert!(!topic.starts_with(&ns));
    }
}
