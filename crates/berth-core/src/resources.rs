//! Resource payload type and provider partitioning.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::ProviderId;

/// One elastic resource contributed by a provider.
///
/// Resources without a `provider_id` are agent-default resources; they are
/// not the manager's concern and are skipped by provider-keyed operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Owning resource provider, if any.
    pub provider_id: Option<ProviderId>,
    /// Resource name, e.g. `disk`.
    pub name: String,
    /// Scalar quantity.
    pub value: f64,
}

impl Resource {
    /// Create a provider-owned resource.
    #[must_use]
    pub fn new(provider_id: ProviderId, name: impl Into<String>, value: f64) -> Self {
        Self {
            provider_id: Some(provider_id),
            name: name.into(),
            value,
        }
    }

    /// Create an agent-default resource (no provider).
    #[must_use]
    pub fn agent_default(name: impl Into<String>, value: f64) -> Self {
        Self {
            provider_id: None,
            name: name.into(),
            value,
        }
    }
}

/// Partition resources by owning provider.
///
/// Agent-default resources (no `provider_id`) are skipped. Within a group,
/// input order is preserved.
#[must_use]
pub fn group_by_provider(resources: &[Resource]) -> HashMap<ProviderId, Vec<Resource>> {
    let mut grouped: HashMap<ProviderId, Vec<Resource>> = HashMap::new();
    for resource in resources {
        if let Some(provider_id) = &resource.provider_id {
            grouped
                .entry(provider_id.clone())
                .or_default()
                .push(resource.clone());
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_provider_partitions() {
        let p1 = ProviderId::from("p1");
        let p2 = ProviderId::from("p2");
        let resources = vec![
            Resource::new(p1.clone(), "disk", 64.0),
            Resource::new(p2.clone(), "disk", 32.0),
            Resource::new(p1.clone(), "volumes", 4.0),
        ];

        let grouped = group_by_provider(&resources);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&p1].len(), 2);
        assert_eq!(grouped[&p2].len(), 1);
    }

    #[test]
    fn group_by_provider_skips_agent_default() {
        let resources = vec![
            Resource::agent_default("cpus", 8.0),
            Resource::new(ProviderId::from("p1"), "disk", 64.0),
        ];

        let grouped = group_by_provider(&resources);
        assert_eq!(grouped.len(), 1);
        assert!(!grouped.contains_key(&ProviderId::from("agent")));
    }

    #[test]
    fn group_by_provider_empty_input() {
        assert!(group_by_provider(&[]).is_empty());
    }

    #[test]
    fn group_preserves_input_order_within_provider() {
        let p1 = ProviderId::from("p1");
        let resources = vec![
            Resource::new(p1.clone(), "a", 1.0),
            Resource::new(p1.clone(), "b", 2.0),
            Resource::new(p1.clone(), "c", 3.0),
        ];

        let grouped = group_by_provider(&resources);
        let names: Vec<&str> = grouped[&p1].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn serde_roundtrip() {
        let resource = Resource::new(ProviderId::from("p1"), "disk", 64.0);
        let json = serde_json::to_string(&resource).unwrap();
        let back: Resource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resource);
    }
}
