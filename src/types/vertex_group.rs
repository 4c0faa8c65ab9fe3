use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named sparse per-vertex weight map. Absent entries mean weight 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexGroup {
    pub name: String,
    #[serde(default)]
    weights: BTreeMap<u32, f32>,
}

impl VertexGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
        }
    }

    /// Weight assigned to `vertex`, or `None` if the vertex is not in the group.
    pub fn weight(&self, vertex: u32) -> Option<f32> {
        self.weights.get(&vertex).copied()
    }

    /// Assign a weight, replacing any previous value. Clamped to `[0, 1]`.
    pub fn set_weight(&mut self, vertex: u32, weight: f32) {
        self.weights.insert(vertex, weight.clamp(0.0, 1.0));
    }

    /// Remove a vertex from the group.
    pub fn remove(&mut self, vertex: u32) -> Option<f32> {
        self.weights.remove(&vertex)
    }

    /// Number of vertices with an explicit weight.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `(vertex, weight)` pairs in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.weights.iter().map(|(&v, &w)| (v, w))
    }
}

/// Ordered collection of uniquely named vertex groups owned by one mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexGroups {
    groups: Vec<VertexGroup>,
}

impl VertexGroups {
    /// Create a group, or reset an existing group of the same name.
    pub fn new_group(&mut self, name: &str) -> &mut VertexGroup {
        let index = match self.groups.iter().position(|g| g.name == name) {
            Some(i) => {
                self.groups[i] = VertexGroup::new(name);
                i
            }
            None => {
                self.groups.push(VertexGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    pub fn get(&self, name: &str) -> Option<&VertexGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut VertexGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// Weight of `vertex` in group `name`; absent group or vertex reads as 0.
    pub fn weight(&self, name: &str, vertex: u32) -> f32 {
        self.get(name)
            .and_then(|g| g.weight(vertex))
            .unwrap_or(0.0)
    }

    /// Remove every group.
    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VertexGroup> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_vertex_reads_none() {
        let group = VertexGroup::new("Spine");
        assert_eq!(group.weight(0), None);
        assert!(group.is_empty());
    }

    #[test]
    fn set_weight_replaces_and_clamps() {
        let mut group = VertexGroup::new("Spine");
        group.set_weight(3, 0.25);
        group.set_weight(3, 0.75);
        assert_eq!(group.weight(3), Some(0.75));

        group.set_weight(4, 1.5);
        group.set_weight(5, -0.5);
        assert_eq!(group.weight(4), Some(1.0));
        assert_eq!(group.weight(5), Some(0.0));
        assert_eq!(group.len(), 3);

        assert_eq!(group.remove(3), Some(0.75));
        assert_eq!(group.weight(3), None);
    }

    #[test]
    fn iter_is_vertex_ordered() {
        let mut group = VertexGroup::new("Head");
        group.set_weight(9, 0.1);
        group.set_weight(2, 0.2);
        let pairs: Vec<_> = group.iter().collect();
        assert_eq!(pairs, vec![(2, 0.2), (9, 0.1)]);
    }

    #[test]
    fn new_group_resets_same_name() {
        let mut groups = VertexGroups::default();
        groups.new_group("Arm").set_weight(0, 1.0);
        groups.new_group("Leg").set_weight(1, 0.5);
        assert_eq!(groups.len(), 2);

        let arm = groups.new_group("Arm");
        assert!(arm.is_empty());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.names().collect::<Vec<_>>(), vec!["Arm", "Leg"]);
    }

    #[test]
    fn weight_lookup_normalizes_absence_to_zero() {
        let mut groups = VertexGroups::default();
        groups.new_group("Arm").set_weight(2, 0.4);
        assert_eq!(groups.weight("Arm", 2), 0.4);
        assert_eq!(groups.weight("Arm", 3), 0.0);
        assert_eq!(groups.weight("Missing", 2), 0.0);
    }

    #[test]
    fn clear_drops_everything() {
        let mut groups = VertexGroups::default();
        groups.new_group("A");
        groups.new_group("B");
        groups.clear();
        assert!(groups.is_empty());
        assert!(groups.get("A").is_none());
    }

    #[test]
    fn serde_round_trip_keeps_weights() {
        let mut groups = VertexGroups::default();
        groups.new_group("Arm").set_weight(4, 0.5);
        let json = serde_json::to_string(&groups).unwrap();
        let back: VertexGroups = serde_json::from_str(&json).unwrap();
        assert_eq!(back, groups);
    }
}
