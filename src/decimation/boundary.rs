use tracing::debug;

use crate::topology::Adjacency;
use crate::types::Mesh;

/// Per-vertex protection weight in `[0, 1]` handed to the simplifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtectionMap {
    pub weights: Vec<f32>,
    /// Vertices on a seam or open-boundary edge.
    pub locked: usize,
    /// One-ring neighbours of locked vertices that are not locked themselves.
    pub buffer: usize,
}

impl ProtectionMap {
    /// Map with no protection for `vertex_count` vertices.
    pub fn unprotected(vertex_count: usize) -> Self {
        Self {
            weights: vec![0.0; vertex_count],
            locked: 0,
            buffer: 0,
        }
    }

    pub fn is_protected(&self, vertex: u32) -> bool {
        self.weights
            .get(vertex as usize)
            .is_some_and(|&w| w >= 1.0)
    }

    /// Boolean mask for simplifiers that take hard vertex locks.
    pub fn lock_mask(&self) -> Vec<bool> {
        self.weights.iter().map(|&w| w >= 1.0).collect()
    }

    pub fn protected_count(&self) -> usize {
        self.locked + self.buffer
    }
}

/// Classify seam/boundary vertices and their one-ring as protected.
///
/// Edge-collapse simplifiers drift the neighbours of a seam into the seam,
/// so the lock covers the seam vertices plus their one-ring.
pub fn classify_boundary(mesh: &Mesh) -> ProtectionMap {
    let n = mesh.vertex_count();
    let adjacency = Adjacency::build(mesh);

    let mut locked = vec![false; n];
    for edge in adjacency.edges() {
        if edge.is_boundary() || mesh.seams.contains(&edge.key) {
            locked[edge.key.0 as usize] = true;
            locked[edge.key.1 as usize] = true;
        }
    }

    let mut protected = locked.clone();
    for v in (0..n).filter(|&v| locked[v]) {
        for neighbor in adjacency.neighbors(v as u32) {
            protected[neighbor as usize] = true;
        }
    }

    let locked_count = locked.iter().filter(|&&l| l).count();
    let protected_count = protected.iter().filter(|&&p| p).count();

    debug!(
        vertices = n,
        locked = locked_count,
        buffer = protected_count - locked_count,
        "Classified boundary vertices"
    );

    ProtectionMap {
        weights: protected
            .into_iter()
            .map(|p| if p { 1.0 } else { 0.0 })
            .collect(),
        locked: locked_count,
        buffer: protected_count - locked_count,
    }
}
