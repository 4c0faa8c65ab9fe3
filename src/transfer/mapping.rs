use glam::Vec3;
use rayon::prelude::*;
use tracing::debug;

use crate::types::Mesh;

use super::bvh::TriangleBvh;

/// Target vertex → source vertex it inherits every attribute from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexMap {
    sources: Vec<Option<u32>>,
}

impl VertexMap {
    /// Map of `len` target vertices with nothing mapped yet.
    pub fn unmapped(len: usize) -> Self {
        Self {
            sources: vec![None; len],
        }
    }

    pub fn from_sources(sources: Vec<Option<u32>>) -> Self {
        Self { sources }
    }

    /// Number of target vertices covered (mapped or not).
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, target: u32) -> Option<u32> {
        self.sources.get(target as usize).copied().flatten()
    }

    pub fn set(&mut self, target: u32, source: u32) {
        self.sources[target as usize] = Some(source);
    }

    /// `(target, source)` pairs for mapped vertices, in target order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(t, s)| s.map(|s| (t as u32, s)))
    }

    pub fn mapped_count(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }

    pub fn unmapped_count(&self) -> usize {
        self.len() - self.mapped_count()
    }
}

/// Source vertex of the hit triangle closest to `point`; the first wins ties.
pub fn resolve_vertex(source: &Mesh, bvh: &TriangleBvh, point: Vec3) -> Option<u32> {
    let hit = bvh.nearest(point)?;
    hit.vertices.into_iter().min_by(|&a, &b| {
        let da = source.positions[a as usize].distance_squared(point);
        let db = source.positions[b as usize].distance_squared(point);
        da.total_cmp(&db)
    })
}

/// Resolve every query point (already in the source's local space) to a source vertex.
///
/// Queries run in parallel against the read-only index; each writes only its own slot.
pub fn build_vertex_map(source: &Mesh, bvh: &TriangleBvh, points: &[Vec3]) -> VertexMap {
    let sources: Vec<Option<u32>> = points
        .par_iter()
        .map(|&p| resolve_vertex(source, bvh, p))
        .collect();

    for (t, _) in sources.iter().enumerate().filter(|(_, s)| s.is_none()) {
        debug!(vertex = t, "No source surface found; vertex left unmapped");
    }

    VertexMap::from_sources(sources)
}
