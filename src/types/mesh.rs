use std::collections::{BTreeSet, HashSet};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{DecimateError, Result};

use super::{ShapeKeys, VertexGroups};

/// Canonical undirected edge: `(min_vertex, max_vertex)`.
pub type EdgeKey = (u32, u32);

/// Make a canonical edge key from two vertex indices.
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a <= b { (a, b) } else { (b, a) }
}

/// One triangle of the fan triangulation, tagged with the polygon it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub face: u32,
    pub vertices: [u32; 3],
}

/// Polygon mesh with the per-vertex attribute channels that decimation must keep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions in object-local space.
    pub positions: Vec<Vec3>,
    /// Polygons as vertex index loops (3 or more entries each).
    pub faces: Vec<Vec<u32>>,
    /// Per-face-corner UVs, parallel to `faces`, or empty when the mesh is unmapped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uvs: Vec<Vec<Vec2>>,
    /// Edges flagged as UV seams.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub seams: BTreeSet<EdgeKey>,
    #[serde(default, skip_serializing_if = "VertexGroups::is_empty")]
    pub vertex_groups: VertexGroups,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_keys: Option<ShapeKeys>,
}

impl Mesh {
    /// Build a geometry-only mesh.
    pub fn from_faces(positions: Vec<Vec3>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            positions,
            faces,
            ..Default::default()
        }
    }

    /// Build a geometry-only mesh from a flat triangle index list.
    pub fn from_triangles(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let faces = indices.chunks_exact(3).map(|t| t.to_vec()).collect();
        Self::from_faces(positions, faces)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of triangles after fan triangulation: sum of `(n - 2)` per face.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(|f| f.len().saturating_sub(2)).sum()
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether per-corner UVs are present.
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// UV of a face corner, if the mesh is mapped.
    pub fn corner_uv(&self, face: usize, corner: usize) -> Option<Vec2> {
        self.uvs.get(face).and_then(|f| f.get(corner)).copied()
    }

    /// Iterate the edges of one polygon in loop order.
    pub fn face_edges(&self, face: usize) -> impl Iterator<Item = (u32, u32)> + '_ {
        let f = &self.faces[face];
        (0..f.len()).map(move |i| (f[i], f[(i + 1) % f.len()]))
    }

    /// Whether an edge carries the seam flag.
    pub fn is_seam(&self, a: u32, b: u32) -> bool {
        self.seams.contains(&edge_key(a, b))
    }

    /// Fan-triangulate every polygon.
    ///
    /// Polygon identity is kept only as the `face` tag on each triangle.
    pub fn triangles(&self) -> Vec<Triangle> {
        let mut tris = Vec::with_capacity(self.triangle_count());
        for (fi, face) in self.faces.iter().enumerate() {
            for i in 1..face.len().saturating_sub(1) {
                tris.push(Triangle {
                    face: fi as u32,
                    vertices: [face[0], face[i], face[i + 1]],
                });
            }
        }
        tris
    }

    /// Flat triangle index buffer (fan triangulation).
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.triangles()
            .into_iter()
            .flat_map(|t| t.vertices)
            .collect()
    }

    /// Check structural invariants of the mesh and its attribute channels.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertex_count();

        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(DecimateError::Validation(format!(
                    "face {fi} has {} vertices (need at least 3)",
                    face.len()
                )));
            }
            if let Some(&bad) = face.iter().find(|&&v| v as usize >= n) {
                return Err(DecimateError::Validation(format!(
                    "face {fi} references vertex {bad} but the mesh has {n} vertices"
                )));
            }
        }

        if self.has_uvs() {
            if self.uvs.len() != self.faces.len() {
                return Err(DecimateError::Validation(format!(
                    "{} UV loops for {} faces",
                    self.uvs.len(),
                    self.faces.len()
                )));
            }
            if let Some(fi) = (0..self.faces.len()).find(|&i| self.uvs[i].len() != self.faces[i].len()) {
                return Err(DecimateError::Validation(format!(
                    "face {fi} has mismatched UV corner count"
                )));
            }
        }

        let mut names = HashSet::new();
        for group in self.vertex_groups.iter() {
            if !names.insert(group.name.as_str()) {
                return Err(DecimateError::Validation(format!(
                    "duplicate vertex group name '{}'",
                    group.name
                )));
            }
            if let Some((v, _)) = group.iter().find(|&(v, _)| v as usize >= n) {
                return Err(DecimateError::Validation(format!(
                    "vertex group '{}' references vertex {v} out of range",
                    group.name
                )));
            }
        }

        if let Some(keys) = &self.shape_keys {
            keys.validate(n)?;
        }

        Ok(())
    }
}
