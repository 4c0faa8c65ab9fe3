use glam::{Vec2, Vec3};
use meshopt::{SimplifyOptions, VertexDataAdapter};
use tracing::debug;

use crate::error::{DecimateError, Result};
use crate::types::{Mesh, edge_key};

use super::ProtectionMap;

/// How strongly the protection weight attribute resists collapses across it.
const PROTECTION_ATTRIBUTE_WEIGHT: f32 = 1.0;

/// Triangle-count reduction that honours per-vertex protection.
///
/// Implementations must not collapse a vertex whose protection weight is 1.0
/// when another collapse is available, and should land near
/// `ratio * mesh.triangle_count()` triangles. The returned mesh carries
/// geometry, UVs and seams only.
pub trait Simplifier {
    fn simplify(&self, mesh: &Mesh, protection: &ProtectionMap, ratio: f32) -> Result<Mesh>;
}

/// meshoptimizer edge-collapse simplifier with hard vertex locks.
#[derive(Debug, Clone)]
pub struct MeshoptSimplifier {
    /// Relative error bound passed to meshoptimizer (fraction of mesh extent).
    pub target_error: f32,
}

impl Default for MeshoptSimplifier {
    fn default() -> Self {
        Self { target_error: 1.0 }
    }
}

impl Simplifier for MeshoptSimplifier {
    fn simplify(&self, mesh: &Mesh, protection: &ProtectionMap, ratio: f32) -> Result<Mesh> {
        if protection.weights.len() != mesh.vertex_count() {
            return Err(DecimateError::Simplify(format!(
                "protection map covers {} vertices, mesh has {}",
                protection.weights.len(),
                mesh.vertex_count()
            )));
        }
        if mesh.is_empty() || mesh.face_count() == 0 {
            return Ok(Mesh::default());
        }
        if ratio >= 1.0 {
            return Ok(triangulated(mesh));
        }

        let indices = mesh.triangle_indices();
        let adapter = VertexDataAdapter::new(
            bytemuck::cast_slice(&mesh.positions),
            std::mem::size_of::<Vec3>(),
            0,
        )
        .map_err(|e| DecimateError::Simplify(format!("Invalid vertex buffer: {e}")))?;

        let target_count = (indices.len() as f64 * ratio as f64) as usize;
        // Ensure target_count is a multiple of 3 (whole triangles)
        let target_count = (target_count / 3) * 3;

        let lock = protection.lock_mask();
        let mut result_error: f32 = 0.0;
        let new_indices = meshopt::simplify_with_attributes_and_locks(
            &indices,
            &adapter,
            &protection.weights,
            &[PROTECTION_ATTRIBUTE_WEIGHT],
            std::mem::size_of::<f32>(),
            &lock,
            target_count,
            self.target_error,
            SimplifyOptions::None,
            Some(&mut result_error),
        );

        debug!(
            before = indices.len() / 3,
            target = target_count / 3,
            after = new_indices.len() / 3,
            error = result_error,
            "meshopt simplification"
        );

        Ok(compact_mesh(&new_indices, mesh))
    }
}

/// Fan-triangulate a mesh in place of simplification, keeping vertex numbering.
fn triangulated(mesh: &Mesh) -> Mesh {
    let tris = mesh.triangles();
    let uvs = if mesh.has_uvs() {
        let mut uvs = Vec::with_capacity(tris.len());
        for face in &mesh.uvs {
            for i in 1..face.len().saturating_sub(1) {
                uvs.push(vec![face[0], face[i], face[i + 1]]);
            }
        }
        uvs
    } else {
        Vec::new()
    };

    Mesh {
        positions: mesh.positions.clone(),
        faces: tris.iter().map(|t| t.vertices.to_vec()).collect(),
        uvs,
        seams: mesh.seams.clone(),
        ..Default::default()
    }
}

/// Pick a UV for every corner of a simplified index buffer.
///
/// Each corner takes the UV of an original face around that vertex which
/// shares the most vertices with the output triangle, so corners on a seam
/// pick the side of the seam the triangle lies on.
pub fn carry_corner_uvs(indices: &[u32], source: &Mesh) -> Vec<Vec<Vec2>> {
    let mut vertex_faces = vec![Vec::new(); source.vertex_count()];
    for (fi, face) in source.faces.iter().enumerate() {
        for &v in face {
            vertex_faces[v as usize].push(fi);
        }
    }

    indices
        .chunks_exact(3)
        .map(|tri| {
            tri.iter()
                .map(|&v| {
                    let mut best: Option<(usize, usize)> = None;
                    for &fi in &vertex_faces[v as usize] {
                        let shared = tri.iter().filter(|&&t| source.faces[fi].contains(&t)).count();
                        if best.is_none_or(|(_, s)| shared > s) {
                            best = Some((fi, shared));
                        }
                    }
                    best.and_then(|(fi, _)| {
                        let corner = source.faces[fi].iter().position(|&x| x == v)?;
                        source.corner_uv(fi, corner)
                    })
                    .unwrap_or(Vec2::ZERO)
                })
                .collect()
        })
        .collect()
}

/// Remap indices to remove unreferenced vertices and rebuild the mesh.
///
/// Scans the index buffer to find referenced vertices, builds a compact remap,
/// then rebuilds positions, per-corner UVs and surviving seam edges.
pub fn compact_mesh(indices: &[u32], source: &Mesh) -> Mesh {
    if indices.is_empty() {
        return Mesh::default();
    }

    let uvs = if source.has_uvs() {
        carry_corner_uvs(indices, source)
    } else {
        Vec::new()
    };

    // Build remap: old_index -> new_index (u32::MAX if unreferenced)
    let mut remap = vec![u32::MAX; source.vertex_count()];
    let mut positions = Vec::new();
    for &idx in indices {
        let i = idx as usize;
        if remap[i] == u32::MAX {
            remap[i] = positions.len() as u32;
            positions.push(source.positions[i]);
        }
    }

    let faces = indices
        .chunks_exact(3)
        .map(|t| t.iter().map(|&i| remap[i as usize]).collect())
        .collect();

    let seams = source
        .seams
        .iter()
        .filter_map(|&(a, b)| {
            let (ra, rb) = (remap[a as usize], remap[b as usize]);
            (ra != u32::MAX && rb != u32::MAX).then(|| edge_key(ra, rb))
        })
        .collect();

    Mesh {
        positions,
        faces,
        uvs,
        seams,
        ..Default::default()
    }
}
