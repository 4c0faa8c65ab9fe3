pub mod boundary;
pub mod simplifier;

pub use boundary::{ProtectionMap, classify_boundary};
pub use simplifier::{MeshoptSimplifier, Simplifier, compact_mesh};

use crate::types::Mesh;

/// Triangle budget for a decimation: `(target, total)`.
///
/// `total` counts `n - 2` triangles per polygon; `target` is `ratio * total`
/// rounded down.
pub fn estimate_target_triangles(mesh: &Mesh, ratio: f32) -> (usize, usize) {
    let total = mesh.triangle_count();
    let target = (total as f64 * ratio as f64) as usize;
    (target, total)
}
