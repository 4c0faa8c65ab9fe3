pub mod bvh;
pub mod groups;
pub mod mapping;
pub mod shape_keys;

use glam::{Mat4, Vec3};
use tracing::info;

use crate::error::Result;
use crate::transform::relative_transform;
use crate::types::{Mesh, MeshObject};

pub use bvh::{NearestHit, TriangleBvh};
pub use groups::transfer_vertex_groups;
pub use mapping::{VertexMap, build_vertex_map};
pub use shape_keys::{ShapeKeyTransfer, transfer_shape_keys};

/// Summary of one transfer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    pub mapped: usize,
    pub unmapped: usize,
    pub vertex_groups: usize,
    /// Shape keys written including the reference key; 0 when the source has none.
    pub shape_keys: usize,
    /// `(key, missing antecedent)` pairs that fell back to the reference key.
    pub unresolved_relatives: Vec<(String, String)>,
}

/// Transfer positions, vertex groups and shape keys from `source` onto `target`.
///
/// Every target vertex is snapped to a source vertex through the source's
/// surface, and that one mapping drives positions, vertex groups and every
/// shape key, so a target vertex inherits all of its channels from the same
/// source vertex.
///
/// Target vertices are taken through both objects' world matrices into the
/// source's local space before the nearest-surface lookup.
pub fn transfer_mesh_data(source: &MeshObject, target: &mut MeshObject) -> Result<TransferReport> {
    let to_source = relative_transform(&target.transform, &source.transform)?;
    Ok(transfer_between(&source.mesh, &mut target.mesh, &to_source))
}

/// Transfer between two meshes given the target-local → source-local matrix.
pub fn transfer_between(source: &Mesh, target: &mut Mesh, to_source: &Mat4) -> TransferReport {
    let bvh = TriangleBvh::build(source);
    let queries: Vec<Vec3> = target
        .positions
        .iter()
        .map(|&p| to_source.transform_point3(p))
        .collect();
    let map = build_vertex_map(source, &bvh, &queries);
    drop(bvh);

    apply_vertex_map(source, target, &map)
}

/// Replay source attributes onto the target through a finished vertex map.
///
/// Mapped target vertices move to their source vertex's position; unmapped
/// ones keep their position, get no group weights, and sit at the reference
/// shape in every key.
pub fn apply_vertex_map(source: &Mesh, target: &mut Mesh, map: &VertexMap) -> TransferReport {
    for (t, s) in map.pairs() {
        target.positions[t as usize] = source.positions[s as usize];
    }

    let vertex_groups = transfer_vertex_groups(&source.vertex_groups, &mut target.vertex_groups, map);
    let keys = transfer_shape_keys(source, target, map).unwrap_or_default();

    let report = TransferReport {
        mapped: map.mapped_count(),
        unmapped: map.unmapped_count(),
        vertex_groups,
        shape_keys: keys.keys,
        unresolved_relatives: keys.unresolved,
    };

    info!(
        mapped = report.mapped,
        unmapped = report.unmapped,
        groups = report.vertex_groups,
        shape_keys = report.shape_keys,
        "Transferred mesh data"
    );

    report
}
