use std::path::Path;

use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use crate::error::{DecimateError, Result};
use crate::types::{Mesh, MeshObject};

/// Load an OBJ file, one object per OBJ model.
///
/// Polygons are kept as authored and UVs stay per corner, so split UVs on a
/// shared vertex survive as seams.
pub fn load_obj(path: &Path) -> Result<Vec<MeshObject>> {
    let options = tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, materials) = tobj::load_obj(path, &options)
        .map_err(|e| DecimateError::Input(format!("Failed to load OBJ: {e}")))?;

    if let Err(e) = materials {
        warn!("Failed to load MTL: {e}");
    }

    debug!(model_count = models.len(), "Loaded OBJ models");

    models
        .into_iter()
        .enumerate()
        .map(|(i, model)| {
            let name = if model.name.is_empty() {
                format!("Object.{i:03}")
            } else {
                model.name
            };
            let mesh = convert_mesh(model.mesh)?;
            Ok(MeshObject::new(name, mesh))
        })
        .collect()
}

/// Convert a `tobj::Mesh` (separate position and UV index streams) into a `Mesh`.
fn convert_mesh(mesh: tobj::Mesh) -> Result<Mesh> {
    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    // Empty arities means every face is a triangle.
    let arities: Vec<usize> = if mesh.face_arities.is_empty() {
        vec![3; mesh.indices.len() / 3]
    } else {
        mesh.face_arities.iter().map(|&a| a as usize).collect()
    };

    let has_uvs = !mesh.texcoords.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len();
    let texcoords: Vec<Vec2> = mesh
        .texcoords
        .chunks_exact(2)
        .map(|uv| Vec2::new(uv[0], uv[1]))
        .collect();

    let mut faces = Vec::with_capacity(arities.len());
    let mut uvs = Vec::new();
    let mut start = 0;
    for arity in arities {
        let end = start + arity;
        let face = mesh.indices.get(start..end).ok_or_else(|| {
            DecimateError::Input(format!("OBJ face arities exceed {} indices", mesh.indices.len()))
        })?;
        faces.push(face.to_vec());

        if has_uvs {
            let corners = mesh.texcoord_indices[start..end]
                .iter()
                .map(|&ti| {
                    texcoords.get(ti as usize).copied().ok_or_else(|| {
                        DecimateError::Input(format!("OBJ texture coordinate {ti} out of range"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            uvs.push(corners);
        }
        start = end;
    }

    let mut result = Mesh::from_faces(positions, faces);
    result.uvs = uvs;
    result.validate()?;
    Ok(result)
}
