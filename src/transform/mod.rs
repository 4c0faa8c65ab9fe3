use glam::{Mat4, Vec3};

use crate::error::{DecimateError, Result};
use crate::types::{Mesh, MeshObject, ObjectTransform};

/// Inverse of an object's world matrix.
///
/// The determinant is compared against the cube of the largest basis-axis
/// length, so small but uniform scales stay invertible.
pub fn world_to_local(world: &Mat4) -> Result<Mat4> {
    let det = world.determinant();
    let scale = world
        .x_axis
        .truncate()
        .length()
        .max(world.y_axis.truncate().length())
        .max(world.z_axis.truncate().length());
    let tolerance = f32::EPSILON * scale * scale * scale;

    if !det.is_finite() || det.abs() <= tolerance {
        return Err(DecimateError::Transform(format!(
            "world matrix is not invertible (determinant {det})"
        )));
    }
    let inverse = world.inverse();
    if !inverse.is_finite() {
        return Err(DecimateError::Transform(
            "world matrix inverse is not finite".into(),
        ));
    }
    Ok(inverse)
}

/// Matrix taking points from `from`'s local space into `to`'s local space.
pub fn relative_transform(from: &ObjectTransform, to: &ObjectTransform) -> Result<Mat4> {
    Ok(world_to_local(&to.world)? * from.world)
}

/// Transform every position channel of a mesh (vertices and all shape keys).
pub fn transform_mesh(mesh: &mut Mesh, matrix: &Mat4) {
    let apply = |p: &mut Vec3| *p = matrix.transform_point3(*p);
    mesh.positions.iter_mut().for_each(apply);
    if let Some(keys) = mesh.shape_keys.as_mut() {
        for key in keys.iter_mut() {
            key.positions.iter_mut().for_each(apply);
        }
    }
}

/// Apply an object's world matrix to its mesh and clear its parenting.
///
/// Returns the transform the object had before baking.
pub fn bake_transform(object: &mut MeshObject) -> ObjectTransform {
    let previous = std::mem::take(&mut object.transform);
    if previous.world != Mat4::IDENTITY {
        transform_mesh(&mut object.mesh, &previous.world);
    }
    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParentBinding, ShapeKeys};
    use approx::assert_relative_eq;

    fn placed(world: Mat4) -> ObjectTransform {
        ObjectTransform {
            world,
            parent: None,
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let err = world_to_local(&flat).unwrap_err();
        assert!(matches!(err, DecimateError::Transform(_)));
    }

    #[test]
    fn tiny_uniform_scale_is_invertible() {
        let tiny = Mat4::from_scale(Vec3::splat(1e-5));
        let inverse = world_to_local(&tiny).unwrap();
        let p = inverse.transform_point3(Vec3::new(1e-5, 2e-5, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn nearly_flat_matrix_is_rejected() {
        let flat = Mat4::from_scale(Vec3::new(1.0, 1.0, 1e-9));
        assert!(world_to_local(&flat).is_err());
    }

    #[test]
    fn relative_transform_maps_between_spaces() {
        let target = placed(Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let source = placed(Mat4::from_scale(Vec3::splat(2.0)));

        let m = relative_transform(&target, &source).unwrap();
        // Target-local origin sits at world (5,0,0), which is source-local (2.5,0,0).
        let p = m.transform_point3(Vec3::ZERO);
        assert_relative_eq!(p.x, 2.5);
        assert_relative_eq!(p.y, 0.0);
    }

    #[test]
    fn bake_moves_positions_and_keys() {
        let mut mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
        let mut keys = ShapeKeys::new("Basis", mesh.positions.clone());
        keys.add("Up").positions[0] = Vec3::Z;
        mesh.shape_keys = Some(keys);

        let mut object = MeshObject::new("Obj", mesh);
        object.transform = ObjectTransform {
            world: Mat4::from_translation(Vec3::new(0.0, 10.0, 0.0)),
            parent: Some(ParentBinding {
                parent: "Armature".into(),
                bone: Some("Hip".into()),
                parent_inverse: Mat4::IDENTITY,
            }),
        };

        let previous = bake_transform(&mut object);
        assert!(previous.parent.is_some());
        assert_eq!(object.transform, ObjectTransform::default());
        assert_eq!(object.mesh.positions[1], Vec3::new(1.0, 10.0, 0.0));

        let keys = object.mesh.shape_keys.as_ref().unwrap();
        assert_eq!(keys.reference().positions[0], Vec3::new(0.0, 10.0, 0.0));
        assert_eq!(keys.get(1).unwrap().positions[0], Vec3::new(0.0, 10.0, 1.0));
    }

    #[test]
    fn bake_identity_is_noop() {
        let mesh = Mesh::from_triangles(vec![Vec3::ZERO, Vec3::X, Vec3::Y], &[0, 1, 2]);
        let mut object = MeshObject::new("Obj", mesh.clone());
        bake_transform(&mut object);
        assert_eq!(object.mesh.positions, mesh.positions);
    }
}
