use glam::Mat4;
use serde::{Deserialize, Serialize};

use super::Mesh;

/// Parent relationship of an object, kept so it can be restored after baking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentBinding {
    pub parent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bone: Option<String>,
    pub parent_inverse: Mat4,
}

/// Placement of an object in the scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    /// Object-local to world matrix.
    pub world: Mat4,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentBinding>,
}

/// A named mesh instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshObject {
    pub name: String,
    pub mesh: Mesh,
    #[serde(default)]
    pub transform: ObjectTransform,
    #[serde(default)]
    pub hidden: bool,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: ObjectTransform::default(),
            hidden: false,
        }
    }

    /// Whether the object has geometry the decimator can work on.
    pub fn is_eligible(&self) -> bool {
        !self.mesh.is_empty() && self.mesh.face_count() > 0
    }
}

/// Flat list of mesh objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub objects: Vec<MeshObject>,
}

impl Scene {
    pub fn find(&self, name: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }

    /// Index of the first object with faces.
    pub fn first_eligible(&self) -> Option<usize> {
        self.objects.iter().position(MeshObject::is_eligible)
    }
}
