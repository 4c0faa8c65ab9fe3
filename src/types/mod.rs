pub mod mesh;
pub mod object;
pub mod shape_key;
pub mod vertex_group;

pub use mesh::{EdgeKey, Mesh, Triangle, edge_key};
pub use object::{MeshObject, ObjectTransform, ParentBinding, Scene};
pub use shape_key::{Interpolation, RelativeKey, ShapeKey, ShapeKeys};
pub use vertex_group::{VertexGroup, VertexGroups};
