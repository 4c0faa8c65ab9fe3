use tracing::debug;

use crate::types::Mesh;

use super::Adjacency;

/// Corner UVs closer than this are treated as the same UV.
const UV_EPSILON: f32 = 1e-5;

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb.max(ra)] = ra.min(rb);
        }
    }
}

fn vertex_uv(mesh: &Mesh, face: usize, vertex: u32) -> Option<glam::Vec2> {
    let corner = mesh.faces[face].iter().position(|&v| v == vertex)?;
    mesh.corner_uv(face, corner)
}

fn uvs_match(mesh: &Mesh, fa: usize, fb: usize, a: u32, b: u32) -> bool {
    let same = |v| match (vertex_uv(mesh, fa, v), vertex_uv(mesh, fb, v)) {
        (Some(ua), Some(ub)) => ua.abs_diff_eq(ub, UV_EPSILON),
        _ => false,
    };
    same(a) && same(b)
}

/// Island id for every face, numbered densely in face order.
///
/// Islands are grown across edges whose two face corners agree on the UV of
/// both endpoints.
///
/// Meshes without UVs put each connected face in island 0.
pub fn uv_islands(mesh: &Mesh, adjacency: &Adjacency) -> Vec<usize> {
    let mut sets = DisjointSet::new(mesh.face_count());

    for edge in adjacency.edges() {
        let (a, b) = edge.key;
        for pair in edge.faces.windows(2) {
            let (fa, fb) = (pair[0] as usize, pair[1] as usize);
            if !mesh.has_uvs() || uvs_match(mesh, fa, fb, a, b) {
                sets.union(fa, fb);
            }
        }
    }

    let mut ids = vec![usize::MAX; mesh.face_count()];
    let mut next = 0;
    let mut out = Vec::with_capacity(mesh.face_count());
    for f in 0..mesh.face_count() {
        let root = sets.find(f);
        if ids[root] == usize::MAX {
            ids[root] = next;
            next += 1;
        }
        out.push(ids[root]);
    }
    out
}

/// Flag every edge between two UV islands as a seam.
///
/// Existing seams are kept. Returns the number of newly flagged edges.
/// Unmapped meshes are left untouched.
pub fn mark_seams_from_uv_islands(mesh: &mut Mesh) -> usize {
    if !mesh.has_uvs() {
        return 0;
    }

    let adjacency = Adjacency::build(mesh);
    let islands = uv_islands(mesh, &adjacency);

    let mut marked = 0;
    for edge in adjacency.edges() {
        let first = islands[edge.faces[0] as usize];
        let split = edge.faces.iter().any(|&f| islands[f as usize] != first);
        if split && mesh.seams.insert(edge.key) {
            marked += 1;
        }
    }

    debug!(
        islands = islands.iter().max().map_or(0, |m| m + 1),
        seams = marked,
        "Marked seams from UV islands"
    );
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    /// Unit quad split on the 0-2 diagonal, one UV island.
    fn mapped_quad() -> Mesh {
        let mut mesh = Mesh::from_triangles(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            &[0, 1, 2, 0, 2, 3],
        );
        let uv = |v: u32| {
            let p = mesh.positions[v as usize];
            Vec2::new(p.x, p.y)
        };
        let uvs = mesh
            .faces
            .iter()
            .map(|f| f.iter().map(|&v| uv(v)).collect())
            .collect();
        mesh.uvs = uvs;
        mesh
    }

    #[test]
    fn single_island_has_no_seams() {
        let mut mesh = mapped_quad();
        let adjacency = Adjacency::build(&mesh);
        assert_eq!(uv_islands(&mesh, &adjacency), vec![0, 0]);
        assert_eq!(mark_seams_from_uv_islands(&mut mesh), 0);
        assert!(mesh.seams.is_empty());
    }

    #[test]
    fn split_uvs_mark_shared_edge() {
        let mut mesh = mapped_quad();
        // Move the second triangle to its own region of UV space.
        for uv in &mut mesh.uvs[1] {
            *uv += Vec2::new(2.0, 0.0);
        }

        let adjacency = Adjacency::build(&mesh);
        assert_eq!(uv_islands(&mesh, &adjacency), vec![0, 1]);

        assert_eq!(mark_seams_from_uv_islands(&mut mesh), 1);
        assert!(mesh.is_seam(0, 2));
        assert!(!mesh.is_seam(0, 1));
    }

    #[test]
    fn one_shared_corner_is_not_enough() {
        let mut mesh = mapped_quad();
        // Face 1 corner for vertex 2 is at index 1.
        mesh.uvs[1][1] = Vec2::new(0.5, 0.5);
        assert_eq!(mark_seams_from_uv_islands(&mut mesh), 1);
        assert!(mesh.is_seam(2, 0));
    }

    #[test]
    fn unmapped_mesh_is_untouched() {
        let mut mesh = mapped_quad();
        mesh.uvs.clear();
        assert_eq!(mark_seams_from_uv_islands(&mut mesh), 0);
        assert!(mesh.seams.is_empty());
    }

    #[test]
    fn existing_seams_are_kept() {
        let mut mesh = mapped_quad();
        mesh.seams.insert((0, 1));
        mark_seams_from_uv_islands(&mut mesh);
        assert!(mesh.is_seam(0, 1));
    }
}
