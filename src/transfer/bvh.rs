use glam::Vec3;

use crate::types::Mesh;

/// Leaves hold at most this many triangles.
const MAX_LEAF_TRIANGLES: usize = 4;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Inverted box that any `expand` call overwrites.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn from_triangle(corners: &[Vec3; 3]) -> Self {
        Self {
            min: corners[0].min(corners[1]).min(corners[2]),
            max: corners[0].max(corners[1]).max(corners[2]),
        }
    }

    pub fn expand(&mut self, other: &Self) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index of the longest axis (0=X, 1=Y, 2=Z).
    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Squared distance from `p` to the box; zero inside.
    pub fn distance_squared(&self, p: Vec3) -> f32 {
        let clamped = p.clamp(self.min, self.max);
        (p - clamped).length_squared()
    }
}

/// Closest point to `p` on triangle `(a, b, c)` (Voronoi-region walk).
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = 1.0 / (va + vb + vc);
    a + ab * (vb * denom) + ac * (vc * denom)
}

/// A triangle stored in the index.
#[derive(Debug, Clone, Copy)]
pub struct IndexedTriangle {
    /// Source polygon this triangle was cut from.
    pub face: u32,
    pub vertices: [u32; 3],
    pub corners: [Vec3; 3],
}

/// Result of a nearest-surface query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    /// Index into [`TriangleBvh::triangles`].
    pub triangle: u32,
    pub face: u32,
    pub vertices: [u32; 3],
    pub point: Vec3,
    pub distance: f32,
}

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        triangles: Vec<u32>,
    },
    Internal {
        bbox: Aabb,
        left: Box<Self>,
        right: Box<Self>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Read-only bounding volume hierarchy over the fan triangulation of a mesh.
///
/// Zero-area triangles are left out. An index over no triangles answers
/// every query with `None`.
#[derive(Debug)]
pub struct TriangleBvh {
    root: Option<BvhNode>,
    triangles: Vec<IndexedTriangle>,
}

impl TriangleBvh {
    pub fn build(mesh: &Mesh) -> Self {
        let triangles: Vec<IndexedTriangle> = mesh
            .triangles()
            .into_iter()
            .filter_map(|t| {
                let corners = t.vertices.map(|v| mesh.positions[v as usize]);
                let area2 = (corners[1] - corners[0])
                    .cross(corners[2] - corners[0])
                    .length_squared();
                (area2 > 0.0 && area2.is_finite()).then_some(IndexedTriangle {
                    face: t.face,
                    vertices: t.vertices,
                    corners,
                })
            })
            .collect();

        let root = if triangles.is_empty() {
            None
        } else {
            let mut order: Vec<u32> = (0..triangles.len() as u32).collect();
            Some(build_node(&triangles, &mut order))
        };

        Self { root, triangles }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[IndexedTriangle] {
        &self.triangles
    }

    /// Closest point on any indexed triangle. Ties keep the first triangle found.
    pub fn nearest(&self, point: Vec3) -> Option<NearestHit> {
        let root = self.root.as_ref()?;
        let mut best: Option<(u32, Vec3)> = None;
        let mut best_d2 = f32::INFINITY;
        self.nearest_in(root, point, &mut best, &mut best_d2);

        best.map(|(ti, closest)| {
            let tri = &self.triangles[ti as usize];
            NearestHit {
                triangle: ti,
                face: tri.face,
                vertices: tri.vertices,
                point: closest,
                distance: best_d2.sqrt(),
            }
        })
    }

    fn nearest_in(
        &self,
        node: &BvhNode,
        p: Vec3,
        best: &mut Option<(u32, Vec3)>,
        best_d2: &mut f32,
    ) {
        match node {
            BvhNode::Leaf { triangles, .. } => {
                for &ti in triangles {
                    let [a, b, c] = self.triangles[ti as usize].corners;
                    let q = closest_point_on_triangle(p, a, b, c);
                    let d2 = (q - p).length_squared();
                    if d2 < *best_d2 {
                        *best_d2 = d2;
                        *best = Some((ti, q));
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let dl = left.bbox().distance_squared(p);
                let dr = right.bbox().distance_squared(p);
                let (first, d_first, second, d_second) = if dl <= dr {
                    (left, dl, right, dr)
                } else {
                    (right, dr, left, dl)
                };
                if d_first <= *best_d2 {
                    self.nearest_in(first, p, best, best_d2);
                }
                if d_second <= *best_d2 {
                    self.nearest_in(second, p, best, best_d2);
                }
            }
        }
    }
}

/// Median split on the longest axis of the centroid bounds.
fn build_node(triangles: &[IndexedTriangle], order: &mut [u32]) -> BvhNode {
    let mut bbox = Aabb::empty();
    let mut centroid_bounds = Aabb::empty();
    for &ti in order.iter() {
        let tri = &triangles[ti as usize];
        bbox.expand(&Aabb::from_triangle(&tri.corners));
        centroid_bounds.expand_point(centroid(tri));
    }

    if order.len() <= MAX_LEAF_TRIANGLES {
        return BvhNode::Leaf {
            bbox,
            triangles: order.to_vec(),
        };
    }

    let axis = centroid_bounds.longest_axis();
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        let ca = centroid(&triangles[a as usize])[axis];
        let cb = centroid(&triangles[b as usize])[axis];
        ca.total_cmp(&cb)
    });

    let (lo, hi) = order.split_at_mut(mid);
    BvhNode::Internal {
        bbox,
        left: Box::new(build_node(triangles, lo)),
        right: Box::new(build_node(triangles, hi)),
    }
}

fn centroid(tri: &IndexedTriangle) -> Vec3 {
    (tri.corners[0] + tri.corners[1] + tri.corners[2]) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_grid(n: usize) -> Mesh {
        let side = n + 1;
        let mut positions = Vec::with_capacity(side * side);
        for y in 0..side {
            for x in 0..side {
                let (fx, fy) = (x as f32 / n as f32, y as f32 / n as f32);
                // Gentle bump so the surface is not planar.
                positions.push(Vec3::new(fx, fy, (fx * 3.0).sin() * (fy * 2.0).cos() * 0.2));
            }
        }
        let mut indices = Vec::with_capacity(n * n * 6);
        for y in 0..n {
            for x in 0..n {
                let tl = (y * side + x) as u32;
                let tr = tl + 1;
                let bl = tl + side as u32;
                let br = bl + 1;
                indices.extend_from_slice(&[tl, bl, tr, tr, bl, br]);
            }
        }
        Mesh::from_triangles(positions, &indices)
    }

    fn brute_force_distance(mesh: &Mesh, p: Vec3) -> f32 {
        mesh.triangles()
            .iter()
            .map(|t| {
                let [a, b, c] = t.vertices.map(|v| mesh.positions[v as usize]);
                (closest_point_on_triangle(p, a, b, c) - p).length()
            })
            .fold(f32::INFINITY, f32::min)
    }

    #[test]
    fn closest_point_regions() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Y);
        // Interior projects straight down.
        let q = closest_point_on_triangle(Vec3::new(0.25, 0.25, 1.0), a, b, c);
        assert_relative_eq!(q.x, 0.25);
        assert_relative_eq!(q.y, 0.25);
        assert_relative_eq!(q.z, 0.0);
        // Vertex regions.
        assert_eq!(closest_point_on_triangle(Vec3::new(-1.0, -1.0, 0.0), a, b, c), a);
        assert_eq!(closest_point_on_triangle(Vec3::new(2.0, -0.5, 0.0), a, b, c), b);
        assert_eq!(closest_point_on_triangle(Vec3::new(-0.5, 2.0, 0.0), a, b, c), c);
        // Edge region.
        let q = closest_point_on_triangle(Vec3::new(0.5, -1.0, 0.0), a, b, c);
        assert_relative_eq!(q.x, 0.5);
        assert_relative_eq!(q.y, 0.0);
        // Hypotenuse.
        let q = closest_point_on_triangle(Vec3::new(1.0, 1.0, 0.0), a, b, c);
        assert_relative_eq!(q.x, 0.5);
        assert_relative_eq!(q.y, 0.5);
    }

    #[test]
    fn aabb_distance() {
        let bbox = Aabb {
            min: Vec3::ZERO,
            max: Vec3::ONE,
        };
        assert_eq!(bbox.distance_squared(Vec3::splat(0.5)), 0.0);
        assert_relative_eq!(bbox.distance_squared(Vec3::new(3.0, 0.5, 0.5)), 4.0);
        assert_eq!(bbox.longest_axis(), 0);
        assert_eq!(bbox.center(), Vec3::splat(0.5));
    }

    #[test]
    fn empty_mesh_has_no_result() {
        let bvh = TriangleBvh::build(&Mesh::default());
        assert!(bvh.is_empty());
        assert!(bvh.nearest(Vec3::ZERO).is_none());
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mesh = Mesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0), Vec3::Y],
            &[0, 1, 2, 0, 0, 3],
        );
        let bvh = TriangleBvh::build(&mesh);
        assert_eq!(bvh.len(), 0);
        assert!(bvh.nearest(Vec3::ONE).is_none());
    }

    #[test]
    fn degenerate_neighbour_does_not_hide_valid_triangle() {
        let mesh = Mesh::from_triangles(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(2.0, 0.0, 0.0)],
            &[0, 1, 3, 0, 1, 2],
        );
        let bvh = TriangleBvh::build(&mesh);
        assert_eq!(bvh.len(), 1);
        let hit = bvh.nearest(Vec3::new(0.2, 0.2, 0.5)).unwrap();
        assert_eq!(hit.face, 1);
        assert_relative_eq!(hit.distance, 0.5);
    }

    #[test]
    fn polygon_faces_keep_their_face_id() {
        let mesh = Mesh::from_faces(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(5.0, 0.0, 0.0),
                Vec3::new(6.0, 0.0, 0.0),
                Vec3::new(5.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3], vec![4, 5, 6]],
        );
        let bvh = TriangleBvh::build(&mesh);
        assert_eq!(bvh.len(), 3);
        assert_eq!(bvh.nearest(Vec3::new(0.1, 0.9, 1.0)).unwrap().face, 0);
        assert_eq!(bvh.nearest(Vec3::new(5.2, 0.2, -1.0)).unwrap().face, 1);
    }

    #[test]
    fn matches_brute_force() {
        let mesh = make_grid(16);
        let bvh = TriangleBvh::build(&mesh);
        assert_eq!(bvh.len(), mesh.triangle_count());

        for i in 0..200 {
            let t = i as f32;
            let p = Vec3::new(
                (t * 0.37).sin() * 1.5 + 0.5,
                (t * 0.73).cos() * 1.5 + 0.5,
                (t * 0.11).sin(),
            );
            let hit = bvh.nearest(p).unwrap();
            assert_relative_eq!(hit.distance, brute_force_distance(&mesh, p), epsilon = 1e-5);
            assert_relative_eq!((hit.point - p).length(), hit.distance, epsilon = 1e-5);
        }
    }

    #[test]
    fn vertex_query_hits_distance_zero() {
        let mesh = make_grid(8);
        let bvh = TriangleBvh::build(&mesh);
        for (v, &p) in mesh.positions.iter().enumerate() {
            let hit = bvh.nearest(p).unwrap();
            assert_eq!(hit.distance, 0.0);
            assert!(hit.vertices.contains(&(v as u32)));
        }
    }
}
