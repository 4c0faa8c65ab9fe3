use std::collections::HashMap;

use crate::types::{EdgeKey, Mesh, edge_key};

/// An undirected edge and the faces that use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub key: EdgeKey,
    pub faces: Vec<u32>,
}

impl EdgeRecord {
    /// Open-boundary edge: used by exactly one face.
    pub fn is_boundary(&self) -> bool {
        self.faces.len() == 1
    }

    /// The endpoint that is not `v`.
    pub fn other(&self, v: u32) -> u32 {
        if self.key.0 == v { self.key.1 } else { self.key.0 }
    }
}

/// Edge → faces and vertex → edges incidence, derived from the face list.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<EdgeRecord>,
    lookup: HashMap<EdgeKey, usize>,
    vertex_edges: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build incidence tables. Edges are numbered in first-seen face order.
    pub fn build(mesh: &Mesh) -> Self {
        let mut adj = Adjacency {
            edges: Vec::new(),
            lookup: HashMap::new(),
            vertex_edges: vec![Vec::new(); mesh.vertex_count()],
        };

        for fi in 0..mesh.face_count() {
            for (a, b) in mesh.face_edges(fi) {
                if a == b {
                    continue;
                }
                let key = edge_key(a, b);
                let index = match adj.lookup.get(&key) {
                    Some(&i) => i,
                    None => {
                        let i = adj.edges.len();
                        adj.edges.push(EdgeRecord {
                            key,
                            faces: Vec::new(),
                        });
                        adj.lookup.insert(key, i);
                        adj.vertex_edges[a as usize].push(i);
                        adj.vertex_edges[b as usize].push(i);
                        i
                    }
                };
                let faces = &mut adj.edges[index].faces;
                if faces.last() != Some(&(fi as u32)) {
                    faces.push(fi as u32);
                }
            }
        }

        adj
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, a: u32, b: u32) -> Option<&EdgeRecord> {
        self.lookup.get(&edge_key(a, b)).map(|&i| &self.edges[i])
    }

    /// Edges incident to vertex `v`.
    pub fn vertex_edges(&self, v: u32) -> impl Iterator<Item = &EdgeRecord> {
        self.vertex_edges[v as usize].iter().map(|&i| &self.edges[i])
    }

    /// Vertices one edge away from `v`.
    pub fn neighbors(&self, v: u32) -> impl Iterator<Item = u32> + '_ {
        self.vertex_edges(v).map(move |e| e.other(v))
    }

    /// Edges used by exactly one face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.iter().filter(|e| e.is_boundary()).map(|e| e.key)
    }
}
