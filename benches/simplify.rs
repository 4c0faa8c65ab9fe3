use criterion::{criterion_group, criterion_main, Criterion};
use glam::{Vec2, Vec3};
use seam_keeper::decimation::{MeshoptSimplifier, Simplifier, classify_boundary};
use seam_keeper::topology::mark_seams_from_uv_islands;
use seam_keeper::types::Mesh;

/// Generate a flat grid mesh with `n x n` quads, split into two UV islands.
fn make_grid(n: usize) -> Mesh {
    let verts_per_side = n + 1;
    let mut positions = Vec::with_capacity(verts_per_side * verts_per_side);

    for y in 0..verts_per_side {
        for x in 0..verts_per_side {
            let fx = x as f32 / n as f32;
            let fy = y as f32 / n as f32;
            positions.push(Vec3::new(fx, fy, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(n * n);
    let mut uvs = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let tl = (y * verts_per_side + x) as u32;
            let tr = tl + 1;
            let bl = tl + verts_per_side as u32;
            let br = bl + 1;
            let face = vec![tl, tr, br, bl];
            let shift = if x < n / 2 { 0.0 } else { 2.0 };
            uvs.push(
                face.iter()
                    .map(|&v| positions[v as usize].truncate() + Vec2::new(shift, 0.0))
                    .collect(),
            );
            faces.push(face);
        }
    }

    let mut mesh = Mesh::from_faces(positions, faces);
    mesh.uvs = uvs;
    mesh
}

fn bench_classify(c: &mut Criterion) {
    // 224x224 grid = 50176 quads = 100352 triangles
    let mut mesh = make_grid(224);
    mark_seams_from_uv_islands(&mut mesh);

    c.bench_function("mark_seams_100k", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            mark_seams_from_uv_islands(&mut m)
        });
    });

    c.bench_function("classify_boundary_100k", |b| {
        b.iter(|| classify_boundary(&mesh));
    });
}

fn bench_simplify(c: &mut Criterion) {
    let mut mesh = make_grid(224);
    mark_seams_from_uv_islands(&mut mesh);
    let protection = classify_boundary(&mesh);
    let simplifier = MeshoptSimplifier::default();

    c.bench_function("simplify_protected_50pct_100k", |b| {
        b.iter(|| simplifier.simplify(&mesh, &protection, 0.5));
    });

    c.bench_function("simplify_protected_10pct_100k", |b| {
        b.iter(|| simplifier.simplify(&mesh, &protection, 0.1));
    });
}

criterion_group!(benches, bench_classify, bench_simplify);
criterion_main!(benches);
