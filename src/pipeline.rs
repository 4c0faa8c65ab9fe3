use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{DecimateConfig, MAX_RATIO, MIN_RATIO};
use crate::decimation::{self, MeshoptSimplifier, Simplifier, classify_boundary};
use crate::error::{DecimateError, Result};
use crate::export;
use crate::ingestion;
use crate::topology::mark_seams_from_uv_islands;
use crate::transfer::{TransferReport, transfer_mesh_data};
use crate::transform::{bake_transform, world_to_local};
use crate::types::{MeshObject, Scene};

/// Status line reported after a successful decimation.
pub const COMPLETE_STATUS: &str = "Mesh decimation complete with full data restoration.";

/// Result of decimating one object.
#[derive(Debug, Clone)]
pub struct DecimateOutcome {
    /// The new `<source>_Decimated` object.
    pub object: MeshObject,
    pub source_triangles: usize,
    pub result_triangles: usize,
    pub report: TransferReport,
    pub status: String,
}

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub object: String,
    pub source_triangles: usize,
    pub result_triangles: usize,
    pub status: String,
    pub duration: Duration,
}

/// Decimate `source` into a new object and restore its per-vertex data.
///
/// The source is never modified. The copy is baked into world space, seams
/// are marked along UV island borders, seams and open borders are protected,
/// and the protected mesh is simplified without its shape keys. Positions,
/// vertex groups and shape keys are then transferred back from the untouched
/// source and the original placement is restored.
pub fn decimate_object(
    source: &MeshObject,
    ratio: f32,
    simplifier: &dyn Simplifier,
) -> Result<DecimateOutcome> {
    if !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
        return Err(DecimateError::Precondition(format!(
            "ratio {ratio} outside [{MIN_RATIO}, {MAX_RATIO}]"
        )));
    }
    if !source.is_eligible() {
        return Err(DecimateError::Precondition(format!(
            "'{}' is not a mesh with faces",
            source.name
        )));
    }
    source
        .mesh
        .validate()
        .map_err(|e| DecimateError::Precondition(e.to_string()))?;
    world_to_local(&source.transform.world)
        .map_err(|e| DecimateError::Precondition(e.to_string()))?;

    let mut working = source.clone();
    let placement = bake_transform(&mut working);

    let seams = mark_seams_from_uv_islands(&mut working.mesh);
    let protection = classify_boundary(&working.mesh);
    info!(
        object = %source.name,
        seams,
        locked = protection.locked,
        buffer = protection.buffer,
        "Protected seams and borders"
    );

    working.mesh.shape_keys = None;
    working.mesh.vertex_groups.clear();

    let simplified = simplifier.simplify(&working.mesh, &protection, ratio)?;
    let source_triangles = source.mesh.triangle_count();
    let result_triangles = simplified.triangle_count();
    info!(
        before = source_triangles,
        after = result_triangles,
        ratio,
        "Simplified"
    );

    let mut object = MeshObject::new(format!("{}_Decimated", source.name), simplified);
    let report = transfer_mesh_data(source, &mut object)?;
    object.transform = placement;

    Ok(DecimateOutcome {
        object,
        source_triangles,
        result_triangles,
        report,
        status: COMPLETE_STATUS.to_string(),
    })
}

/// Pipeline orchestrator: load, decimate, write.
pub struct Pipeline;

impl Pipeline {
    /// Run the full decimation pipeline.
    pub fn run(config: &DecimateConfig) -> Result<ProcessingResult> {
        let start = Instant::now();

        info!(input = %config.input.display(), "Starting pipeline");

        info!("Stage 1/3: Ingestion");
        let mut scene = ingestion::load_scene(&config.input)?;
        let index = select_object(&scene, config.object.as_deref())?;
        let ratio = config.simplify.ratio;

        if config.dry_run {
            info!("--dry-run: estimating triangle budget");
            let source = &scene.objects[index];
            let (target, total) = decimation::estimate_target_triangles(&source.mesh, ratio);
            print_dry_run_summary(source, target, total);
            return Ok(ProcessingResult {
                object: source.name.clone(),
                source_triangles: total,
                result_triangles: target,
                status: format!("{target} / {total}"),
                duration: start.elapsed(),
            });
        }

        info!("Stage 2/3: Decimation");
        let simplifier = MeshoptSimplifier {
            target_error: config.simplify.max_error,
        };
        let outcome = decimate_object(&scene.objects[index], ratio, &simplifier)?;
        print_transfer_summary(&outcome);

        info!("Stage 3/3: Export");
        scene.objects[index].hidden = true;
        let name = outcome.object.name.clone();
        scene.objects.push(outcome.object);
        export::write_scene(&scene, &config.output)?;

        let duration = start.elapsed();
        info!(object = %name, elapsed = ?duration, "Pipeline complete");

        Ok(ProcessingResult {
            object: name,
            source_triangles: outcome.source_triangles,
            result_triangles: outcome.result_triangles,
            status: outcome.status,
            duration,
        })
    }
}

/// Index of the object to decimate: the named one, or the first with faces.
pub fn select_object(scene: &Scene, name: Option<&str>) -> Result<usize> {
    let index = match name {
        Some(name) => scene
            .find(name)
            .ok_or_else(|| DecimateError::Precondition(format!("no object named '{name}'")))?,
        None => scene
            .first_eligible()
            .ok_or_else(|| DecimateError::Precondition("Select a mesh to decimate".into()))?,
    };
    Ok(index)
}

/// Print the triangle budget for a dry run.
fn print_dry_run_summary(source: &MeshObject, target: usize, total: usize) {
    println!("=== Dry Run Summary ===");
    println!("  Object:    {}", source.name);
    println!("  Vertices:  {}", source.mesh.vertex_count());
    println!("  Faces:     {}", source.mesh.face_count());
    println!("  Triangles: {target} / {total}");
}

/// Print what the decimation kept and what the transfer restored.
fn print_transfer_summary(outcome: &DecimateOutcome) {
    let report = &outcome.report;
    println!("=== Decimation ===");
    println!("  Object:        {}", outcome.object.name);
    println!(
        "  Triangles:     {} → {}",
        outcome.source_triangles, outcome.result_triangles
    );
    println!("  Mapped:        {} / {}", report.mapped, report.mapped + report.unmapped);
    println!("  Vertex groups: {}", report.vertex_groups);
    println!("  Shape keys:    {}", report.shape_keys);
    for (key, relative) in &report.unresolved_relatives {
        println!("  Relative key '{relative}' of '{key}' not found; using reference");
    }
}
