use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::{DecimateError, Result};
use crate::types::Scene;

/// Load a scene written by [`crate::export::write_scene`] (or by hand).
pub fn load_scene_json(path: &Path) -> Result<Scene> {
    let file = File::open(path)
        .map_err(|e| DecimateError::Input(format!("Failed to open scene: {e}")))?;
    let scene: Scene = serde_json::from_reader(BufReader::new(file))?;

    for object in &scene.objects {
        object.mesh.validate().map_err(|e| {
            DecimateError::Input(format!("object '{}': {e}", object.name))
        })?;
    }

    debug!(objects = scene.objects.len(), "Loaded scene JSON");
    Ok(scene)
}
