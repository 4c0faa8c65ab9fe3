use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{DecimateError, Result};
use crate::types::Scene;

/// Write the scene as pretty-printed JSON, creating parent directories.
pub fn write_scene(scene: &Scene, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            DecimateError::Output(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }

    let json_string = serde_json::to_string_pretty(scene)?;
    fs::write(path, &json_string)?;

    info!(
        objects = scene.objects.len(),
        path = %path.display(),
        "Wrote scene"
    );

    Ok(())
}
