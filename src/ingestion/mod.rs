pub mod obj_loader;
pub mod scene_json;

use std::path::Path;

use tracing::{debug, info};

use crate::error::{DecimateError, Result};
use crate::types::Scene;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Obj,
    Json,
}

impl InputFormat {
    /// Detect format from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "obj" => Ok(InputFormat::Obj),
            "json" => Ok(InputFormat::Json),
            _ => Err(DecimateError::Input(format!(
                "Unsupported file format: .{ext}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Obj => "OBJ",
            InputFormat::Json => "scene JSON",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load the input file into a scene.
pub fn load_scene(path: &Path) -> Result<Scene> {
    if !path.exists() {
        return Err(DecimateError::Input(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    let format = InputFormat::from_path(path)?;
    info!(format = %format, path = %path.display(), "Detected input format");

    let scene = match format {
        InputFormat::Obj => Scene {
            objects: obj_loader::load_obj(path)?,
        },
        InputFormat::Json => scene_json::load_scene_json(path)?,
    };

    debug!(
        objects = scene.objects.len(),
        vertices = scene.objects.iter().map(|o| o.mesh.vertex_count()).sum::<usize>(),
        triangles = scene.objects.iter().map(|o| o.mesh.triangle_count()).sum::<usize>(),
        "Ingestion stats"
    );

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_obj() {
        assert_eq!(
            InputFormat::from_path(Path::new("model.obj")).unwrap(),
            InputFormat::Obj
        );
    }

    #[test]
    fn format_detection_json() {
        assert_eq!(
            InputFormat::from_path(Path::new("scene.json")).unwrap(),
            InputFormat::Json
        );
    }

    #[test]
    fn format_detection_case_insensitive() {
        assert_eq!(
            InputFormat::from_path(Path::new("Model.OBJ")).unwrap(),
            InputFormat::Obj
        );
        assert_eq!(
            InputFormat::from_path(Path::new("Scene.Json")).unwrap(),
            InputFormat::Json
        );
    }

    #[test]
    fn format_detection_unsupported() {
        assert!(InputFormat::from_path(Path::new("file.fbx")).is_err());
        assert!(InputFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = load_scene(Path::new("/nonexistent/file.obj")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
