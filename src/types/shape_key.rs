use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{DecimateError, Result};

use super::VertexGroups;

/// Interpolation mode of a shape key when used as an absolute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Cardinal,
    CatmullRom,
    BSpline,
}

/// The key a shape key's offsets are measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeKey {
    /// Index of the antecedent in the owning [`ShapeKeys`].
    Key(usize),
    /// The antecedent with this name did not exist when the link was made.
    /// Evaluates against the reference key.
    Unresolved(String),
}

impl Default for RelativeKey {
    fn default() -> Self {
        RelativeKey::Key(0)
    }
}

impl RelativeKey {
    /// Index to evaluate against. Unresolved links fall back to the reference key.
    pub fn index(&self) -> usize {
        match self {
            RelativeKey::Key(i) => *i,
            RelativeKey::Unresolved(_) => 0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, RelativeKey::Key(_))
    }
}

/// A named full-mesh position override with its slider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub slider_min: f32,
    #[serde(default = "default_slider_max")]
    pub slider_max: f32,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Vertex group that scales this key's influence per vertex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_group: Option<String>,
    #[serde(default)]
    pub relative: RelativeKey,
}

fn default_slider_max() -> f32 {
    1.0
}

impl ShapeKey {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            value: 0.0,
            slider_min: 0.0,
            slider_max: default_slider_max(),
            mute: false,
            interpolation: Interpolation::Linear,
            vertex_group: None,
            relative: RelativeKey::default(),
        }
    }

    /// Copy the scalar metadata (everything except name, positions and relative link).
    pub fn copy_settings_from(&mut self, other: &ShapeKey) {
        self.value = other.value;
        self.slider_min = other.slider_min;
        self.slider_max = other.slider_max;
        self.mute = other.mute;
        self.interpolation = other.interpolation;
        self.vertex_group = other.vertex_group.clone();
    }
}

/// Ordered shape-key set. Index 0 is always the reference (basis) key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKeys {
    keys: Vec<ShapeKey>,
    #[serde(default)]
    pub active_index: usize,
}

impl ShapeKeys {
    /// Start a key set with its reference key.
    pub fn new(reference_name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            keys: vec![ShapeKey::new(reference_name, positions)],
            active_index: 0,
        }
    }

    pub fn reference(&self) -> &ShapeKey {
        &self.keys[0]
    }

    /// Append a key initialised to the reference shape and relative to it.
    pub fn add(&mut self, name: impl Into<String>) -> &mut ShapeKey {
        let positions = self.keys[0].positions.clone();
        self.keys.push(ShapeKey::new(name, positions));
        let last = self.keys.len() - 1;
        &mut self.keys[last]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false for a constructed set; the reference key cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShapeKey> {
        self.keys.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ShapeKey> {
        self.keys.get_mut(index)
    }

    /// Index of the first key with this name.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShapeKey> {
        self.keys.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ShapeKey> {
        self.keys.iter_mut()
    }

    /// Name of the key `index` is relative to, if that link is known.
    pub fn relative_name(&self, index: usize) -> Option<&str> {
        match &self.keys.get(index)?.relative {
            RelativeKey::Key(i) => self.keys.get(*i).map(|k| k.name.as_str()),
            RelativeKey::Unresolved(name) => Some(name.as_str()),
        }
    }

    /// Blend every unmuted key onto the reference shape.
    ///
    /// Each key contributes `value * group_weight * (key - relative_key)`.
    pub fn evaluate(&self, groups: &VertexGroups) -> Vec<Vec3> {
        let mut out = self.keys[0].positions.clone();

        for key in self.keys.iter().skip(1) {
            if key.mute || key.value == 0.0 {
                continue;
            }
            let basis = self
                .keys
                .get(key.relative.index())
                .unwrap_or(&self.keys[0]);

            for (v, pos) in out.iter_mut().enumerate() {
                let factor = match &key.vertex_group {
                    Some(group) => key.value * groups.weight(group, v as u32),
                    None => key.value,
                };
                *pos += (key.positions[v] - basis.positions[v]) * factor;
            }
        }

        out
    }

    /// Check that the set is non-empty, sized for `vertex_count`, with in-range links.
    pub fn validate(&self, vertex_count: usize) -> Result<()> {
        if self.keys.is_empty() {
            return Err(DecimateError::Validation(
                "shape key set has no reference key".into(),
            ));
        }
        for key in &self.keys {
            if key.positions.len() != vertex_count {
                return Err(DecimateError::Validation(format!(
                    "shape key '{}' has {} positions for {vertex_count} vertices",
                    key.name,
                    key.positions.len()
                )));
            }
            if let RelativeKey::Key(i) = key.relative {
                if i >= self.keys.len() {
                    return Err(DecimateError::Validation(format!(
                        "shape key '{}' is relative to missing key {i}",
                        key.name
                    )));
                }
            }
        }
        Ok(())
    }
}
