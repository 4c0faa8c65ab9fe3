use std::collections::HashMap;

use tracing::debug;

use crate::types::{Mesh, RelativeKey, ShapeKeys};

use super::VertexMap;

/// What the shape-key pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeKeyTransfer {
    /// Keys written, including the reference key.
    pub keys: usize,
    /// `(key, missing antecedent)` for links that fell back to the reference key.
    pub unresolved: Vec<(String, String)>,
}

/// Rebuild the target's shape keys from the source through `map`.
///
/// Returns `None` (and leaves the target alone) when the source has no keys.
/// Otherwise the target's keys are replaced: the reference key is rebuilt
/// under the source reference name, then every other source key is recreated
/// in source order. Every key, the reference included, takes the source
/// vertex's position at mapped vertices. Unmapped vertices sit at the target's
/// current position in every key.
///
/// Relative links are resolved by name against the keys created so far. A key
/// listed before its antecedent keeps an [`RelativeKey::Unresolved`] link.
pub fn transfer_shape_keys(
    source: &Mesh,
    target: &mut Mesh,
    map: &VertexMap,
) -> Option<ShapeKeyTransfer> {
    let src_keys = source.shape_keys.as_ref()?;
    let src_ref = src_keys.reference();

    let mut reference = target.positions.clone();
    for (t, s) in map.pairs() {
        reference[t as usize] = src_ref.positions[s as usize];
    }
    let mut keys = ShapeKeys::new(src_ref.name.clone(), reference);
    let mut created: HashMap<&str, usize> = HashMap::new();
    created.insert(src_ref.name.as_str(), 0);
    let mut unresolved = Vec::new();

    for (si, src_key) in src_keys.iter().enumerate().skip(1) {
        let index = keys.len();
        created.insert(src_key.name.as_str(), index);

        let relative = match src_keys.relative_name(si) {
            Some(name) => match created.get(name) {
                Some(&ri) => RelativeKey::Key(ri),
                None => {
                    debug!(
                        key = %src_key.name,
                        relative = name,
                        "Relative shape key not created yet; falling back to reference"
                    );
                    unresolved.push((src_key.name.clone(), name.to_string()));
                    RelativeKey::Unresolved(name.to_string())
                }
            },
            None => RelativeKey::Key(0),
        };

        let new_key = keys.add(src_key.name.clone());
        for (t, s) in map.pairs() {
            new_key.positions[t as usize] = src_key.positions[s as usize];
        }
        new_key.copy_settings_from(src_key);
        new_key.relative = relative;
    }

    keys.active_index = src_keys.active_index.min(keys.len() - 1);
    let written = keys.len();
    target.shape_keys = Some(keys);

    Some(ShapeKeyTransfer {
        keys: written,
        unresolved,
    })
}
