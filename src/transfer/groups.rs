use crate::types::VertexGroups;

use super::VertexMap;

/// Rebuild the target's vertex groups from the source through `map`.
///
/// Existing target groups are dropped. Each source group gets a same-named
/// target group; a mapped target vertex receives its source vertex's weight
/// when that weight is present and nonzero. Weights are assigned, never summed,
/// so targets sharing one source vertex each get the same value.
///
/// Returns the number of groups written.
pub fn transfer_vertex_groups(
    source: &VertexGroups,
    target: &mut VertexGroups,
    map: &VertexMap,
) -> usize {
    target.clear();

    for src_group in source.iter() {
        let dst_group = target.new_group(&src_group.name);
        for (t, s) in map.pairs() {
            let weight = src_group.weight(s).unwrap_or(0.0);
            if weight > 0.0 {
                dst_group.set_weight(t, weight);
            }
        }
    }

    target.len()
}
