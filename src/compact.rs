//! Batch node deletion: the swap-down compaction algorithm (component E).
//!
//! Given a strictly-ascending list of ids to delete, the highest
//! surviving ids are relocated down into the freed low positions so that
//! afterwards the live ids are exactly `[0, node_count_new)`.

use crate::block::BlockStore;
use crate::matrix::BoolMatrix;
use crate::pool::MatrixPool;
use crate::NodeId;

/// Runs the swap-down algorithm and shrinks `node_count` by `sorted_ids.len()`.
///
/// `sorted_ids` must already be validated (strictly ascending, in range)
/// by the caller — this is an internal helper, not part of the public
/// contract surface.
pub(crate) fn delete_nodes<T, M: BoolMatrix>(
    blocks: &mut BlockStore<T>,
    pool: &MatrixPool<M>,
    node_count: &mut usize,
    sorted_ids: &[NodeId],
) {
    if sorted_ids.is_empty() {
        return;
    }

    let old_count = *node_count;
    let k = sorted_ids.len();
    let new_count = old_count - k;

    // `donor` is the highest surviving id that can fill a hole; it never
    // itself names a node scheduled for deletion once the skip loop below
    // runs. `last_del_idx` tracks the highest not-yet-consumed entry of
    // `sorted_ids`, used only to recognize when `donor` collides with a
    // deletion target.
    let mut donor = old_count - 1;
    let mut last_del_idx = k - 1;
    let mut largest_delete = sorted_ids[last_del_idx];

    let mut hole_idx = 0;
    while hole_idx < k && sorted_ids[hole_idx] < new_count {
        let hole = sorted_ids[hole_idx];

        while donor == largest_delete {
            donor -= 1;
            last_del_idx -= 1;
            largest_delete = sorted_ids[last_del_idx];
        }

        // Label reconciliation, then matrix row/column migration, then
        // the node record itself — matching the source's ordering.
        pool.reconcile_labels(donor, hole, old_count);
        pool.migrate_adjacency_and_relations(donor, hole, old_count);
        let payload = blocks.take_payload(donor);
        blocks.place(hole, payload);

        hole_idx += 1;
        if hole_idx >= k {
            break;
        }
        donor -= 1;
    }

    *node_count = new_count;
    pool.truncate_all(new_count);
}
