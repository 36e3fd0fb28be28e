//! Owns the adjacency matrix, the per-relation matrices, and the
//! per-label matrices, and applies the lazy double-checked resize policy
//! to all three (component C).
//!
//! Every matrix uses the convention entry `(dest, src)`: rows are
//! destinations, columns are sources. Handle collections (relations,
//! labels) grow geometrically, four slots at a time, matching the
//! source's `relation_cap`/`label_cap` bookkeeping.

use std::sync::RwLock;

use crate::guard::ResizeGuard;
use crate::matrix::{clear_single_entry, BoolMatrix};
use crate::{LabelIndex, NodeId, RelationIndex, GRAPH_DEFAULT_LABEL_CAP, GRAPH_DEFAULT_RELATION_CAP};

pub(crate) struct MatrixPool<M: BoolMatrix> {
    adjacency: RwLock<M>,
    relations: RwLock<Vec<RwLock<M>>>,
    labels: RwLock<Vec<RwLock<M>>>,
    guard: ResizeGuard,
}

impl<M: BoolMatrix> MatrixPool<M> {
    pub(crate) fn new(node_cap: usize) -> Self {
        MatrixPool {
            adjacency: RwLock::new(M::new(node_cap, node_cap)),
            relations: RwLock::new(Vec::with_capacity(GRAPH_DEFAULT_RELATION_CAP)),
            labels: RwLock::new(Vec::with_capacity(GRAPH_DEFAULT_LABEL_CAP)),
            guard: ResizeGuard::new(),
        }
    }

    pub(crate) fn relation_count(&self) -> usize {
        self.relations.read().unwrap().len()
    }

    pub(crate) fn label_count(&self) -> usize {
        self.labels.read().unwrap().len()
    }

    pub(crate) fn add_relation(&self, node_cap: usize) -> RelationIndex {
        let mut relations = self.relations.write().unwrap();
        relations.push(RwLock::new(M::new(node_cap, node_cap)));
        (relations.len() - 1) as RelationIndex
    }

    pub(crate) fn add_label(&self, node_cap: usize) -> LabelIndex {
        let mut labels = self.labels.write().unwrap();
        labels.push(RwLock::new(M::new(node_cap, node_cap)));
        (labels.len() - 1) as LabelIndex
    }

    fn ensure_adjacency(&self, node_count: usize) {
        self.guard.resize_if_stale(&self.adjacency, node_count);
    }

    /// Forces the adjacency matrix's dimensions to track `node_count`
    /// without reading or writing any entry. Relation and label
    /// matrices are left lazily resized, matching the source's behavior
    /// of eagerly resizing only the adjacency matrix right after
    /// `node_count` changes.
    pub(crate) fn touch_adjacency(&self, node_count: usize) {
        self.ensure_adjacency(node_count);
    }

    fn ensure_relation(&self, r: usize, node_count: usize) {
        self.guard
            .resize_if_stale(&self.relations.read().unwrap()[r], node_count);
    }

    fn ensure_label(&self, l: usize, node_count: usize) {
        self.guard
            .resize_if_stale(&self.labels.read().unwrap()[l], node_count);
    }

    /// Forces every matrix owned by the pool to materialize its pending
    /// operations by querying nonzero counts, per the backend's
    /// deferred-execution model.
    pub(crate) fn commit_pending(&self, node_count: usize) {
        self.ensure_adjacency(node_count);
        let _ = self.adjacency.read().unwrap().nnz();
        for r in 0..self.relation_count() {
            self.ensure_relation(r, node_count);
            let _ = self.relations.read().unwrap()[r].read().unwrap().nnz();
        }
        for l in 0..self.label_count() {
            self.ensure_label(l, node_count);
            let _ = self.labels.read().unwrap()[l].read().unwrap().nnz();
        }
    }

    /// Forces every matrix to dimension `(new_count, new_count)`,
    /// restoring invariant 4 after a node-count change (used after
    /// batch deletion).
    pub(crate) fn truncate_all(&self, new_count: usize) {
        self.adjacency.write().unwrap().resize(new_count, new_count);
        for relation in self.relations.read().unwrap().iter() {
            relation.write().unwrap().resize(new_count, new_count);
        }
        for label in self.labels.read().unwrap().iter() {
            label.write().unwrap().resize(new_count, new_count);
        }
    }

    /// Current adjacency matrix dimensions after a lazy resize to
    /// `node_count`. Exposed so callers can assert on matrix dimensions
    /// directly instead of poking at entries.
    pub(crate) fn adjacency_dims(&self, node_count: usize) -> (usize, usize) {
        self.ensure_adjacency(node_count);
        let matrix = self.adjacency.read().unwrap();
        (matrix.rows(), matrix.cols())
    }

    /// Dimensions of relation matrix `r` after a lazy resize to `node_count`.
    pub(crate) fn relation_dims(&self, r: usize, node_count: usize) -> (usize, usize) {
        self.ensure_relation(r, node_count);
        let relations = self.relations.read().unwrap();
        let matrix = relations[r].read().unwrap();
        (matrix.rows(), matrix.cols())
    }

    /// Dimensions of label matrix `l` after a lazy resize to `node_count`.
    pub(crate) fn label_dims(&self, l: usize, node_count: usize) -> (usize, usize) {
        self.ensure_label(l, node_count);
        let labels = self.labels.read().unwrap();
        let matrix = labels[l].read().unwrap();
        (matrix.rows(), matrix.cols())
    }

    pub(crate) fn get_adjacency(&self, dest: NodeId, src: NodeId, node_count: usize) -> bool {
        self.ensure_adjacency(node_count);
        self.adjacency.read().unwrap().get(dest, src)
    }

    /// Every `(dest, src)` pair currently set in the adjacency matrix, for
    /// before/after comparisons in round-trip tests.
    pub(crate) fn adjacency_snapshot(&self, node_count: usize) -> Vec<(NodeId, NodeId)> {
        self.ensure_adjacency(node_count);
        let matrix = self.adjacency.read().unwrap();
        (0..node_count)
            .flat_map(|dest| (0..node_count).map(move |src| (dest, src)))
            .filter(|&(dest, src)| matrix.get(dest, src))
            .collect()
    }

    pub(crate) fn set_adjacency(&self, dest: NodeId, src: NodeId, value: bool, node_count: usize) {
        self.ensure_adjacency(node_count);
        self.adjacency.write().unwrap().set(dest, src, value);
    }

    pub(crate) fn clear_adjacency_entry(&self, dest: NodeId, src: NodeId, node_count: usize) {
        self.ensure_adjacency(node_count);
        let mut matrix = self.adjacency.write().unwrap();
        clear_single_entry(&mut *matrix, dest, src);
    }

    pub(crate) fn get_relation(&self, r: usize, dest: NodeId, src: NodeId, node_count: usize) -> bool {
        self.ensure_relation(r, node_count);
        self.relations.read().unwrap()[r].read().unwrap().get(dest, src)
    }

    pub(crate) fn set_relation(
        &self,
        r: usize,
        dest: NodeId,
        src: NodeId,
        value: bool,
        node_count: usize,
    ) {
        self.ensure_relation(r, node_count);
        self.relations.read().unwrap()[r]
            .write()
            .unwrap()
            .set(dest, src, value);
    }

    pub(crate) fn clear_relation_entry(&self, r: usize, dest: NodeId, src: NodeId, node_count: usize) {
        self.ensure_relation(r, node_count);
        let relations = self.relations.read().unwrap();
        let mut matrix = relations[r].write().unwrap();
        clear_single_entry(&mut *matrix, dest, src);
    }

    pub(crate) fn set_label_diagonal(&self, l: usize, id: NodeId, node_count: usize) {
        self.ensure_label(l, node_count);
        self.labels.read().unwrap()[l].write().unwrap().set(id, id, true);
    }

    pub(crate) fn label_diagonal(&self, l: usize, id: NodeId, node_count: usize) -> bool {
        self.ensure_label(l, node_count);
        self.labels.read().unwrap()[l].read().unwrap().get(id, id)
    }

    /// Row/column migration for one matrix: the donor's outgoing edges
    /// become `dest`'s outgoing edges, the donor's incoming edges become
    /// `dest`'s incoming edges, and a donor self-loop becomes a `dest`
    /// self-loop rather than splitting into `(donor, dest)`/`(dest, donor)`.
    ///
    /// Both vectors are captured before `dest`'s column is cleared, so
    /// ordering within one matrix never matters, per the compaction
    /// contract.
    fn migrate_one(matrix: &RwLock<M>, donor: NodeId, dest: NodeId) {
        let mut guard = matrix.write().unwrap();
        let mut outgoing = guard.extract_column(donor); // edges donor -> *
        let mut incoming = guard.extract_row(donor); // edges * -> donor
        if outgoing[donor] {
            outgoing[donor] = false;
            outgoing[dest] = true;
        }
        if incoming[donor] {
            incoming[donor] = false;
            incoming[dest] = true;
        }
        guard.clear_column(dest);
        guard.assign_column(dest, &outgoing);
        guard.assign_row(dest, &incoming);
    }

    pub(crate) fn migrate_adjacency_and_relations(&self, donor: NodeId, dest: NodeId, node_count: usize) {
        self.ensure_adjacency(node_count);
        Self::migrate_one(&self.adjacency, donor, dest);
        for r in 0..self.relation_count() {
            self.ensure_relation(r, node_count);
            Self::migrate_one(&self.relations.read().unwrap()[r], donor, dest);
        }
    }

    /// `dest` inherits `donor`'s label set: if the donor bore a label the
    /// destination didn't, set it; if the destination bore a label the
    /// donor didn't, clear it; otherwise leave it alone.
    pub(crate) fn reconcile_labels(&self, donor: NodeId, dest: NodeId, node_count: usize) {
        for l in 0..self.label_count() {
            let donor_has = self.label_diagonal(l, donor, node_count);
            let dest_has = self.label_diagonal(l, dest, node_count);
            if donor_has && !dest_has {
                self.labels.read().unwrap()[l].write().unwrap().set(dest, dest, true);
            } else if !donor_has && dest_has {
                self.labels.read().unwrap()[l].write().unwrap().clear_column(dest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::RowMajorBoolMatrix;

    #[test]
    fn add_relation_and_label_return_increasing_indices() {
        let pool: MatrixPool<RowMajorBoolMatrix> = MatrixPool::new(8);
        assert_eq!(pool.add_relation(8), 0);
        assert_eq!(pool.add_relation(8), 1);
        assert_eq!(pool.add_label(8), 0);
        assert_eq!(pool.add_label(8), 1);
        assert_eq!(pool.add_label(8), 2);
    }

    #[test]
    fn lazy_resize_matches_node_count_on_access() {
        let pool: MatrixPool<RowMajorBoolMatrix> = MatrixPool::new(8);
        pool.set_adjacency(2, 1, true, 8);
        assert!(pool.get_adjacency(2, 1, 8));
        pool.truncate_all(8);
    }

    #[test]
    fn migrate_moves_self_loop_to_destination_diagonal() {
        let pool: MatrixPool<RowMajorBoolMatrix> = MatrixPool::new(8);
        pool.set_adjacency(4, 4, true, 8); // self-loop at donor 4
        pool.migrate_adjacency_and_relations(4, 1, 8);
        assert!(pool.get_adjacency(1, 1, 8));
        assert!(!pool.get_adjacency(4, 1, 8));
        assert!(!pool.get_adjacency(1, 4, 8));
    }

    #[test]
    fn migrate_resizes_a_relation_matrix_left_stale_by_block_growth() {
        // A relation matrix is allocated at whatever node_cap held when
        // `add_relation` was called; if it's never touched through
        // `get_relation`/`set_relation` again, it stays that size even
        // after `node_count` grows well past it. Migration must resize it
        // itself rather than trust it's already the right shape.
        let pool: MatrixPool<RowMajorBoolMatrix> = MatrixPool::new(4);
        let r = pool.add_relation(4) as usize; // relation matrix starts 4x4
        pool.set_relation(r, 1, 0, true, 4);
        // node_count (and the adjacency matrix) grew to 8 while this
        // relation was never touched again through get/set_relation, so
        // it's still sized 4x4 here. Migrating a donor/dest pair beyond
        // that stale size must not panic.
        pool.migrate_adjacency_and_relations(6, 5, 8);
        assert!(pool.get_relation(r, 1, 0, 8)); // untouched edge survives
        assert!(!pool.get_relation(r, 5, 0, 8));
        assert!(!pool.get_relation(r, 6, 0, 8));
    }

    #[test]
    fn reconcile_labels_inherits_donor_label_set() {
        let pool: MatrixPool<RowMajorBoolMatrix> = MatrixPool::new(8);
        pool.add_label(8);
        pool.add_label(8);
        pool.set_label_diagonal(0, 1, 8); // donor has label 0
        pool.set_label_diagonal(1, 0, 8); // dest has label 1
        pool.reconcile_labels(1, 0, 8);
        assert!(pool.label_diagonal(0, 0, 8)); // inherited
        assert!(!pool.label_diagonal(1, 0, 8)); // cleared
    }
}
