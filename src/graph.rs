//! The public graph façade (component D): create/label/connect/delete
//! nodes and edges, matrix handle access, pending-op flush, teardown.

use crate::block::BlockStore;
use crate::compact;
use crate::error::{assert_sorted_distinct, assert_valid_label, assert_valid_node, assert_valid_relation};
use crate::matrix::{BoolMatrix, RowMajorBoolMatrix};
use crate::node_iter::NodeIter;
use crate::pool::MatrixPool;
use crate::{LabelIndex, NodeId, RelationIndex, NO_LABEL, NO_RELATION};

/// A mutable labeled property-graph store over sparse boolean matrices.
///
/// `T` is the opaque per-node payload (property storage is a host
/// concern, out of scope here; `T` defaults to `()`). `M` is the backing
/// [`BoolMatrix`] implementation, defaulting to [`RowMajorBoolMatrix`].
pub struct Graph<T = (), M: BoolMatrix = RowMajorBoolMatrix> {
    blocks: BlockStore<T>,
    pool: MatrixPool<M>,
    node_count: usize,
}

impl<T: Default, M: BoolMatrix> Graph<T, M> {
    /// Allocates blocks for at least `hint_n` slots and an adjacency
    /// matrix of that size. `hint_n` must be positive.
    pub fn new(hint_n: usize) -> Self {
        assert!(hint_n > 0, "hint_n must be positive");
        let blocks = BlockStore::new(hint_n);
        let pool = MatrixPool::new(blocks.node_cap());
        Graph {
            blocks,
            pool,
            node_count: 0,
        }
    }

    /// Allocates ids `[old_count, old_count + n)`. If `labels` is given,
    /// it must have length `n`; each entry is either a valid label index
    /// or [`NO_LABEL`]. Returns an iterator over the new ids.
    pub fn create_nodes(&mut self, n: usize, labels: Option<&[LabelIndex]>) -> NodeIter<'_, T> {
        if let Some(labels) = labels {
            assert_eq!(labels.len(), n, "labels length must equal n");
        }

        self.blocks.ensure_capacity(self.node_count, n);
        let start = self.node_count;
        for i in 0..n {
            self.blocks.place(start + i, T::default());
        }
        self.node_count += n;
        self.ensure_adjacency_sized();

        if let Some(labels) = labels {
            for (i, &label) in labels.iter().enumerate() {
                if label != NO_LABEL {
                    assert_valid_label(label as usize, self.pool.label_count());
                    self.pool.set_label_diagonal(label as usize, start + i, self.node_count);
                }
            }
        }

        NodeIter::new(&self.blocks, start, self.node_count, 1)
    }
}

impl<T, M: BoolMatrix> Graph<T, M> {
    fn ensure_adjacency_sized(&self) {
        // Force the adjacency matrix to track node_count eagerly, the
        // way the source does right after bumping it; relation and
        // label matrices stay lazily resized until next accessed.
        self.pool.touch_adjacency(self.node_count);
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Sets `adjacency[dest, src] = 1` (and, if typed, the matching
    /// relation entry) for every `(src, dest, rel)` triple.
    pub fn connect_nodes(&mut self, triples: &[(NodeId, NodeId, RelationIndex)]) {
        for &(src, dest, rel) in triples {
            assert_valid_node(src, self.node_count);
            assert_valid_node(dest, self.node_count);
            self.pool.set_adjacency(dest, src, true, self.node_count);
            if rel != NO_RELATION {
                assert_valid_relation(rel as usize, self.pool.relation_count());
                self.pool.set_relation(rel as usize, dest, src, true, self.node_count);
            }
        }
    }

    /// A stable reference to the node slot for `id`.
    pub fn get_node(&self, id: NodeId) -> &crate::block::Node<T> {
        assert_valid_node(id, self.node_count);
        self.blocks.get(id)
    }

    /// Sets `labels[label][i, i] = 1` for `i` in `[start, end]`.
    pub fn label_nodes(&mut self, start: NodeId, end: NodeId, label: LabelIndex) -> NodeIter<'_, T> {
        assert!(start <= end, "label_nodes requires start <= end");
        assert_valid_node(end, self.node_count);
        assert_valid_label(label as usize, self.pool.label_count());
        for id in start..=end {
            self.pool.set_label_diagonal(label as usize, id, self.node_count);
        }
        NodeIter::new(&self.blocks, start, end + 1, 1)
    }

    /// Deletes edges from `src` to `dest`. `rel = NO_RELATION` deletes
    /// every edge `src -> dest`, regardless of type; otherwise only the
    /// edge of that relation is removed, and the adjacency bit is
    /// cleared too if no other relation still connects the pair.
    pub fn delete_edge(&mut self, src: NodeId, dest: NodeId, rel: RelationIndex) {
        assert_valid_node(src, self.node_count);
        assert_valid_node(dest, self.node_count);

        if !self.pool.get_adjacency(dest, src, self.node_count) {
            return;
        }

        if rel == NO_RELATION {
            self.pool.clear_adjacency_entry(dest, src, self.node_count);
            for r in 0..self.pool.relation_count() {
                if self.pool.get_relation(r, dest, src, self.node_count) {
                    self.pool.clear_relation_entry(r, dest, src, self.node_count);
                }
            }
        } else {
            let r = rel as usize;
            assert_valid_relation(r, self.pool.relation_count());
            if !self.pool.get_relation(r, dest, src, self.node_count) {
                return;
            }
            self.pool.clear_relation_entry(r, dest, src, self.node_count);

            let still_connected = (0..self.pool.relation_count())
                .any(|i| self.pool.get_relation(i, dest, src, self.node_count));
            if !still_connected {
                self.pool.clear_adjacency_entry(dest, src, self.node_count);
            }
        }
    }

    /// Deletes a batch of nodes, compacting ids so that the survivors
    /// remain exactly `[0, node_count - sorted_ids.len())`. `sorted_ids`
    /// must be strictly ascending and in range.
    pub fn delete_nodes(&mut self, sorted_ids: &[NodeId]) {
        assert_sorted_distinct(sorted_ids);
        if let Some(&last) = sorted_ids.last() {
            assert_valid_node(last, self.node_count);
        }
        compact::delete_nodes(&mut self.blocks, &self.pool, &mut self.node_count, sorted_ids);
    }

    /// Allocates a new empty relation matrix and returns its index.
    pub fn add_relation(&self) -> RelationIndex {
        self.pool.add_relation(self.blocks.node_cap())
    }

    /// Allocates a new empty label matrix and returns its index.
    pub fn add_label(&self) -> LabelIndex {
        self.pool.add_label(self.blocks.node_cap())
    }

    /// Iterates every live node, in ascending id order.
    pub fn scan_nodes(&self) -> NodeIter<'_, T> {
        NodeIter::new(&self.blocks, 0, self.node_count, 1)
    }

    /// Forces the matrix backend to materialize any deferred operations.
    pub fn commit_pending(&self) {
        self.pool.commit_pending(self.node_count);
    }

    /// Releases all blocks, matrices, and the guard.
    pub fn free(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type G = Graph<()>;

    #[test]
    fn create_and_connect() {
        let mut g: G = Graph::new(16);
        g.create_nodes(3, Some(&[NO_LABEL, NO_LABEL, NO_LABEL]));
        g.connect_nodes(&[(0, 1, NO_RELATION), (1, 2, NO_RELATION)]);
        assert!(g.pool.get_adjacency(1, 0, g.node_count));
        assert!(g.pool.get_adjacency(2, 1, g.node_count));
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn typed_edges_and_partial_delete() {
        let mut g: G = Graph::new(16);
        g.create_nodes(3, None);
        let r0 = g.add_relation();
        let r1 = g.add_relation();
        assert_eq!(r0, 0);
        assert_eq!(r1, 1);
        g.connect_nodes(&[(0, 1, r0), (0, 1, r1)]);
        assert!(g.pool.get_adjacency(1, 0, g.node_count));
        assert!(g.pool.get_relation(0, 1, 0, g.node_count));
        assert!(g.pool.get_relation(1, 1, 0, g.node_count));

        g.delete_edge(0, 1, r0);
        assert!(g.pool.get_adjacency(1, 0, g.node_count), "relation 1 still holds");

        g.delete_edge(0, 1, r1);
        assert!(!g.pool.get_adjacency(1, 0, g.node_count));
    }

    #[test]
    fn untyped_delete_clears_every_relation() {
        let mut g: G = Graph::new(16);
        g.create_nodes(3, None);
        let r0 = g.add_relation();
        let r1 = g.add_relation();
        g.connect_nodes(&[(0, 1, r0), (0, 1, r1)]);

        g.delete_edge(0, 1, NO_RELATION);

        assert!(!g.pool.get_adjacency(1, 0, g.node_count));
        assert!(!g.pool.get_relation(0, 1, 0, g.node_count));
        assert!(!g.pool.get_relation(1, 1, 0, g.node_count));
    }

    #[test]
    fn compaction_renames_surviving_edge_endpoints() {
        let mut g: G = Graph::new(16);
        g.create_nodes(5, None);
        g.connect_nodes(&[(0, 4, NO_RELATION), (4, 2, NO_RELATION)]);
        g.delete_nodes(&[1, 2]);
        assert_eq!(g.node_count(), 3);
        // node originally at 4 now lives at id 1, pulling its incoming
        // edge from 0 along with it: 0 -> 4 becomes 0 -> 1.
        assert!(g.pool.get_adjacency(1, 0, g.node_count));
        // its outgoing edge to (deleted) node 2 vanishes; no other
        // entries survive.
        let total: usize = (0..3)
            .flat_map(|d| (0..3).map(move |s| (d, s)))
            .filter(|&(d, s)| g.pool.get_adjacency(d, s, g.node_count))
            .count();
        assert_eq!(total, 1);
    }

    #[test]
    fn label_inheritance_on_delete() {
        let mut g: G = Graph::new(16);
        g.create_nodes(2, None);
        let label_a = g.add_label();
        let label_b = g.add_label();
        g.label_nodes(0, 0, label_a);
        g.label_nodes(1, 1, label_b);

        g.delete_nodes(&[0]);

        assert_eq!(g.node_count(), 1);
        // the donor (former id 1, label B) now occupies id 0.
        assert!(!g.pool.label_diagonal(label_a as usize, 0, g.node_count));
        assert!(g.pool.label_diagonal(label_b as usize, 0, g.node_count));
    }

    #[test]
    fn adjacency_resize_tracks_node_count_lazily() {
        let mut g: G = Graph::new(16);
        g.create_nodes(100, None);
        assert_eq!(g.pool.adjacency_dims(g.node_count), (100, 100));
        g.create_nodes(100, None);
        assert_eq!(g.node_count(), 200);
        assert_eq!(g.pool.adjacency_dims(g.node_count), (200, 200));
    }

    #[test]
    fn scan_nodes_yields_ascending_ids() {
        let mut g: G = Graph::new(16);
        g.create_nodes(5, None);
        let ids: Vec<NodeId> = g.scan_nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn get_node_out_of_range_panics() {
        let g: G = Graph::new(16);
        g.get_node(0);
    }

    #[test]
    fn connect_then_delete_edge_restores_prior_matrix_state() {
        // spec.md §8 round-trip law: connect_nodes([(s,d,r)]) followed by
        // delete_edge(s,d,r) restores matrices to their prior contents.
        let mut g: G = Graph::new(16);
        g.create_nodes(5, None);
        let r = g.add_relation();
        g.connect_nodes(&[(0, 4, NO_RELATION), (4, 2, r)]);

        let before = g.pool.adjacency_snapshot(g.node_count);

        g.connect_nodes(&[(1, 3, r)]);
        g.delete_edge(1, 3, r);

        let after = g.pool.adjacency_snapshot(g.node_count);
        assert_eq!(before, after);
        assert!(!g.pool.get_relation(r as usize, 3, 1, g.node_count));
    }

    proptest::proptest! {
        /// spec.md §8 property 1: after any sequence of public mutations,
        /// every matrix the graph owns has rows == cols >= node_count once
        /// touched (and, by construction of the lazy-resize accessors,
        /// exactly == node_count — a matrix can never expose an entry
        /// outside `[0, node_count)^2`).
        #[test]
        fn every_matrix_tracks_node_count_through_random_mutations(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut g: G = Graph::new(4);
            let r = g.add_relation();
            let l = g.add_label();
            for op in ops {
                apply_op(&mut g, &op, r, l);
                let n = g.node_count();
                proptest::prop_assert_eq!(g.pool.adjacency_dims(n), (n, n));
                proptest::prop_assert_eq!(g.pool.relation_dims(r as usize, n), (n, n));
                proptest::prop_assert_eq!(g.pool.label_dims(l as usize, n), (n, n));
            }
        }

        /// spec.md §8 property 2: for every relation `r` and every `(d,s)`,
        /// if `relations[r](d,s) = 1` then `adjacency(d,s) = 1`.
        #[test]
        fn relation_entries_always_imply_adjacency(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut g: G = Graph::new(4);
            let r = g.add_relation();
            let l = g.add_label();
            for op in ops {
                apply_op(&mut g, &op, r, l);
            }
            let n = g.node_count();
            for d in 0..n {
                for s in 0..n {
                    if g.pool.get_relation(r as usize, d, s, n) {
                        proptest::prop_assert!(g.pool.get_adjacency(d, s, n));
                    }
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Create(usize),
        Connect(usize, usize, bool),
        Label(usize, usize),
        DeleteEdge(usize, usize, bool),
        DeleteTail(usize),
    }

    fn op_strategy() -> impl proptest::strategy::Strategy<Value = Op> {
        use proptest::prelude::*;
        prop_oneof![
            (1usize..5).prop_map(Op::Create),
            (0usize..20, 0usize..20, any::<bool>()).prop_map(|(a, b, c)| Op::Connect(a, b, c)),
            (0usize..20, 0usize..20).prop_map(|(a, b)| Op::Label(a, b)),
            (0usize..20, 0usize..20, any::<bool>()).prop_map(|(a, b, c)| Op::DeleteEdge(a, b, c)),
            (0usize..4).prop_map(Op::DeleteTail),
        ]
    }

    /// Applies `op` to `g`, remapping every generated index modulo the
    /// graph's current `node_count` so the op is always a valid mutation —
    /// this is a fuzzer for the invariants, not for the panicking
    /// precondition checks.
    fn apply_op(g: &mut G, op: &Op, r: RelationIndex, l: LabelIndex) {
        let n = g.node_count();
        match *op {
            Op::Create(count) => {
                g.create_nodes(count, None);
            }
            Op::Connect(a, b, typed) if n > 0 => {
                let src = a % n;
                let dest = b % n;
                let rel = if typed { r } else { NO_RELATION };
                g.connect_nodes(&[(src, dest, rel)]);
            }
            Op::Label(a, b) if n > 0 => {
                let start = a % n;
                let end = (start + (b % n)).min(n - 1);
                g.label_nodes(start, end, l);
            }
            Op::DeleteEdge(a, b, typed) if n > 0 => {
                let src = a % n;
                let dest = b % n;
                let rel = if typed { r } else { NO_RELATION };
                g.delete_edge(src, dest, rel);
            }
            Op::DeleteTail(k) if n > 0 => {
                let k = k.min(n);
                let sorted: Vec<NodeId> = (n - k..n).collect();
                g.delete_nodes(&sorted);
            }
            _ => {}
        }
    }
}
