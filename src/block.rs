//! Chunked, append-only node storage (component A).
//!
//! Nodes live in a sequence of fixed-capacity [`NodeBlock`]s. A block is
//! never split, shrunk, or reordered; growth only ever appends whole new
//! blocks. Block `k` holds ids in `[k * NODEBLOCK_CAP, (k+1) * NODEBLOCK_CAP)`.

use crate::NodeId;

/// Capacity of a single node block. Power of two, per the source.
pub const NODEBLOCK_CAP: usize = 16_384;

/// A node record: a dense id plus an opaque payload.
///
/// Property storage is a host-collaborator concern (see crate docs); `T`
/// is whatever the caller wants to hang off a node.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub id: NodeId,
    pub payload: T,
}

#[derive(Debug)]
struct NodeBlock<T> {
    slots: Vec<Option<Node<T>>>,
}

impl<T> NodeBlock<T> {
    fn new() -> Self {
        NodeBlock {
            slots: Vec::with_capacity(NODEBLOCK_CAP),
        }
    }
}

/// The block-chain store itself.
#[derive(Debug)]
pub(crate) struct BlockStore<T> {
    blocks: Vec<NodeBlock<T>>,
    node_cap: usize,
}

fn locate(id: NodeId) -> (usize, usize) {
    (id / NODEBLOCK_CAP, id % NODEBLOCK_CAP)
}

impl<T> BlockStore<T> {
    /// Allocates blocks for at least `hint_n` slots.
    pub(crate) fn new(hint_n: usize) -> Self {
        assert!(hint_n > 0, "hint_n must be positive");
        let block_count = ((hint_n + NODEBLOCK_CAP - 1) / NODEBLOCK_CAP).max(1);
        let mut blocks = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            blocks.push(NodeBlock::new());
        }
        BlockStore {
            node_cap: block_count * NODEBLOCK_CAP,
            blocks,
        }
    }

    pub(crate) fn node_cap(&self) -> usize {
        self.node_cap
    }

    /// Guarantees at least `node_count + extra` slots exist.
    ///
    /// Growth policy (matches the source, including its conservative
    /// `+2` slack): `need = (node_count + extra) / current_cap + 2`,
    /// multiply the block count by `need`, append the new blocks.
    pub(crate) fn ensure_capacity(&mut self, node_count: usize, extra: usize) {
        let total = node_count + extra;
        if total <= self.node_cap {
            return;
        }
        let need = total / self.node_cap + 2;
        let new_block_count = self.blocks.len() * need;
        self.blocks.reserve(new_block_count - self.blocks.len());
        while self.blocks.len() < new_block_count {
            self.blocks.push(NodeBlock::new());
        }
        self.node_cap = new_block_count * NODEBLOCK_CAP;
    }

    fn block_slot(&self, id: NodeId) -> &Option<Node<T>> {
        let (block_idx, within) = locate(id);
        &self.blocks[block_idx].slots[within]
    }

    /// Returns a stable reference into the slot for `id`.
    ///
    /// Panics (precondition violation, per the store's error model) if
    /// the slot has never been assigned.
    pub(crate) fn get(&self, id: NodeId) -> &Node<T> {
        self.block_slot(id)
            .as_ref()
            .unwrap_or_else(|| panic!("node {id} was never assigned"))
    }

    /// Assigns `payload` to the slot for `id`, growing the block's
    /// internal slot vector on first write as needed.
    pub(crate) fn place(&mut self, id: NodeId, payload: T) {
        let (block_idx, within) = locate(id);
        let block = &mut self.blocks[block_idx];
        if block.slots.len() <= within {
            block.slots.resize_with(within + 1, || None);
        }
        block.slots[within] = Some(Node { id, payload });
    }

    /// Removes and returns the payload at `id`, leaving the slot empty.
    pub(crate) fn take_payload(&mut self, id: NodeId) -> T {
        let (block_idx, within) = locate(id);
        self.blocks[block_idx].slots[within]
            .take()
            .unwrap_or_else(|| panic!("node {id} was never assigned"))
            .payload
    }
}
