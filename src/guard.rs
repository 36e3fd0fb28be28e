//! The critical-section guard (component F).
//!
//! A single mutex serializing matrix-resize decisions. Not held during
//! matrix reads or writes — only while deciding whether a resize is
//! needed and, if so, performing it. Concurrent callers that race through
//! [`ResizeGuard::resize_if_stale`] while a matrix is stale coalesce onto
//! a single resize; the others observe the already-updated dimension on
//! their own re-check.
//!
//! A future design may shard this per matrix instead of sharing one lock
//! across the whole pool; that is an acknowledged simplification carried
//! over from the source, not a correctness requirement.

use std::sync::{Mutex, RwLock};

use crate::matrix::BoolMatrix;

pub(crate) struct ResizeGuard {
    lock: Mutex<()>,
}

impl ResizeGuard {
    pub(crate) fn new() -> Self {
        ResizeGuard {
            lock: Mutex::new(()),
        }
    }

    /// Double-checked resize: read the dimension; if it disagrees with
    /// `node_count`, enter the critical section, re-read, and resize
    /// only if still stale.
    pub(crate) fn resize_if_stale<M: BoolMatrix>(&self, matrix: &RwLock<M>, node_count: usize) {
        if matrix.read().unwrap().rows() == node_count {
            return;
        }
        let _token = self.lock.lock().unwrap();
        let mut guard = matrix.write().unwrap();
        if guard.rows() != node_count {
            guard.resize(node_count, node_count);
        }
    }
}
