//! Error kinds for the small number of fallible internal primitives.
//!
//! The public façade never returns [`GraphError`]: every precondition
//! violation or backend failure is a fatal programmer error, per the
//! store's error handling design. These helpers exist so a panic carries a
//! structured, formatted message instead of an ad-hoc string, and so a
//! future fallible matrix backend has somewhere to report into.

use thiserror::Error;

/// Two kinds of failure the core can, in principle, produce: a caller
/// supplied a bad id/index, or the matrix backend reported a non-success
/// result. Both are treated as fatal today (see module docs).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("matrix backend failure: {0}")]
    MatrixBackendFailure(String),
}

pub(crate) fn assert_valid_node(id: crate::NodeId, node_count: usize) {
    if id >= node_count {
        panic!(
            "{}",
            GraphError::InvalidArgument(format!(
                "node id {id} out of range, node_count = {node_count}"
            ))
        );
    }
}

pub(crate) fn assert_valid_relation(r: usize, relation_count: usize) {
    if r >= relation_count {
        panic!(
            "{}",
            GraphError::InvalidArgument(format!(
                "relation index {r} out of range, relation_count = {relation_count}"
            ))
        );
    }
}

pub(crate) fn assert_valid_label(l: usize, label_count: usize) {
    if l >= label_count {
        panic!(
            "{}",
            GraphError::InvalidArgument(format!(
                "label index {l} out of range, label_count = {label_count}"
            ))
        );
    }
}

pub(crate) fn assert_sorted_distinct(ids: &[crate::NodeId]) {
    for pair in ids.windows(2) {
        if pair[0] >= pair[1] {
            panic!(
                "{}",
                GraphError::InvalidArgument(format!(
                    "delete_nodes requires a strictly-ascending id list, got {} before {}",
                    pair[0], pair[1]
                ))
            );
        }
    }
}
