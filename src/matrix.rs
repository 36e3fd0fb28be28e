//! The sparse boolean matrix abstraction the rest of the store is built on.
//!
//! `BoolMatrix` enumerates exactly the capabilities a GraphBLAS-style
//! backend needs to provide (create, resize, single-element get/set, nnz,
//! row/column extraction, row/column assignment, single-column clear). The
//! store depends only on this trait, never on a concrete backend, the same
//! way the original depends only on `GrB_Matrix`. [`RowMajorBoolMatrix`] is
//! the in-tree default, built on `fixedbitset::FixedBitSet`: one bitset per
//! row, rows are destinations and columns are sources, matching the
//! `(dest, src)` convention used throughout this crate.

use fixedbitset::FixedBitSet;

/// A square-growable sparse boolean matrix.
///
/// All coordinates are `(row, col)` with row = destination, col = source,
/// per this crate's adjacency convention. Implementations are expected to
/// be cheap to read/write for disjoint entries without external
/// synchronization; callers serialize structural resizes themselves (see
/// [`crate::pool::MatrixPool`]).
pub trait BoolMatrix: Send + Sync {
    /// Creates a new all-zero matrix of the given dimensions.
    fn new(rows: usize, cols: usize) -> Self;

    /// Current row dimension.
    fn rows(&self) -> usize;

    /// Current column dimension.
    fn cols(&self) -> usize;

    /// Resizes to exactly `rows x cols`, preserving entries that remain
    /// in range and dropping entries that fall outside it.
    fn resize(&mut self, rows: usize, cols: usize);

    /// Reads a single entry.
    fn get(&self, row: usize, col: usize) -> bool;

    /// Writes a single entry.
    fn set(&mut self, row: usize, col: usize, value: bool);

    /// Number of nonzero entries. Used both as a genuine count and, per
    /// the backing library's deferred-execution model, as a flush
    /// trigger: forcing a read of this property materializes any pending
    /// operations.
    fn nnz(&self) -> usize;

    /// Extracts row `row` as a dense boolean vector of length `cols()`.
    fn extract_row(&self, row: usize) -> Vec<bool>;

    /// Extracts column `col` as a dense boolean vector of length `rows()`.
    fn extract_column(&self, col: usize) -> Vec<bool>;

    /// Overwrites row `row` with `values` (length must equal `cols()`).
    fn assign_row(&mut self, row: usize, values: &[bool]);

    /// Overwrites column `col` with `values` (length must equal `rows()`).
    fn assign_column(&mut self, col: usize, values: &[bool]);

    /// Zeroes every entry in column `col`.
    fn clear_column(&mut self, col: usize);
}

/// Clears exactly one entry `(row, col)`, preserving every other entry.
///
/// Implemented the way the source does it: extract the column, zero the
/// one row position under a complemented mask (here, a plain index write
/// since we hold the vector in memory), write the column back. Any
/// backend that can do better (e.g. a direct `removeElement`) may
/// override this at the call site; the semantic is what matters.
pub(crate) fn clear_single_entry<M: BoolMatrix>(matrix: &mut M, row: usize, col: usize) {
    let mut column = matrix.extract_column(col);
    column[row] = false;
    matrix.assign_column(col, &column);
}

/// Default [`BoolMatrix`]: one [`FixedBitSet`] per row.
#[derive(Clone, Debug)]
pub struct RowMajorBoolMatrix {
    rows: Vec<FixedBitSet>,
    cols: usize,
}

impl RowMajorBoolMatrix {
    fn resized_bitset(bits: &FixedBitSet, new_len: usize) -> FixedBitSet {
        let mut out = FixedBitSet::with_capacity(new_len);
        for bit in bits.ones() {
            if bit >= new_len {
                break;
            }
            out.insert(bit);
        }
        out
    }
}

impl BoolMatrix for RowMajorBoolMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        RowMajorBoolMatrix {
            rows: (0..rows).map(|_| FixedBitSet::with_capacity(cols)).collect(),
            cols,
        }
    }

    fn rows(&self) -> usize {
        self.rows.len()
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn resize(&mut self, rows: usize, cols: usize) {
        if cols != self.cols {
            for row in &mut self.rows {
                *row = Self::resized_bitset(row, cols);
            }
            self.cols = cols;
        }
        if rows < self.rows.len() {
            self.rows.truncate(rows);
        } else if rows > self.rows.len() {
            self.rows
                .resize_with(rows, || FixedBitSet::with_capacity(cols));
        }
    }

    fn get(&self, row: usize, col: usize) -> bool {
        self.rows.get(row).is_some_and(|r| r.contains(col))
    }

    fn set(&mut self, row: usize, col: usize, value: bool) {
        self.rows[row].set(col, value);
    }

    fn nnz(&self) -> usize {
        self.rows.iter().map(FixedBitSet::count_ones_range_all).sum()
    }

    fn extract_row(&self, row: usize) -> Vec<bool> {
        let bits = &self.rows[row];
        (0..self.cols).map(|c| bits.contains(c)).collect()
    }

    fn extract_column(&self, col: usize) -> Vec<bool> {
        self.rows.iter().map(|r| r.contains(col)).collect()
    }

    fn assign_row(&mut self, row: usize, values: &[bool]) {
        debug_assert_eq!(values.len(), self.cols);
        let bits = &mut self.rows[row];
        for (c, &v) in values.iter().enumerate() {
            bits.set(c, v);
        }
    }

    fn assign_column(&mut self, col: usize, values: &[bool]) {
        debug_assert_eq!(values.len(), self.rows.len());
        for (r, &v) in values.iter().enumerate() {
            self.rows[r].set(col, v);
        }
    }

    fn clear_column(&mut self, col: usize) {
        for row in &mut self.rows {
            row.set(col, false);
        }
    }
}

/// `FixedBitSet` doesn't expose a whole-set popcount directly under one
/// name across versions; this small helper keeps call sites readable.
trait CountOnesAll {
    fn count_ones_range_all(&self) -> usize;
}

impl CountOnesAll for FixedBitSet {
    fn count_ones_range_all(&self) -> usize {
        self.count_ones(..)
    }
}
