//! Compressed sparse-column matrix used as the solver's Jacobian buffer.
//!
//! Storage layout:
//! ```text
//! col_start[c] .. col_start[c + 1]  -> slice of row_index/values for column c
//! ```
//! Rows are kept sorted within each column, so the representation is
//! canonical: two matrices with the same pattern and values compare equal
//! regardless of insertion order.
//!
//! The flat non-zero index accepted by [`SparseMatrix::set_at_index`] is the
//! position in the value array. It is stable once the sparsity pattern is
//! fully established; inserting a new entry shifts the indices of entries
//! stored after it, so callers establish the pattern before switching to
//! index-addressed writes.

use sprs::{CsMat, TriMat};

/// Mutable sparse 2-D numeric container in compressed-column form.
///
/// Dimensions are fixed at creation; the non-zero budget is a capacity hint
/// and storage grows past it transparently. The same object serves as a
/// persisted artifact (see [`crate::serialize`] and [`crate::matfile`]) and
/// as the live Jacobian refreshed in place on every solver iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    /// Column offsets into `row_index`/`values`, length `cols + 1`.
    pub(crate) col_start: Vec<usize>,
    /// Row index of each stored entry, sorted within each column.
    pub(crate) row_index: Vec<usize>,
    /// Stored entry values, addressed by the flat non-zero index.
    pub(crate) values: Vec<f64>,
}

impl SparseMatrix {
    /// Create an empty matrix with the given dimensions and an estimated
    /// non-zero count used to pre-size storage.
    pub fn new(rows: usize, cols: usize, estimated_non_zeros: usize) -> Self {
        Self {
            rows,
            cols,
            col_start: vec![0; cols + 1],
            row_index: Vec::with_capacity(estimated_non_zeros),
            values: Vec::with_capacity(estimated_non_zeros),
        }
    }

    /// Build a matrix from `(row, col, value)` triplets.
    ///
    /// Duplicate coordinates accumulate. Goes through [`sprs::TriMat`] so
    /// the result comes out in canonical compressed-column form.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut tri = TriMat::new((rows, cols));
        for &(row, col, value) in triplets {
            tri.add_triplet(row, col, value);
        }
        let csc: CsMat<f64> = tri.to_csc();
        let mut matrix = Self::new(rows, cols, csc.nnz());
        for col in 0..cols {
            if let Some(col_vec) = csc.outer_view(col) {
                for (row, &value) in col_vec.iter() {
                    matrix.set(row, col, value);
                }
            }
        }
        matrix
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Matrix density (nnz / rows·cols).
    pub fn density(&self) -> f64 {
        if self.rows == 0 || self.cols == 0 {
            return 0.0;
        }
        self.nnz() as f64 / (self.rows * self.cols) as f64
    }

    /// Memory usage in bytes (approximate).
    pub fn memory_bytes(&self) -> usize {
        // CSC format: nnz values (f64) + nnz row indices (usize) + (cols+1) offsets (usize)
        let nnz = self.nnz();
        nnz * 8 + nnz * 8 + (self.cols + 1) * 8
    }

    /// Get the value at `(row, col)`, zero if the position is not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.check_bounds(row, col);
        match self.locate(row, col) {
            Ok(k) => self.values[k],
            Err(_) => 0.0,
        }
    }

    /// Replace the value at `(row, col)`, inserting a stored entry if the
    /// position is not yet part of the pattern. Idempotent: a second `set`
    /// at the same position overwrites, never accumulates.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.check_bounds(row, col);
        match self.locate(row, col) {
            Ok(k) => self.values[k] = value,
            Err(k) => self.insert_at(k, row, col, value),
        }
    }

    /// Accumulate `value` onto the entry at `(row, col)`, behaving as
    /// [`SparseMatrix::set`] if the position is not yet stored.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.check_bounds(row, col);
        match self.locate(row, col) {
            Ok(k) => self.values[k] += value,
            Err(k) => self.insert_at(k, row, col, value),
        }
    }

    /// Direct write into value slot `index`.
    ///
    /// O(1) fast path for Jacobian refresh loops that already know the
    /// fixed non-zero layout; see [`SparseMatrix::index_of`].
    pub fn set_at_index(&mut self, index: usize, value: f64) {
        assert!(
            index < self.values.len(),
            "non-zero index {} out of range (nnz = {})",
            index,
            self.values.len()
        );
        self.values[index] = value;
    }

    /// Flat non-zero index of the entry stored at `(row, col)`, if any.
    ///
    /// The returned index stays valid for the lifetime of the matrix as
    /// long as no new entry is inserted afterwards.
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        self.check_bounds(row, col);
        self.locate(row, col).ok()
    }

    /// Iterate over stored entries as `(row, col, value)` in column-major
    /// order. Each stored coordinate appears exactly once.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.cols).flat_map(move |col| {
            (self.col_start[col]..self.col_start[col + 1])
                .map(move |k| (self.row_index[k], col, self.values[k]))
        })
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows,
            "row {} out of range (matrix has {} rows)",
            row,
            self.rows
        );
        assert!(
            col < self.cols,
            "column {} out of range (matrix has {} columns)",
            col,
            self.cols
        );
    }

    /// Binary search within the column span: `Ok(k)` for a stored entry,
    /// `Err(k)` for the insertion point keeping rows sorted.
    fn locate(&self, row: usize, col: usize) -> Result<usize, usize> {
        let lo = self.col_start[col];
        let hi = self.col_start[col + 1];
        match self.row_index[lo..hi].binary_search(&row) {
            Ok(offset) => Ok(lo + offset),
            Err(offset) => Err(lo + offset),
        }
    }

    fn insert_at(&mut self, k: usize, row: usize, col: usize, value: f64) {
        self.row_index.insert(k, row);
        self.values.insert(k, value);
        for offset in &mut self.col_start[col + 1..] {
            *offset += 1;
        }
    }
}

/// Creation seam for matrices with pre-declared dimensions and non-zero
/// budget, so assembly code can stay agnostic of the concrete storage.
pub trait MatrixFactory {
    /// Allocate a matrix sized for `estimated_non_zeros` stored entries.
    fn create(&self, rows: usize, cols: usize, estimated_non_zeros: usize) -> SparseMatrix;
}

/// Default factory producing compressed sparse-column matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SparseMatrixFactory;

impl MatrixFactory for SparseMatrixFactory {
    fn create(&self, rows: usize, cols: usize, estimated_non_zeros: usize) -> SparseMatrix {
        SparseMatrix::new(rows, cols, estimated_non_zeros)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_idempotent() {
        let mut m = SparseMatrix::new(3, 3, 3);
        m.set(1, 2, 5.0);
        m.set(1, 2, 7.0);
        assert_eq!(m.get(1, 2), 7.0);
        assert_eq!(m.nnz(), 1);
    }

    #[test]
    fn add_accumulates() {
        let mut m = SparseMatrix::new(3, 3, 3);
        m.add(0, 0, 1.5);
        m.add(0, 0, 2.5);
        assert_eq!(m.get(0, 0), 4.0);
        assert_eq!(m.nnz(), 1);
    }

    #[test]
    fn add_on_unset_position_behaves_as_set() {
        let mut m = SparseMatrix::new(2, 2, 2);
        m.add(1, 0, -3.0);
        assert_eq!(m.get(1, 0), -3.0);
    }

    #[test]
    #[should_panic(expected = "row 3 out of range")]
    fn set_rejects_row_out_of_range() {
        let mut m = SparseMatrix::new(3, 4, 2);
        m.set(3, 0, 1.0);
    }

    #[test]
    #[should_panic(expected = "column 4 out of range")]
    fn add_rejects_column_out_of_range() {
        let mut m = SparseMatrix::new(3, 4, 2);
        m.add(0, 4, 1.0);
    }

    #[test]
    fn rows_stay_sorted_within_columns() {
        let mut m = SparseMatrix::new(4, 2, 4);
        m.set(3, 0, 3.0);
        m.set(0, 0, 1.0);
        m.set(2, 0, 2.0);
        let column: Vec<_> = m.entries().filter(|&(_, c, _)| c == 0).collect();
        assert_eq!(column, vec![(0, 0, 1.0), (2, 0, 2.0), (3, 0, 3.0)]);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let mut a = SparseMatrix::new(3, 3, 4);
        a.set(0, 0, 1.0);
        a.set(2, 1, 2.0);
        a.set(1, 1, 3.0);

        let mut b = SparseMatrix::new(3, 3, 4);
        b.set(1, 1, 3.0);
        b.set(0, 0, 1.0);
        b.set(2, 1, 2.0);

        assert_eq!(a, b);
    }

    #[test]
    fn inequality_on_differing_values() {
        let mut a = SparseMatrix::new(2, 2, 1);
        a.set(0, 0, 1.0);
        let mut b = SparseMatrix::new(2, 2, 1);
        b.set(0, 0, 2.0);
        assert_ne!(a, b);
    }

    #[test]
    fn index_of_matches_set_at_index() {
        let mut m = SparseMatrix::new(2, 2, 4);
        m.set(0, 0, 1.0);
        m.set(1, 0, 2.0);
        m.set(0, 1, 3.0);
        m.set(1, 1, 4.0);

        let k = m.index_of(0, 1).expect("stored entry");
        m.set_at_index(k, -9.0);
        assert_eq!(m.get(0, 1), -9.0);
        // Other entries untouched.
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 1), 4.0);
    }

    #[test]
    fn index_is_stable_under_value_updates() {
        let mut m = SparseMatrix::new(3, 3, 4);
        m.set(0, 0, 1.0);
        m.set(2, 2, 2.0);
        let k = m.index_of(2, 2).unwrap();
        m.set(0, 0, 10.0);
        m.add(2, 2, 0.5);
        assert_eq!(m.index_of(2, 2), Some(k));
    }

    #[test]
    #[should_panic(expected = "non-zero index 1 out of range")]
    fn set_at_index_rejects_unused_slot() {
        let mut m = SparseMatrix::new(2, 2, 4);
        m.set(0, 0, 1.0);
        m.set_at_index(1, 2.0);
    }

    #[test]
    fn from_triplets_accumulates_duplicates() {
        let m = SparseMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 1, 2.0), (0, 0, 0.5)]);
        assert_eq!(m.nnz(), 2);
        assert_eq!(m.get(0, 0), 1.5);
        assert_eq!(m.get(1, 1), 2.0);
    }

    #[test]
    fn from_triplets_matches_incremental_assembly() {
        let tri = SparseMatrix::from_triplets(3, 3, &[(1, 0, 4.0), (0, 2, -1.0), (2, 2, 2.0)]);
        let mut inc = SparseMatrix::new(3, 3, 3);
        inc.set(0, 2, -1.0);
        inc.set(2, 2, 2.0);
        inc.set(1, 0, 4.0);
        assert_eq!(tri, inc);
    }

    #[test]
    fn grows_past_estimated_non_zeros() {
        let mut m = SparseMatrix::new(10, 10, 1);
        for i in 0..10 {
            m.set(i, i, i as f64);
        }
        assert_eq!(m.nnz(), 10);
        assert_eq!(m.get(7, 7), 7.0);
    }

    #[test]
    fn density_and_memory() {
        let mut m = SparseMatrix::new(10, 10, 4);
        m.set(0, 0, 1.0);
        m.set(9, 9, 1.0);
        assert!((m.density() - 0.02).abs() < 1e-12);
        assert!(m.memory_bytes() > 0);
    }

    #[test]
    fn factory_creates_with_declared_dimensions() {
        let factory = SparseMatrixFactory;
        let m = factory.create(5, 7, 12);
        assert_eq!(m.rows(), 5);
        assert_eq!(m.cols(), 7);
        assert_eq!(m.nnz(), 0);
    }
}
