//! # pwf-math: Sparse Matrix Infrastructure for Power Flow Computations
//!
//! Power-flow Jacobians are inherently sparse: a bus is only coupled to the
//! handful of buses it shares a branch with, so a 10,000-variable system
//! carries a few tens of thousands of non-zeros rather than 10⁸ entries.
//! This crate provides the compressed sparse-column container used as the
//! live Jacobian buffer by the nonlinear solver, together with its
//! persistence formats.
//!
//! ## Module Organization
//!
//! - [`sparse`]: [`SparseMatrix`] in compressed-column form, plus the
//!   [`MatrixFactory`] creation seam
//! - [`serialize`]: self-contained binary read/write with a round-trip
//!   guarantee
//! - [`matfile`]: MATLAB Level-4 `.mat` sparse export/import
//!
//! ## Usage
//!
//! ```
//! use pwf_math::SparseMatrix;
//!
//! let mut m = SparseMatrix::new(2, 2, 4);
//! m.set(0, 1, 3.0);
//! m.add(0, 1, 1.0);
//! assert_eq!(m.get(0, 1), 4.0);
//!
//! // The flat non-zero index is stable once the pattern is established,
//! // so per-iteration refreshes can skip the coordinate lookup.
//! let k = m.index_of(0, 1).unwrap();
//! m.set_at_index(k, -2.5);
//! assert_eq!(m.get(0, 1), -2.5);
//! ```

pub mod matfile;
pub mod serialize;
pub mod sparse;

mod error;

pub use error::{MatrixError, MatrixResult};
pub use matfile::{export_mat, import_mat};
pub use sparse::{MatrixFactory, SparseMatrix, SparseMatrixFactory};
