//! # pwf-kinsol: Newton-Type Nonlinear Solver
//!
//! Solves `F(x) = 0` for a dense state vector `x` given two injectable
//! behaviors: a residual evaluation and a Jacobian fill over a fixed
//! sparse skeleton (a [`pwf_math::SparseMatrix`]). The solver mutates both
//! the state vector and the Jacobian in place across iterations — no
//! per-iteration allocation on the hot path.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SOLVE LOOP                                                   │
//! │  ──────────                                                   │
//! │  evaluate F(x)            residual callback                    │
//! │  refresh J (cadence)      jacobian callback via set_at_index   │
//! │  solve J·Δx = −F          dense LU                             │
//! │  x ← x + Δx               in-place update                      │
//! │  check ‖F‖∞ / ‖Δx‖∞       fnormtol / scsteptol                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numerical outcomes — convergence, iteration-budget exhaustion, singular
//! Jacobian — come back as a [`KinsolStatus`] inside [`KinsolResult`];
//! only malformed inputs and integration bugs (an unknown raw status code)
//! are [`KinsolError`]s.
//!
//! ## Example
//!
//! ```
//! use pwf_kinsol::{Kinsol, KinsolParameters};
//! use pwf_math::SparseMatrix;
//!
//! // One equation: 0 = x² - 4, from x = 3.
//! let mut x = vec![3.0];
//! let mut j = SparseMatrix::new(1, 1, 1);
//! j.set(0, 0, 0.0);
//!
//! let result = Kinsol::new()
//!     .solve(
//!         &mut x,
//!         &mut j,
//!         |x, f| f[0] = x[0] * x[0] - 4.0,
//!         |x, j| j.set_at_index(0, 2.0 * x[0]),
//!     )
//!     .unwrap();
//!
//! assert!(result.status.is_success());
//! assert!((x[0] - 2.0).abs() < 1e-6);
//! ```

pub mod params;
pub mod solver;
pub mod status;

mod error;

pub use error::KinsolError;
pub use params::KinsolParameters;
pub use solver::Kinsol;
pub use status::{KinsolResult, KinsolStatus};
