//! Solver parameters with kernel-compatible defaults.

use serde::{Deserialize, Serialize};

use crate::error::KinsolError;

/// Tuning knobs consumed by [`crate::Kinsol::solve`].
///
/// Zero tolerances mean "use the solver default": `fnormtol` falls back to
/// `ε^(1/3)` and `scsteptol` to `ε^(2/3)` with `ε = f64::EPSILON`.
/// `msbset = 0` refreshes the Jacobian on every iteration; `msbset = k`
/// holds it for up to `k` iterations between refreshes. `msbsetsub` bounds
/// how long a refresh may be deferred once the residual norm stops
/// decreasing under a held Jacobian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinsolParameters {
    /// Maximum Newton iterations per solve call.
    pub max_iters: usize,
    /// Jacobian refresh interval in iterations (0 = every iteration).
    pub msbset: usize,
    /// Refresh deferral bound once the residual stalls (0 = one iteration).
    pub msbsetsub: usize,
    /// Residual-norm convergence tolerance (0 = solver default).
    pub fnormtol: f64,
    /// Scaled-step convergence tolerance (0 = solver default).
    pub scsteptol: f64,
}

impl Default for KinsolParameters {
    fn default() -> Self {
        Self {
            max_iters: 200,
            msbset: 0,
            msbsetsub: 0,
            fnormtol: 0.0,
            scsteptol: 0.0,
        }
    }
}

impl KinsolParameters {
    /// Create parameters with kernel defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum iteration budget.
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the Jacobian refresh interval.
    pub fn with_msbset(mut self, msbset: usize) -> Self {
        self.msbset = msbset;
        self
    }

    /// Set the stalled-residual refresh bound.
    pub fn with_msbsetsub(mut self, msbsetsub: usize) -> Self {
        self.msbsetsub = msbsetsub;
        self
    }

    /// Set the residual-norm tolerance.
    pub fn with_fnormtol(mut self, fnormtol: f64) -> Self {
        self.fnormtol = fnormtol;
        self
    }

    /// Set the scaled-step tolerance.
    pub fn with_scsteptol(mut self, scsteptol: f64) -> Self {
        self.scsteptol = scsteptol;
        self
    }

    /// Call-time validation; violations never defer into the loop.
    pub(crate) fn validate(&self) -> Result<(), KinsolError> {
        if self.max_iters == 0 {
            return Err(KinsolError::IllInput(
                "max_iters must be at least 1".to_string(),
            ));
        }
        if !self.fnormtol.is_finite() || self.fnormtol < 0.0 {
            return Err(KinsolError::IllInput(format!(
                "fnormtol must be finite and non-negative, got {}",
                self.fnormtol
            )));
        }
        if !self.scsteptol.is_finite() || self.scsteptol < 0.0 {
            return Err(KinsolError::IllInput(format!(
                "scsteptol must be finite and non-negative, got {}",
                self.scsteptol
            )));
        }
        Ok(())
    }

    pub(crate) fn effective_fnormtol(&self) -> f64 {
        if self.fnormtol > 0.0 {
            self.fnormtol
        } else {
            f64::EPSILON.powf(1.0 / 3.0)
        }
    }

    pub(crate) fn effective_scsteptol(&self) -> f64 {
        if self.scsteptol > 0.0 {
            self.scsteptol
        } else {
            f64::EPSILON.powf(2.0 / 3.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kernel() {
        let p = KinsolParameters::new();
        assert_eq!(p.max_iters, 200);
        assert_eq!(p.msbset, 0);
        assert_eq!(p.msbsetsub, 0);
        assert_eq!(p.fnormtol, 0.0);
        assert_eq!(p.scsteptol, 0.0);
    }

    #[test]
    fn fields_are_independently_settable() {
        let p = KinsolParameters::new()
            .with_max_iters(50)
            .with_msbset(5)
            .with_msbsetsub(2)
            .with_fnormtol(1e-8)
            .with_scsteptol(1e-10);
        assert_eq!(p.max_iters, 50);
        assert_eq!(p.msbset, 5);
        assert_eq!(p.msbsetsub, 2);
        assert_eq!(p.fnormtol, 1e-8);
        assert_eq!(p.scsteptol, 1e-10);

        // Setting one field leaves the others at their defaults.
        let q = KinsolParameters::new().with_fnormtol(1e-3);
        assert_eq!(q.max_iters, 200);
        assert_eq!(q.msbset, 0);
        assert_eq!(q.fnormtol, 1e-3);
    }

    #[test]
    fn zero_tolerances_fall_back_to_machine_defaults() {
        let p = KinsolParameters::new();
        assert!((p.effective_fnormtol() - f64::EPSILON.powf(1.0 / 3.0)).abs() < 1e-18);
        assert!((p.effective_scsteptol() - f64::EPSILON.powf(2.0 / 3.0)).abs() < 1e-18);
        let q = p.with_fnormtol(1e-4);
        assert_eq!(q.effective_fnormtol(), 1e-4);
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert!(KinsolParameters::new().with_max_iters(0).validate().is_err());
        assert!(KinsolParameters::new()
            .with_fnormtol(f64::NAN)
            .validate()
            .is_err());
        assert!(KinsolParameters::new()
            .with_scsteptol(-1.0)
            .validate()
            .is_err());
        assert!(KinsolParameters::new().validate().is_ok());
    }

    #[test]
    fn serde_round_trip() {
        let p = KinsolParameters::new().with_max_iters(30).with_fnormtol(1e-9);
        let json = serde_json::to_string(&p).unwrap();
        let restored: KinsolParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, p);
    }
}
