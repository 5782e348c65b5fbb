//! Terminal status codes and the solve result bundle.

use serde::{Deserialize, Serialize};

use crate::error::KinsolError;

/// Closed enumeration of solver termination codes.
///
/// Mirrors the KINSOL return-code table: non-negative codes are
/// successful or advisory terminations, negative codes are failures.
/// Raw codes outside this table are rejected by
/// [`KinsolStatus::from_code`] — an unknown code signals an integration
/// bug and must never be coerced to a failure status silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum KinsolStatus {
    /// Converged: residual norm within `fnormtol`.
    Success = 0,
    /// The initial guess already satisfies the tolerances; no work done.
    InitialGuessOk = 1,
    /// Stopped on a scaled step shorter than `scsteptol`; the iterate is
    /// the best the current Jacobian can produce.
    StepLtStptol = 2,
    /// Advisory warning from the kernel.
    Warning = 99,
    /// Solver memory was not initialized.
    MemNull = -1,
    /// Invalid input to the kernel.
    IllInput = -2,
    /// Solver memory was not allocated.
    NoMalloc = -3,
    /// Memory allocation failed inside the kernel.
    MemFail = -4,
    /// Line search failed to find a suitable iterate.
    LineSearchNonConv = -5,
    /// Iteration budget exhausted without convergence.
    MaxIterReached = -6,
    /// Five consecutive steps hit the maximum Newton step length.
    MxNewt5xExceeded = -7,
    /// Line search beta-condition failures exceeded the limit.
    LineSearchBcFail = -8,
    /// Linear solver could not recover after a Jacobian refresh.
    LinsolvNoRecovery = -9,
    /// Linear solver initialization failed.
    LinitFail = -10,
    /// Linear solver setup failed unrecoverably.
    LsetupFail = -11,
    /// Linear solve failed unrecoverably (e.g. singular Jacobian).
    LsolveFail = -12,
    /// The residual function failed unrecoverably.
    SysFuncFail = -13,
    /// The residual function failed recoverably at the first call.
    FirstSysFuncErr = -14,
    /// Repeated recoverable residual-function failures.
    ReptdSysFuncErr = -15,
}

impl KinsolStatus {
    /// Translate a raw kernel status code.
    ///
    /// Codes outside the known table raise
    /// [`KinsolError::InvalidStatus`] carrying the offending value.
    pub fn from_code(code: i32) -> Result<Self, KinsolError> {
        match code {
            0 => Ok(KinsolStatus::Success),
            1 => Ok(KinsolStatus::InitialGuessOk),
            2 => Ok(KinsolStatus::StepLtStptol),
            99 => Ok(KinsolStatus::Warning),
            -1 => Ok(KinsolStatus::MemNull),
            -2 => Ok(KinsolStatus::IllInput),
            -3 => Ok(KinsolStatus::NoMalloc),
            -4 => Ok(KinsolStatus::MemFail),
            -5 => Ok(KinsolStatus::LineSearchNonConv),
            -6 => Ok(KinsolStatus::MaxIterReached),
            -7 => Ok(KinsolStatus::MxNewt5xExceeded),
            -8 => Ok(KinsolStatus::LineSearchBcFail),
            -9 => Ok(KinsolStatus::LinsolvNoRecovery),
            -10 => Ok(KinsolStatus::LinitFail),
            -11 => Ok(KinsolStatus::LsetupFail),
            -12 => Ok(KinsolStatus::LsolveFail),
            -13 => Ok(KinsolStatus::SysFuncFail),
            -14 => Ok(KinsolStatus::FirstSysFuncErr),
            -15 => Ok(KinsolStatus::ReptdSysFuncErr),
            _ => Err(KinsolError::InvalidStatus(code)),
        }
    }

    /// Raw kernel code for this status.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// True for the terminations that leave a usable solution in `x`.
    pub fn is_success(self) -> bool {
        matches!(
            self,
            KinsolStatus::Success | KinsolStatus::InitialGuessOk | KinsolStatus::StepLtStptol
        )
    }
}

/// Terminal status plus the iteration count consumed by a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinsolResult {
    pub status: KinsolStatus,
    pub iterations: usize,
}

impl KinsolResult {
    /// Shorthand for `status.is_success()`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
