//! Bracketed scalar root-finding on top of `roots::find_root_brent`.
//!
//! Endpoints are evaluated here first so bracket failures carry both
//! residuals. Fallible evaluations are adapted to the plain `f64` closure
//! `roots` expects: the first error is parked and the search is cut short.

use lf_core::numeric::brackets_zero;
use roots::{SearchError, SimpleConvergency, find_root_brent};
use serde::{Deserialize, Serialize};

/// Brent solver configuration.
///
/// Maps onto `roots::SimpleConvergency`: the search stops once the
/// function value or the step between iterates falls below `eps`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrentConfig {
    /// Convergence threshold on both the residual and the root location
    pub eps: f64,
    /// Maximum iterations
    pub max_iterations: usize,
}

impl Default for BrentConfig {
    fn default() -> Self {
        Self {
            eps: 1e-12,
            max_iterations: 100,
        }
    }
}

impl BrentConfig {
    fn convergency(&self) -> SimpleConvergency<f64> {
        SimpleConvergency {
            eps: self.eps,
            max_iter: self.max_iterations,
        }
    }
}

/// Brent iteration result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrentResult {
    /// Root estimate
    pub x: f64,
    /// Function value at `x`
    pub residual: f64,
    /// Number of function evaluations after the endpoints
    pub iterations: usize,
}

/// Failure modes of a bracketed root-find.
#[derive(Debug, Clone, PartialEq)]
pub enum BrentError<E> {
    /// `f(lo)` and `f(hi)` share a sign.
    NotBracketed { f_lo: f64, f_hi: f64 },
    /// Iteration cap reached; `last` is the final point evaluated.
    MaxIterations { last: f64, residual: f64 },
    /// A function value was NaN or infinite.
    NonFinite { x: f64 },
    /// The function itself failed.
    Eval(E),
}

/// Find a root of `f` in `[lo, hi]`.
pub fn brent<F, E>(
    mut f: F,
    lo: f64,
    hi: f64,
    config: &BrentConfig,
) -> Result<BrentResult, BrentError<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let f_lo = f(lo).map_err(BrentError::Eval)?;
    let f_hi = f(hi).map_err(BrentError::Eval)?;
    brent_from_bracket(f, (lo, f_lo), (hi, f_hi), config)
}

/// Find a root of `f` given already-evaluated endpoints.
///
/// Lets callers inspect or remap endpoint failures before iterating.
pub fn brent_from_bracket<F, E>(
    mut f: F,
    (lo, f_lo): (f64, f64),
    (hi, f_hi): (f64, f64),
    config: &BrentConfig,
) -> Result<BrentResult, BrentError<E>>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if !f_lo.is_finite() {
        return Err(BrentError::NonFinite { x: lo });
    }
    if !f_hi.is_finite() {
        return Err(BrentError::NonFinite { x: hi });
    }
    if f_lo == 0.0 {
        return Ok(BrentResult {
            x: lo,
            residual: 0.0,
            iterations: 0,
        });
    }
    if f_hi == 0.0 {
        return Ok(BrentResult {
            x: hi,
            residual: 0.0,
            iterations: 0,
        });
    }
    if !brackets_zero(f_lo, f_hi) {
        return Err(BrentError::NotBracketed { f_lo, f_hi });
    }

    let mut failure: Option<BrentError<E>> = None;
    let mut evaluations = 0usize;
    let mut last = (lo, f_lo);
    let mut convergency = config.convergency();

    // A zero return ends the search at once; `failure` is checked first.
    let search = find_root_brent(
        lo,
        hi,
        |x: f64| {
            if failure.is_some() {
                return 0.0;
            }
            evaluations += 1;
            match f(x) {
                Ok(y) if y.is_finite() => {
                    last = (x, y);
                    y
                }
                Ok(_) => {
                    failure = Some(BrentError::NonFinite { x });
                    0.0
                }
                Err(err) => {
                    failure = Some(BrentError::Eval(err));
                    0.0
                }
            }
        },
        &mut convergency,
    );

    if let Some(err) = failure {
        return Err(err);
    }
    // `roots` evaluates both endpoints again before iterating.
    let iterations = evaluations.saturating_sub(2);

    match search {
        Ok(x) => {
            let residual = if last.0 == x {
                last.1
            } else {
                f(x).map_err(BrentError::Eval)?
            };
            Ok(BrentResult {
                x,
                residual,
                iterations,
            })
        }
        Err(SearchError::NoBracketing) => Err(BrentError::NotBracketed { f_lo, f_hi }),
        Err(_) => Err(BrentError::MaxIterations {
            last: last.0,
            residual: last.1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn ok(v: f64) -> Result<f64, Infallible> {
        Ok(v)
    }

    #[test]
    fn cubic_root() {
        let result = brent(|x| ok(x * x * x - 2.0 * x - 5.0), 2.0, 3.0, &BrentConfig::default())
            .unwrap();
        assert!((result.x - 2.094_551_481_542_327).abs() < 1e-10);
        assert!(result.residual.abs() < 1e-9);
        assert!(result.iterations < 30);
    }

    #[test]
    fn reversed_interval_is_fine() {
        let result = brent(|x| ok(x - 0.25), 1.0, -1.0, &BrentConfig::default()).unwrap();
        assert!((result.x - 0.25).abs() < 1e-12);
    }

    #[test]
    fn endpoint_root_returns_immediately() {
        let result = brent(|x| ok(x - 1.0), -1.0, 1.0, &BrentConfig::default()).unwrap();
        assert_eq!(result.x, 1.0);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn same_sign_is_not_bracketed() {
        let err = brent(|x| ok(x * x + 1.0), -1.0, 1.0, &BrentConfig::default()).unwrap_err();
        assert_eq!(
            err,
            BrentError::NotBracketed {
                f_lo: 2.0,
                f_hi: 2.0
            }
        );
    }

    #[test]
    fn evaluation_errors_pass_through() {
        let err = brent(
            |x| if x > 0.5 { Err("boom") } else { Ok(x - 0.75) },
            0.0,
            0.6,
            &BrentConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, BrentError::Eval("boom"));
    }

    #[test]
    fn interior_errors_pass_through() {
        // Endpoints evaluate fine; the failure is only hit while iterating.
        let err = brent(
            |x: f64| {
                if x.abs() < 0.4 {
                    Err("interior")
                } else {
                    Ok(x)
                }
            },
            -1.0,
            1.0,
            &BrentConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, BrentError::Eval("interior"));
    }

    #[test]
    fn non_finite_interior_value_is_reported() {
        let err = brent(
            |x: f64| ok(if x.abs() < 0.4 { f64::NAN } else { x }),
            -1.0,
            1.0,
            &BrentConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BrentError::NonFinite { x } if x.abs() < 0.4));
    }

    #[test]
    fn iteration_cap_is_reported() {
        let config = BrentConfig {
            max_iterations: 2,
            ..BrentConfig::default()
        };
        let err = brent(|x| ok(x.powi(3) - 1e-3), -10.0, 10.0, &config).unwrap_err();
        assert!(matches!(err, BrentError::MaxIterations { .. }));
    }

    #[test]
    fn steep_step_converges_by_bisection() {
        let result = brent(
            |x| ok(if x < 0.3 { -1.0 } else { 1.0 }),
            0.0,
            1.0,
            &BrentConfig::default(),
        )
        .unwrap();
        assert!((result.x - 0.3).abs() < 1e-6);
    }
}
