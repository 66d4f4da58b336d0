use crate::{LfError, LfResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> LfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LfError::NonFinite { what, value: v })
    }
}

/// True when `a` and `b` are strictly on opposite sides of zero, or either is zero.
///
/// A zero endpoint counts as bracketing: the endpoint itself is the root.
pub fn brackets_zero(a: Real, b: Real) -> bool {
    a == 0.0 || b == 0.0 || (a < 0.0) != (b < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn brackets_zero_cases() {
        assert!(brackets_zero(-1.0, 2.0));
        assert!(brackets_zero(3.0, -0.5));
        assert!(brackets_zero(0.0, 5.0));
        assert!(!brackets_zero(1.0, 2.0));
        assert!(!brackets_zero(-1.0, -2.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn brackets_zero_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
                prop_assert_eq!(brackets_zero(a, b), brackets_zero(b, a));
            }
        }
    }
}
