use crate::FfError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
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

pub fn ensure_finite(v: Real, what: impl Into<String>) -> Result<Real, FfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FfError::NonFinite {
            what: what.into(),
            value: v,
        })
    }
}

/// Finite and strictly positive, otherwise a configuration error naming `what`.
pub fn ensure_positive(v: Real, what: impl Into<String>) -> Result<Real, FfError> {
    let what = what.into();
    if !v.is_finite() || v <= 0.0 {
        return Err(FfError::Configuration {
            what: format!("{what} must be positive and finite (got {v})"),
        });
    }
    Ok(v)
}

/// Render a value for solver input files.
///
/// At most six decimals, trailing zeros trimmed, so `0.30000000000000004`
/// becomes `0.3` and `150.0` becomes `150`. Output is identical across runs.
pub fn format_real(v: Real) -> String {
    let mut s = format!("{v:.6}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
