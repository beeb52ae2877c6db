//! Snapping derived grid values onto the solver's lattices.
//!
//! FAST.Farm requires the low-resolution time step and spacing to be integer
//! multiples of their high-resolution counterparts, and TurbSim wants whole
//! numbers of cells. Values are therefore carried as an integer count of a
//! fixed quantum so that divisibility checks are exact.

use crate::{FfError, FfResult, Real};

/// Slack applied before rounding so that 0.3 / 0.005 lands on 60, not 59.
const SNAP_EPS: Real = 1e-9;
const VALUE_SCALE: Real = 1e9;

/// A non-zero integer multiple of a quantum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantized {
    steps: u64,
    quantum: Real,
}

impl Quantized {
    pub fn new(steps: u64, quantum: Real) -> Self {
        Self { steps, quantum }
    }

    /// Largest multiple of `quantum` not above `value`.
    pub fn floor(value: Real, quantum: Real, what: &str) -> FfResult<Self> {
        check_quantum(quantum, what)?;
        let steps = (value / quantum + SNAP_EPS).floor();
        if !steps.is_finite() || steps < 1.0 {
            return Err(FfError::Quantization {
                what: what.to_string(),
                value,
                quantum,
                reason: "value is below one quantum".to_string(),
            });
        }
        Ok(Self {
            steps: steps as u64,
            quantum,
        })
    }

    /// Largest common multiple of every `divisors` entry that is not above `bound`.
    ///
    /// All divisors must share this quantum.
    pub fn floor_common_multiple(
        bound: Real,
        divisors: &[Quantized],
        quantum: Real,
        what: &str,
    ) -> FfResult<Self> {
        check_quantum(quantum, what)?;
        let base = divisors
            .iter()
            .try_fold(1_u64, |acc, d| lcm(acc, d.steps))
            .ok_or_else(|| FfError::Quantization {
                what: what.to_string(),
                value: bound,
                quantum,
                reason: "common multiple overflows".to_string(),
            })?;
        let bound_steps = (bound / quantum + SNAP_EPS).floor();
        if !bound_steps.is_finite() || bound_steps < 0.0 {
            return Err(FfError::Quantization {
                what: what.to_string(),
                value: bound,
                quantum,
                reason: "bound is not a finite positive value".to_string(),
            });
        }
        let k = bound_steps as u64 / base;
        if k == 0 {
            return Err(FfError::Quantization {
                what: what.to_string(),
                value: bound,
                quantum: base as Real * quantum,
                reason: "no common multiple of the high-resolution values fits below the bound"
                    .to_string(),
            });
        }
        Ok(Self {
            steps: k * base,
            quantum,
        })
    }

    pub fn steps(self) -> u64 {
        self.steps
    }

    /// Value rounded to a nanounit so that 60 * 0.005 reads back as 0.3.
    pub fn value(self) -> Real {
        (self.steps as Real * self.quantum * VALUE_SCALE).round() / VALUE_SCALE
    }

    /// True when `self` is an integer multiple of `other` (same quantum).
    pub fn is_multiple_of(self, other: Quantized) -> bool {
        other.steps != 0 && self.steps % other.steps == 0
    }
}

fn check_quantum(quantum: Real, what: &str) -> FfResult<()> {
    if !quantum.is_finite() || quantum <= 0.0 {
        return Err(FfError::Quantization {
            what: what.to_string(),
            value: quantum,
            quantum,
            reason: "quantum must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// `None` when the multiple does not fit in a `u64`.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Number of `ds` cells needed to cover `extent` (at least one).
pub fn cells_to_cover(extent: Real, ds: Real) -> usize {
    let n = (extent / ds - SNAP_EPS).ceil();
    if n.is_finite() && n >= 1.0 {
        n as usize
    } else {
        1
    }
}

/// Snap `v` down onto the lattice `k * ds` (works for negative values).
pub fn floor_to_lattice(v: Real, ds: Real) -> Real {
    (v / ds + SNAP_EPS).floor() * ds
}

/// Round `v` up to a multiple of `step`.
pub fn ceil_to_multiple(v: Real, step: Real) -> Real {
    (v / step - SNAP_EPS).ceil() * step
}
