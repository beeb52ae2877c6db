//! Sizing constants from the FAST.Farm modeling guidance.
//!
//! <https://openfast.readthedocs.io/en/dev/source/user/fast.farm/ModelGuidance.html>
//!
//! Every constant can be overridden from the sweep file.

use ff_core::{FfError, FfResult, Real};

#[derive(Debug, Clone, PartialEq)]
pub struct SizingGuidance {
    /// `dt_low <= 1 / (nyquist_factor * fmax)`.
    pub nyquist_factor: Real,
    /// High-resolution time step is this many times finer than the Nyquist bound.
    pub high_time_refinement: Real,
    /// `dt_low <= Cmeander * D / (meander_dt_divisor * Vhub)`.
    pub meander_dt_divisor: Real,
    /// `ds_low <= Cmeander * D * Vhub / meander_ds_divisor`.
    pub meander_ds_divisor: Real,
    /// `ds_high = high_chord_fraction * cmax`.
    pub high_chord_fraction: Real,
    /// Chord-based candidate for the low-resolution spacing.
    pub low_chord_multiple: Real,
    /// Upper clip of `ds_low` as a fraction of the smallest rotor diameter.
    pub low_max_d_fraction: Real,
    /// Upstream, downstream, -y, +y, above-hub margins in multiples of the largest D.
    pub extent_low: [Real; 5],
    /// Floor on each horizontal low-resolution extent, in multiples of the largest D.
    pub min_low_extent_d: Real,
    /// High-resolution box side in rotor diameters at the reference meandering constant.
    pub extent_high: Real,
    pub cmeander_reference: Real,
    pub time_quantum: Real,
    pub space_quantum: Real,
}

impl Default for SizingGuidance {
    fn default() -> Self {
        Self {
            nyquist_factor: 2.0,
            high_time_refinement: 2.0,
            meander_dt_divisor: 10.0,
            meander_ds_divisor: 150.0,
            high_chord_fraction: 1.0,
            low_chord_multiple: 10.0,
            low_max_d_fraction: 0.25,
            extent_low: [3.0, 8.0, 3.0, 3.0, 2.0],
            min_low_extent_d: 2.0,
            extent_high: 1.2,
            cmeander_reference: 1.9,
            time_quantum: 0.005,
            space_quantum: 0.5,
        }
    }
}

impl SizingGuidance {
    pub fn validate(&self) -> FfResult<()> {
        let positive = [
            ("nyquist_factor", self.nyquist_factor),
            ("high_time_refinement", self.high_time_refinement),
            ("meander_dt_divisor", self.meander_dt_divisor),
            ("meander_ds_divisor", self.meander_ds_divisor),
            ("high_chord_fraction", self.high_chord_fraction),
            ("low_chord_multiple", self.low_chord_multiple),
            ("low_max_d_fraction", self.low_max_d_fraction),
            ("extent_high", self.extent_high),
            ("cmeander_reference", self.cmeander_reference),
            ("time_quantum", self.time_quantum),
            ("space_quantum", self.space_quantum),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(FfError::config(format!(
                    "sizing.{name} must be positive and finite (got {v})"
                )));
            }
        }
        if self.nyquist_factor < 2.0 {
            return Err(FfError::config(format!(
                "sizing.nyquist_factor must be at least 2 to resolve fmax (got {})",
                self.nyquist_factor
            )));
        }
        if self.high_time_refinement < 1.0 {
            return Err(FfError::config(format!(
                "sizing.high_time_refinement must be at least 1 (got {})",
                self.high_time_refinement
            )));
        }
        if self.extent_high < 1.0 {
            return Err(FfError::config(format!(
                "sizing.extent_high must cover the rotor (>= 1, got {})",
                self.extent_high
            )));
        }
        for (i, v) in self.extent_low.iter().enumerate() {
            if !v.is_finite() || *v < 0.0 {
                return Err(FfError::config(format!(
                    "sizing.extent_low[{i}] must be finite and non-negative (got {v})"
                )));
            }
        }
        if !self.min_low_extent_d.is_finite() || self.min_low_extent_d < 0.0 {
            return Err(FfError::config(format!(
                "sizing.min_low_extent_d must be finite and non-negative (got {})",
                self.min_low_extent_d
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SizingGuidance::default().validate().unwrap();
    }

    #[test]
    fn sub_nyquist_factor_rejected() {
        let guidance = SizingGuidance {
            nyquist_factor: 1.5,
            ..SizingGuidance::default()
        };
        assert!(guidance.validate().is_err());
    }
}
