use ff_core::{FfError, FfResult, Real, ensure_finite};

/// Independently supplied value lists; the sweep is their cross product.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionAxes {
    pub vhub: Vec<Real>,
    pub shear: Vec<Real>,
    pub ti: Vec<Real>,
    pub inflow_deg: Vec<Real>,
}

impl ConditionAxes {
    pub fn validate(&self) -> FfResult<()> {
        for (axis, values) in self.named() {
            if values.is_empty() {
                return Err(FfError::config(format!(
                    "sweep axis '{axis}' must list at least one value"
                )));
            }
            for v in values {
                ensure_finite(*v, format!("sweep axis '{axis}'"))?;
            }
        }
        if let Some(v) = self.vhub.iter().find(|v| **v <= 0.0) {
            return Err(FfError::config(format!(
                "sweep axis 'vhub' holds a non-positive wind speed ({v})"
            )));
        }
        Ok(())
    }

    pub fn named(&self) -> [(&'static str, &[Real]); 4] {
        [
            ("vhub", &self.vhub),
            ("shear", &self.shear),
            ("ti", &self.ti),
            ("inflow_deg", &self.inflow_deg),
        ]
    }

    /// Number of inflow conditions (seeds excluded).
    pub fn len(&self) -> usize {
        self.vhub.len() * self.shear.len() * self.ti.len() * self.inflow_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn min_vhub(&self) -> Real {
        self.vhub.iter().copied().fold(Real::MAX, Real::min)
    }

    pub fn max_vhub(&self) -> Real {
        self.vhub.iter().copied().fold(Real::MIN, Real::max)
    }
}
