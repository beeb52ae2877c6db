//! Condition sweep enumeration.
//!
//! Axis order, outermost to innermost: wind speed, shear, turbulence
//! intensity, inflow direction, seed. Names come from axis positions, never
//! from the numeric values, so they stay filesystem-safe and sort in sweep
//! order.

use ff_core::{FfError, FfResult, Real};
use ff_domain::ConditionAxes;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InflowCondition {
    pub vhub: Real,
    pub shear: Real,
    pub ti: Real,
    pub inflow_deg: Real,
}

/// Position of a case along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisIndex {
    pub vhub: usize,
    pub shear: usize,
    pub ti: usize,
    pub inflow: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Position in the full sweep.
    pub index: usize,
    /// Flat index of the 4-tuple inflow condition.
    pub condition_index: usize,
    pub axis: AxisIndex,
    pub condition: InflowCondition,
    pub seed: usize,
    /// `Cond<c>_v<i>_sh<j>_ti<k>`, shared by every direction and seed.
    pub condition_name: String,
    /// `Case<d>`: the inflow direction index.
    pub case_name: String,
}

impl Case {
    pub fn seed_dir_name(&self) -> String {
        format!("Seed_{}", self.seed)
    }

    /// `<condition>/<case>/Seed_<n>` relative to the sweep base path.
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(&self.condition_name)
            .join(&self.case_name)
            .join(self.seed_dir_name())
    }

    pub fn job_name(&self) -> String {
        format!("{}_{}_{}", self.condition_name, self.case_name, self.seed_dir_name())
    }
}

pub fn enumerate_cases(axes: &ConditionAxes, n_seeds: usize) -> FfResult<Vec<Case>> {
    axes.validate()?;
    if n_seeds < 1 {
        return Err(FfError::config("n_seeds must be at least 1"));
    }

    let n_v = axes.vhub.len();
    let n_sh = axes.shear.len();
    let n_ti = axes.ti.len();
    let n_dir = axes.inflow_deg.len();

    let cond_width = pad_width(n_v * n_sh * n_ti);
    let v_width = pad_width(n_v);
    let sh_width = pad_width(n_sh);
    let ti_width = pad_width(n_ti);
    let dir_width = pad_width(n_dir);

    let mut cases = Vec::with_capacity(axes.len() * n_seeds);
    let mut condition_index = 0;
    for (iv, &vhub) in axes.vhub.iter().enumerate() {
        for (ish, &shear) in axes.shear.iter().enumerate() {
            for (iti, &ti) in axes.ti.iter().enumerate() {
                let cond_flat = (iv * n_sh + ish) * n_ti + iti;
                let condition_name = format!(
                    "Cond{cond_flat:0cond_width$}_v{iv:0v_width$}_sh{ish:0sh_width$}_ti{iti:0ti_width$}"
                );
                for (idir, &inflow_deg) in axes.inflow_deg.iter().enumerate() {
                    let case_name = format!("Case{idir:0dir_width$}");
                    for seed in 0..n_seeds {
                        cases.push(Case {
                            index: cases.len(),
                            condition_index,
                            axis: AxisIndex {
                                vhub: iv,
                                shear: ish,
                                ti: iti,
                                inflow: idir,
                            },
                            condition: InflowCondition {
                                vhub,
                                shear,
                                ti,
                                inflow_deg,
                            },
                            seed,
                            condition_name: condition_name.clone(),
                            case_name: case_name.clone(),
                        });
                    }
                    condition_index += 1;
                }
            }
        }
    }
    Ok(cases)
}

/// Digits needed for the largest index of an axis of length `len`, at least 2.
fn pad_width(len: usize) -> usize {
    let largest = len.saturating_sub(1);
    largest.to_string().len().max(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn axes(v: usize, sh: usize, ti: usize, dir: usize) -> ConditionAxes {
        ConditionAxes {
            vhub: (0..v).map(|i| 6.0 + i as Real).collect(),
            shear: (0..sh).map(|i| 0.1 * (i + 1) as Real).collect(),
            ti: (0..ti).map(|i| 5.0 + i as Real).collect(),
            inflow_deg: (0..dir).map(|i| -10.0 + 5.0 * i as Real).collect(),
        }
    }

    #[test]
    fn axis_order_is_v_shear_ti_dir_seed() {
        let cases = enumerate_cases(&axes(2, 2, 1, 2), 2).unwrap();
        assert_eq!(cases.len(), 16);

        let first = &cases[0];
        assert_eq!(first.relative_dir(), PathBuf::from("Cond00_v00_sh00_ti00/Case00/Seed_0"));
        assert_eq!(cases[1].seed, 1);
        assert_eq!(cases[2].axis.inflow, 1);
        assert_eq!(cases[4].axis.shear, 1);
        assert_eq!(cases[8].axis.vhub, 1);
        assert_eq!(cases[8].condition_name, "Cond02_v01_sh00_ti00");
        assert_eq!(cases[15].condition_index, 7);
        assert_eq!(cases[15].condition.vhub, 7.0);

        for (i, case) in cases.iter().enumerate() {
            assert_eq!(case.index, i);
        }
    }

    #[test]
    fn names_come_from_positions_not_values() {
        let mut a = axes(1, 1, 1, 2);
        a.inflow_deg = vec![-7.5, 270.0];
        let cases = enumerate_cases(&a, 1).unwrap();
        assert_eq!(cases[0].case_name, "Case00");
        assert_eq!(cases[1].case_name, "Case01");
        assert!(!cases[1].relative_dir().to_string_lossy().contains("270"));
    }

    #[test]
    fn padding_grows_with_axis_length() {
        let cases = enumerate_cases(&axes(1, 1, 1, 120), 1).unwrap();
        assert_eq!(cases[0].case_name, "Case000");
        assert_eq!(cases[119].case_name, "Case119");
        let mut names: Vec<&str> = cases.iter().map(|c| c.case_name.as_str()).collect();
        let sorted = {
            let mut s = names.clone();
            s.sort();
            s
        };
        assert_eq!(names, sorted);
        names.dedup();
        assert_eq!(names.len(), 120);
    }

    #[test]
    fn deterministic_and_unique() {
        let a = enumerate_cases(&axes(3, 2, 2, 3), 4).unwrap();
        let b = enumerate_cases(&axes(3, 2, 2, 3), 4).unwrap();
        assert_eq!(a, b);
        let dirs: HashSet<PathBuf> = a.iter().map(|c| c.relative_dir()).collect();
        assert_eq!(dirs.len(), a.len());
    }

    #[test]
    fn rejects_empty_axis_and_zero_seeds() {
        let err = enumerate_cases(&axes(1, 0, 1, 1), 1).unwrap_err();
        assert!(matches!(err, FfError::Configuration { .. }));
        assert!(err.to_string().contains("shear"));

        let err = enumerate_cases(&axes(1, 1, 1, 1), 0).unwrap_err();
        assert!(matches!(err, FfError::Configuration { .. }));
    }

    #[test]
    fn job_name_is_unique_per_seed() {
        let cases = enumerate_cases(&axes(1, 1, 1, 1), 2).unwrap();
        assert_eq!(cases[0].job_name(), "Cond00_v00_sh00_ti00_Case00_Seed_0");
        assert_ne!(cases[0].job_name(), cases[1].job_name());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #[test]
        fn count_is_product_and_dirs_unique(
            a in 1_usize..4,
            b in 1_usize..4,
            c in 1_usize..4,
            d in 1_usize..4,
            s in 1_usize..5,
        ) {
            let axes = ConditionAxes {
                vhub: vec![10.0; a],
                shear: vec![0.2; b],
                ti: vec![10.0; c],
                inflow_deg: vec![0.0; d],
            };
            let cases = enumerate_cases(&axes, s).unwrap();
            prop_assert_eq!(cases.len(), a * b * c * d * s);
            let dirs: HashSet<PathBuf> = cases.iter().map(|c| c.relative_dir()).collect();
            prop_assert_eq!(dirs.len(), cases.len());
        }
    }
}
