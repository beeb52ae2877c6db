//! Layout model: validated turbine records.

use ff_core::{FfError, FfResult, Real, Tolerances, TurbineId, ensure_positive, nearly_equal};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Turbine {
    pub id: TurbineId,
    pub x: Real,
    pub y: Real,
    pub z: Real,
    /// Rotor diameter.
    pub d: Real,
    pub zhub: Real,
    /// Maximum blade chord.
    pub cmax: Real,
    /// Maximum excitation frequency.
    pub fmax: Real,
    pub cmeander: Real,
    /// Platform heading, 0 when the sweep file leaves it out.
    pub phi_deg: Real,
}

impl Turbine {
    pub fn radius(&self) -> Real {
        0.5 * self.d
    }

    pub fn tip_height(&self) -> Real {
        self.zhub + self.radius()
    }
}

/// Turbine position after rotating the farm for one inflow direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTurbine {
    pub id: TurbineId,
    pub x: Real,
    pub y: Real,
    pub z: Real,
}

/// Turbines keyed by id plus the rotation anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    turbines: BTreeMap<TurbineId, Turbine>,
    reference: TurbineId,
}

impl Layout {
    pub fn new(turbines: Vec<Turbine>, reference: TurbineId) -> FfResult<Self> {
        if turbines.is_empty() {
            return Err(FfError::config("layout has no turbines"));
        }

        let mut map = BTreeMap::new();
        for turbine in turbines {
            validate_turbine(&turbine)?;
            let id = turbine.id;
            if map.insert(id, turbine).is_some() {
                return Err(FfError::config(format!("turbine id {id} appears twice")));
            }
        }

        let tol = Tolerances {
            abs: 1e-6,
            rel: 1e-12,
        };
        let all: Vec<&Turbine> = map.values().collect();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                if nearly_equal(a.x, b.x, tol) && nearly_equal(a.y, b.y, tol) {
                    return Err(FfError::config(format!(
                        "turbines {} and {} share position ({}, {}); spacing would be degenerate",
                        a.id, b.id, a.x, a.y
                    )));
                }
            }
        }

        if !map.contains_key(&reference) {
            return Err(FfError::config(format!(
                "reference turbine {reference} is not part of the layout"
            )));
        }

        Ok(Self {
            turbines: map,
            reference,
        })
    }

    pub fn len(&self) -> usize {
        self.turbines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turbines.is_empty()
    }

    pub fn reference(&self) -> &Turbine {
        &self.turbines[&self.reference]
    }

    pub fn get(&self, id: TurbineId) -> Option<&Turbine> {
        self.turbines.get(&id)
    }

    /// Turbines in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Turbine> {
        self.turbines.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = TurbineId> + '_ {
        self.turbines.keys().copied()
    }

    /// Position of `id` in id order, used for per-turbine table columns.
    pub fn position_of(&self, id: TurbineId) -> Option<usize> {
        self.turbines.keys().position(|k| *k == id)
    }

    pub fn max_d(&self) -> Real {
        self.iter().map(|t| t.d).fold(Real::MIN, Real::max)
    }

    pub fn min_d(&self) -> Real {
        self.iter().map(|t| t.d).fold(Real::MAX, Real::min)
    }

    /// Rotate the farm about the reference turbine so that wind coming from
    /// `inflow_deg` travels along +x of the turbulence boxes.
    pub fn rotated(&self, inflow_deg: Real) -> Vec<PlacedTurbine> {
        let anchor = self.reference();
        let theta = -inflow_deg.to_radians();
        let (sin, cos) = theta.sin_cos();
        self.iter()
            .map(|t| {
                let dx = t.x - anchor.x;
                let dy = t.y - anchor.y;
                PlacedTurbine {
                    id: t.id,
                    x: anchor.x + dx * cos - dy * sin,
                    y: anchor.y + dx * sin + dy * cos,
                    z: t.z,
                }
            })
            .collect()
    }
}

fn validate_turbine(t: &Turbine) -> FfResult<()> {
    for (name, v) in [("x", t.x), ("y", t.y), ("z", t.z), ("phi_deg", t.phi_deg)] {
        if !v.is_finite() {
            return Err(FfError::config(format!(
                "turbine {} {name} must be finite (got {v})",
                t.id
            )));
        }
    }
    ensure_positive(t.d, format!("turbine {} rotor diameter", t.id))?;
    ensure_positive(t.zhub, format!("turbine {} hub height", t.id))?;
    ensure_positive(t.cmax, format!("turbine {} cmax", t.id))?;
    ensure_positive(t.fmax, format!("turbine {} fmax", t.id))?;
    ensure_positive(t.cmeander, format!("turbine {} Cmeander", t.id))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn turbine(id: u32, x: Real, y: Real) -> Turbine {
        Turbine {
            id: TurbineId::new(id),
            x,
            y,
            z: 0.0,
            d: 240.0,
            zhub: 150.0,
            cmax: 5.0,
            fmax: 10.0 / 6.0,
            cmeander: 1.9,
            phi_deg: 0.0,
        }
    }

    #[test]
    fn keeps_id_order() {
        let layout = Layout::new(
            vec![turbine(5, 0.0, 0.0), turbine(1, 100.0, 0.0), turbine(3, 200.0, 0.0)],
            TurbineId::new(3),
        )
        .unwrap();
        let ids: Vec<u32> = layout.ids().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 3, 5]);
        assert_eq!(layout.position_of(TurbineId::new(5)), Some(2));
        assert_eq!(layout.reference().id, TurbineId::new(3));
    }

    #[test]
    fn rejects_missing_reference() {
        let err = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(4)).unwrap_err();
        assert!(matches!(err, FfError::Configuration { .. }));
        assert!(err.to_string().contains("reference turbine 4"));
    }

    #[test]
    fn rejects_coincident_turbines() {
        let err = Layout::new(
            vec![turbine(0, 10.0, 10.0), turbine(1, 10.0, 10.0)],
            TurbineId::new(0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("share position"));
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_geometry() {
        let err = Layout::new(
            vec![turbine(0, 0.0, 0.0), turbine(0, 10.0, 0.0)],
            TurbineId::new(0),
        )
        .unwrap_err();
        assert!(err.to_string().contains("appears twice"));

        let mut bad = turbine(2, 0.0, 0.0);
        bad.cmax = -1.0;
        let err = Layout::new(vec![bad], TurbineId::new(2)).unwrap_err();
        assert!(err.to_string().contains("turbine 2 cmax"));
    }

    #[test]
    fn rotation_about_reference() {
        let layout = Layout::new(
            vec![turbine(0, 100.0, 100.0), turbine(1, 1100.0, 100.0)],
            TurbineId::new(0),
        )
        .unwrap();

        let same = layout.rotated(0.0);
        assert_eq!(same[1].x, 1100.0);
        assert_eq!(same[1].y, 100.0);

        let turned = layout.rotated(90.0);
        assert!((turned[0].x - 100.0).abs() < 1e-9);
        assert!((turned[0].y - 100.0).abs() < 1e-9);
        assert!((turned[1].x - 100.0).abs() < 1e-9);
        assert!((turned[1].y - (100.0 - 1000.0)).abs() < 1e-9);
    }
}
