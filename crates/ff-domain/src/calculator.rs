//! Domain parameter calculator.
//!
//! One low-resolution domain is shared by the whole farm; every turbine gets
//! its own high-resolution domain. All spacings are snapped so that the
//! low-resolution values are integer multiples of every high-resolution one.

use crate::conditions::ConditionAxes;
use crate::config::GlobalDomainConfig;
use crate::grid::GridBox;
use crate::layout::{Layout, Turbine};
use ff_core::{
    FfError, FfResult, Quantized, Real, Time, TurbineId, ceil_to_multiple, cells_to_cover,
    ensure_finite, floor_to_lattice, hz, in_s, m, mps,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Farm-wide coarse grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LowResDomain {
    pub dt: Quantized,
    pub ds: Quantized,
    pub grid: GridBox,
}

impl LowResDomain {
    /// Length of a turbulence box for one wind speed: the simulated time plus
    /// the time the inflow needs to cross the domain, rounded up to `dt`.
    pub fn box_duration(&self, tmax: Real, vhub: Real, dt: Quantized) -> Real {
        let crossing: Time = m(self.grid.extent()[0]) / mps(vhub);
        ceil_to_multiple(tmax + in_s(crossing), dt.value())
    }
}

/// Per-turbine fine grid. `grid` is centred on the turbine's unrotated
/// position; use [`HighResDomain::placed_at`] for a rotated layout.
///
/// FAST.Farm reads a single `DT_High`, so `dt` is the same for every turbine.
#[derive(Debug, Clone, PartialEq)]
pub struct HighResDomain {
    pub turbine: TurbineId,
    pub dt: Quantized,
    pub ds: Quantized,
    pub grid: GridBox,
}

impl HighResDomain {
    pub fn placed_at(&self, x: Real, y: Real) -> GridBox {
        let e = self.grid.extent();
        GridBox {
            origin: [x - 0.5 * e[0], y - 0.5 * e[1], self.grid.origin[2]],
            ..self.grid
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainParameters {
    pub low: LowResDomain,
    pub high: BTreeMap<TurbineId, HighResDomain>,
}

impl DomainParameters {
    pub fn high(&self, id: TurbineId) -> FfResult<&HighResDomain> {
        self.high.get(&id).ok_or_else(|| {
            FfError::config(format!("no high-resolution domain for turbine {id}"))
        })
    }

    /// Farm-wide high-resolution time step.
    pub fn dt_high(&self) -> Real {
        self.high
            .values()
            .next()
            .map(|h| h.dt.value())
            .unwrap_or_default()
    }
}

pub fn compute_domain_parameters(
    layout: &Layout,
    global: &GlobalDomainConfig,
    axes: &ConditionAxes,
) -> FfResult<DomainParameters> {
    let guidance = &global.sizing;
    guidance.validate()?;
    axes.validate()?;
    ensure_finite(global.zbot, "zbot")?;
    if !global.tmax.is_finite() || global.tmax <= 0.0 {
        return Err(FfError::config(format!(
            "tmax must be positive and finite (got {})",
            global.tmax
        )));
    }
    if global.n_seeds < 1 {
        return Err(FfError::config("n_seeds must be at least 1"));
    }
    if let Some(t) = layout.iter().find(|t| t.zhub - t.radius() <= global.zbot) {
        return Err(FfError::config(format!(
            "turbine {} blade tip reaches below zbot = {}",
            t.id, global.zbot
        )));
    }

    // The fastest turbine sets the one DT_High of the farm.
    let mut dt_high: Option<Quantized> = None;
    let mut ds_highs = BTreeMap::new();
    for turbine in layout.iter() {
        let dt = Quantized::floor(
            nyquist_period(turbine, global) / guidance.high_time_refinement,
            guidance.time_quantum,
            &format!("turbine {} dt_high", turbine.id),
        )?;
        if dt_high.is_none_or(|current| dt.steps() < current.steps()) {
            dt_high = Some(dt);
        }
        let ds = Quantized::floor(
            guidance.high_chord_fraction * turbine.cmax,
            guidance.space_quantum,
            &format!("turbine {} ds_high", turbine.id),
        )?;
        ds_highs.insert(turbine.id, ds);
    }
    let dt_high = dt_high.ok_or_else(|| FfError::config("layout has no turbines"))?;
    let ds_high_values: Vec<Quantized> = ds_highs.values().copied().collect();

    let dt_low = Quantized::floor_common_multiple(
        dt_low_bound(layout, global, axes),
        &[dt_high],
        guidance.time_quantum,
        "dt_low",
    )?;
    let ds_low = Quantized::floor_common_multiple(
        ds_low_target(layout, global, axes, &ds_high_values)?,
        &ds_high_values,
        guidance.space_quantum,
        "ds_low",
    )?;

    let low = LowResDomain {
        dt: dt_low,
        ds: ds_low,
        grid: low_grid(layout, global, axes, ds_low.value()),
    };
    info!(
        dt_low = low.dt.value(),
        ds_low = low.ds.value(),
        dt_high = dt_high.value(),
        nx = low.grid.cells[0],
        ny = low.grid.cells[1],
        nz = low.grid.cells[2],
        "low-resolution domain sized"
    );

    let mut high = BTreeMap::new();
    for turbine in layout.iter() {
        let ds = ds_highs[&turbine.id];
        let domain = HighResDomain {
            turbine: turbine.id,
            dt: dt_high,
            ds,
            grid: high_grid(turbine, global, ds.value()),
        };
        debug!(
            turbine = %turbine.id,
            ds_high = ds.value(),
            cells = ?domain.grid.cells,
            "high-resolution domain sized"
        );
        high.insert(turbine.id, domain);
    }

    let params = DomainParameters { low, high };
    check_high_inside_low(layout, axes, &params)?;
    Ok(params)
}

/// `1 / (nyquist_factor * fmax)` for one turbine.
fn nyquist_period(turbine: &Turbine, global: &GlobalDomainConfig) -> Real {
    let period: Time = (global.sizing.nyquist_factor * hz(turbine.fmax)).recip();
    in_s(period)
}

fn dt_low_bound(layout: &Layout, global: &GlobalDomainConfig, axes: &ConditionAxes) -> Real {
    let guidance = &global.sizing;
    let vmax = mps(axes.max_vhub());
    layout
        .iter()
        .map(|t| {
            let meander: Time = m(t.cmeander * t.d) / (guidance.meander_dt_divisor * vmax);
            nyquist_period(t, global).min(in_s(meander))
        })
        .fold(Real::MAX, Real::min)
}

fn ds_low_target(
    layout: &Layout,
    global: &GlobalDomainConfig,
    axes: &ConditionAxes,
    ds_highs: &[Quantized],
) -> FfResult<Real> {
    let guidance = &global.sizing;
    let vmin = axes.min_vhub();
    let meander = layout
        .iter()
        .map(|t| t.cmeander * t.d * vmin / guidance.meander_ds_divisor)
        .fold(Real::MAX, Real::min);
    let chord = guidance.low_chord_multiple
        * layout.iter().map(|t| t.cmax).fold(Real::MIN, Real::max);

    let lower = ds_highs
        .iter()
        .map(|q| q.value())
        .fold(Real::MIN, Real::max);
    let upper = guidance.low_max_d_fraction * layout.min_d();
    if upper < lower {
        return Err(FfError::Quantization {
            what: "ds_low".to_string(),
            value: upper,
            quantum: lower,
            reason: "guidance upper bound is finer than the coarsest high-resolution spacing"
                .to_string(),
        });
    }
    Ok(meander.min(chord).clamp(lower, upper))
}

fn low_grid(
    layout: &Layout,
    global: &GlobalDomainConfig,
    axes: &ConditionAxes,
    ds: Real,
) -> GridBox {
    let guidance = &global.sizing;
    let [upstream, downstream, y_neg, y_pos, above] = guidance.extent_low;
    let dmax = layout.max_d();

    let mut xmin = Real::MAX;
    let mut xmax = Real::MIN;
    let mut ymin = Real::MAX;
    let mut ymax = Real::MIN;
    for deg in &axes.inflow_deg {
        for placed in layout.rotated(*deg) {
            xmin = xmin.min(placed.x);
            xmax = xmax.max(placed.x);
            ymin = ymin.min(placed.y);
            ymax = ymax.max(placed.y);
        }
    }
    xmin -= upstream * dmax;
    xmax += downstream * dmax;
    ymin -= y_neg * dmax;
    ymax += y_pos * dmax;

    let floor = guidance.min_low_extent_d * dmax;
    widen_to(&mut xmin, &mut xmax, floor);
    widen_to(&mut ymin, &mut ymax, floor);

    let zhub_max = layout.iter().map(|t| t.zhub).fold(Real::MIN, Real::max);
    let tip_max = layout.iter().map(|t| t.tip_height()).fold(Real::MIN, Real::max);
    let ztop = (zhub_max + above * dmax).max(tip_max + ds);

    let x0 = floor_to_lattice(xmin, ds);
    let y0 = floor_to_lattice(ymin, ds);
    GridBox {
        origin: [x0, y0, global.zbot],
        cells: [
            cells_to_cover(xmax - x0, ds),
            cells_to_cover(ymax - y0, ds),
            cells_to_cover(ztop - global.zbot, ds),
        ],
        ds,
    }
}

fn widen_to(lo: &mut Real, hi: &mut Real, min_extent: Real) {
    let extent = *hi - *lo;
    if extent < min_extent {
        let pad = 0.5 * (min_extent - extent);
        *lo -= pad;
        *hi += pad;
    }
}

fn high_grid(turbine: &Turbine, global: &GlobalDomainConfig, ds: Real) -> GridBox {
    let guidance = &global.sizing;
    let side = guidance.extent_high * turbine.d * turbine.cmeander / guidance.cmeander_reference;
    let half = (0.5 * side).max(turbine.radius() + ds);
    let n_half = cells_to_cover(half, ds);
    let ztop = turbine.zhub + half;
    let cells = [
        2 * n_half,
        2 * n_half,
        cells_to_cover(ztop - global.zbot, ds),
    ];
    let half_width = n_half as Real * ds;
    GridBox {
        origin: [turbine.x - half_width, turbine.y - half_width, global.zbot],
        cells,
        ds,
    }
}

fn check_high_inside_low(
    layout: &Layout,
    axes: &ConditionAxes,
    params: &DomainParameters,
) -> FfResult<()> {
    for deg in &axes.inflow_deg {
        for placed in layout.rotated(*deg) {
            let high = params.high(placed.id)?;
            let placed_box = high.placed_at(placed.x, placed.y);
            if !params.low.grid.encloses(&placed_box) {
                return Err(FfError::config(format!(
                    "high-resolution box of turbine {} leaves the low-resolution domain at inflow {deg} deg",
                    placed.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WakeModel;
    use crate::guidance::SizingGuidance;
    use crate::layout::tests::turbine;

    fn global() -> GlobalDomainConfig {
        GlobalDomainConfig {
            zbot: 1.0,
            tmax: 1800.0,
            wake_model: WakeModel::Polar,
            n_seeds: 1,
            sizing: SizingGuidance::default(),
        }
    }

    fn axes(directions: Vec<Real>) -> ConditionAxes {
        ConditionAxes {
            vhub: vec![10.0],
            shear: vec![0.2],
            ti: vec![10.0],
            inflow_deg: directions,
        }
    }

    #[test]
    fn single_turbine_reference_values() {
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(0)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();

        let fmax = 10.0 / 6.0;
        assert!(params.low.dt.value() <= 1.0 / (2.0 * fmax) + 1e-12);
        assert!((params.low.dt.value() - 0.3).abs() < 1e-9);

        let high = params.high(TurbineId::new(0)).unwrap();
        assert!((high.dt.value() - 0.15).abs() < 1e-9);
        assert_eq!(high.ds.value(), 5.0);
        assert!(params.low.dt.is_multiple_of(high.dt));
        assert!(params.low.ds.is_multiple_of(high.ds));

        // min(1.9 * 240 * 10 / 150, 10 * 5) = 30.4 -> 30
        assert_eq!(params.low.ds.value(), 30.0);

        let [nx, ny, nz] = params.low.grid.cells;
        assert!(nx > 0 && ny > 0 && nz > 0);
        let e = params.low.grid.extent();
        assert!(e[0] >= 11.0 * 240.0);
        assert!(e[1] >= 6.0 * 240.0);
        assert!(params.low.grid.end()[2] >= 150.0 + 2.0 * 240.0);
    }

    #[test]
    fn one_high_domain_per_turbine() {
        let layout = Layout::new(
            (0..5).map(|i| turbine(i, 1852.0 * i as Real, 0.0)).collect(),
            TurbineId::new(0),
        )
        .unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();
        assert_eq!(params.high.len(), layout.len());
        for id in layout.ids() {
            assert_eq!(params.high(id).unwrap().turbine, id);
        }
    }

    #[test]
    fn high_box_centred_and_above_tip() {
        let layout = Layout::new(vec![turbine(3, 500.0, -200.0)], TurbineId::new(3)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();
        let high = params.high(TurbineId::new(3)).unwrap();

        let c = high.grid.center();
        assert!((c[0] - 500.0).abs() < 1e-9);
        assert!((c[1] + 200.0).abs() < 1e-9);
        assert_eq!(high.grid.cells[0] % 2, 0);
        // 1.2 * 240 = 288 m side at the reference meandering constant
        assert!(high.grid.extent()[1] >= 288.0);
        assert!(high.grid.end()[2] > 150.0 + 120.0);
        assert_eq!(high.grid.origin[2], 1.0);
    }

    #[test]
    fn independent_high_boxes_for_different_geometry() {
        let mut small = turbine(1, 2000.0, 0.0);
        small.d = 120.0;
        small.zhub = 90.0;
        small.cmax = 3.0;
        small.fmax = 10.0 / 3.0;
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0), small], TurbineId::new(0)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();

        let big = params.high(TurbineId::new(0)).unwrap();
        let small = params.high(TurbineId::new(1)).unwrap();
        assert_ne!(big.ds, small.ds);
        assert_ne!(big.grid.cells, small.grid.cells);
        assert!(params.low.ds.is_multiple_of(big.ds));
        assert!(params.low.ds.is_multiple_of(small.ds));
        assert!(params.low.dt.value() <= 1.0 / (2.0 * 10.0 / 3.0) + 1e-12);
    }

    #[test]
    fn mixed_fmax_shares_the_fastest_dt_high() {
        let mut fast = turbine(1, 2000.0, 0.0);
        fast.fmax = 10.0 / 3.0;
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0), fast], TurbineId::new(0)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();

        // 1 / (2 * 2 * 10/3) = 0.075 for the faster turbine
        assert!((params.dt_high() - 0.075).abs() < 1e-9);
        for high in params.high.values() {
            assert!((high.dt.value() - 0.075).abs() < 1e-9);
            assert!(params.low.dt.is_multiple_of(high.dt));
        }
    }

    #[test]
    fn fine_time_quantum_with_mixed_fmax_does_not_overflow() {
        let mut g = global();
        g.sizing.time_quantum = 1e-6;
        let turbines = [1.6, 1.7, 1.8, 1.9]
            .iter()
            .enumerate()
            .map(|(i, &fmax)| {
                let mut t = turbine(i as u32, 1852.0 * i as Real, 0.0);
                t.fmax = fmax;
                t
            })
            .collect();
        let layout = Layout::new(turbines, TurbineId::new(0)).unwrap();
        match compute_domain_parameters(&layout, &g, &axes(vec![0.0])) {
            Ok(params) => {
                let dt_high = params.high(TurbineId::new(3)).unwrap().dt;
                assert!(params.low.dt.is_multiple_of(dt_high));
                assert!(params.low.dt.value() <= 1.0 / (2.0 * 1.9) + 1e-12);
            }
            Err(err) => assert!(matches!(err, FfError::Quantization { .. }), "{err}"),
        }
    }

    #[test]
    fn nan_zbot_is_non_finite() {
        let mut g = global();
        g.zbot = Real::NAN;
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(0)).unwrap();
        let err = compute_domain_parameters(&layout, &g, &axes(vec![0.0])).unwrap_err();
        assert!(matches!(err, FfError::NonFinite { .. }));
        assert!(err.to_string().contains("zbot"));
    }

    #[test]
    fn low_box_covers_every_direction() {
        let layout = Layout::new(
            vec![turbine(0, 0.0, 0.0), turbine(1, 1852.0, 0.0)],
            TurbineId::new(0),
        )
        .unwrap();
        let aligned = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();
        let swept = compute_domain_parameters(&layout, &global(), &axes(vec![0.0, 90.0])).unwrap();
        assert!(swept.low.grid.extent()[1] > aligned.low.grid.extent()[1]);
        for (deg, placed) in [(90.0, layout.rotated(90.0))] {
            for p in placed {
                let b = swept.high(p.id).unwrap().placed_at(p.x, p.y);
                assert!(swept.low.grid.encloses(&b), "turbine {} at {deg}", p.id);
            }
        }
    }

    #[test]
    fn origin_on_lattice() {
        let layout = Layout::new(vec![turbine(0, 13.0, 7.0)], TurbineId::new(0)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();
        let ds = params.low.ds.value();
        for v in &params.low.grid.origin[..2] {
            let k = v / ds;
            assert!((k - k.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn unreachable_quantum_is_a_quantization_error() {
        let mut g = global();
        g.sizing.time_quantum = 1.0;
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(0)).unwrap();
        let err = compute_domain_parameters(&layout, &g, &axes(vec![0.0])).unwrap_err();
        assert!(matches!(err, FfError::Quantization { .. }));
        assert!(err.to_string().contains("dt_high"));
    }

    #[test]
    fn tip_below_zbot_rejected() {
        let mut g = global();
        g.zbot = 40.0;
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(0)).unwrap();
        let err = compute_domain_parameters(&layout, &g, &axes(vec![0.0])).unwrap_err();
        assert!(matches!(err, FfError::Configuration { .. }));
    }

    #[test]
    fn box_duration_adds_crossing_time() {
        let layout = Layout::new(vec![turbine(0, 0.0, 0.0)], TurbineId::new(0)).unwrap();
        let params = compute_domain_parameters(&layout, &global(), &axes(vec![0.0])).unwrap();
        let crossing = params.low.grid.extent()[0] / 10.0;
        let t = params.low.box_duration(1800.0, 10.0, params.low.dt);
        assert!(t >= 1800.0 + crossing - 1e-9);
        assert!(t < 1800.0 + crossing + params.low.dt.value() + 1e-9);
    }
}
