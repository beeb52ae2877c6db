//! TurbSim box descriptors.
//!
//! The low-resolution box covers the farm for every inflow direction, so one
//! box per condition and seed is shared by all directions and lives in
//! `<condition>/Seed_<n>/TurbSim`. Each case seed directory gets one
//! high-resolution box per turbine. Only the input files are produced here;
//! running TurbSim is left to the generated batch scripts.

use crate::context::SweepInputs;
use crate::enumerate::Case;
use crate::template::{Template, TokenValues};
use crate::templates::TemplateRole;
use ff_core::{FfError, FfResult, Quantized, Real, TurbineId};
use ff_domain::{GridBox, PlacedTurbine};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Subdirectory holding box inputs.
pub const BOX_DIR: &str = "TurbSim";

/// TurbSim `RandSeed1` values used for the first seeds of every sweep.
pub const DEFAULT_SEEDS: [i64; 6] = [2318573, 122299, 123456, 389432, -432443, 9849898];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxTier {
    Low,
    High(TurbineId),
}

impl BoxTier {
    pub fn file_stem(self) -> String {
        match self {
            Self::Low => "Low".to_string(),
            Self::High(id) => format!("High{}", id.file_tag()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High(_) => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxDescriptor {
    pub tier: BoxTier,
    pub seed: usize,
    pub random_seed: i64,
    /// Box position in the rotated farm frame.
    pub grid: GridBox,
    pub num_grid_y: usize,
    pub num_grid_z: usize,
    pub grid_width: Real,
    pub grid_height: Real,
    /// TurbSim centres the grid vertically on this height.
    pub box_hub_height: Real,
    pub ref_height: Real,
    pub time_step: Real,
    pub analysis_time: Real,
    pub usable_time: Real,
    /// Directory holding [`BOX_DIR`], relative to the sweep base path.
    pub dir: PathBuf,
    /// Input file path relative to `dir`.
    pub input_path: PathBuf,
}

impl BoxDescriptor {
    fn new(
        tier: BoxTier,
        case: &Case,
        inputs: &SweepInputs,
        grid: GridBox,
        ref_height: Real,
        dt: Quantized,
    ) -> FfResult<Self> {
        let dir = match tier {
            BoxTier::Low => low_box_dir(case),
            BoxTier::High(_) => case.relative_dir(),
        };
        let [_, ny, nz] = grid.cells;
        let grid_width = ny as Real * grid.ds;
        let grid_height = nz as Real * grid.ds;
        let tmax = inputs.global.tmax;
        Ok(Self {
            tier,
            seed: case.seed,
            random_seed: inputs.random_seed(case.seed)?,
            grid,
            num_grid_y: ny + 1,
            num_grid_z: nz + 1,
            grid_width,
            grid_height,
            box_hub_height: inputs.global.zbot + 0.5 * grid_height,
            ref_height,
            time_step: dt.value(),
            analysis_time: inputs.domain.low.box_duration(tmax, case.condition.vhub, dt),
            usable_time: tmax,
            dir,
            input_path: Path::new(BOX_DIR).join(format!("{}.inp", tier.file_stem())),
        })
    }

    /// Input file path relative to the sweep base path.
    pub fn base_relative_path(&self) -> PathBuf {
        self.dir.join(&self.input_path)
    }

    pub fn tokens(&self, case: &Case) -> TokenValues {
        let mut v = TokenValues::new();
        v.set_real("vhub", case.condition.vhub)
            .set_real("shear", case.condition.shear)
            .set_real("ti", case.condition.ti)
            .set("box_tier", self.tier.label())
            .set("random_seed", self.random_seed)
            .set("num_grid_y", self.num_grid_y)
            .set("num_grid_z", self.num_grid_z)
            .set_real("grid_width", self.grid_width)
            .set_real("grid_height", self.grid_height)
            .set_real("box_hub_height", self.box_hub_height)
            .set_real("ref_height", self.ref_height)
            .set_real("time_step", self.time_step)
            .set_real("analysis_time", self.analysis_time)
            .set_real("usable_time", self.usable_time);
        if let BoxTier::High(id) = self.tier {
            v.set("turbine_id", id);
        }
        v
    }
}

/// `<condition>/Seed_<n>`: the low-resolution box directory shared by every
/// inflow direction of a condition.
pub fn low_box_dir(case: &Case) -> PathBuf {
    Path::new(&case.condition_name).join(case.seed_dir_name())
}

pub fn setup_low_res_box(case: &Case, inputs: &SweepInputs) -> FfResult<BoxDescriptor> {
    let low = &inputs.domain.low;
    let reference = inputs.layout.reference();
    BoxDescriptor::new(BoxTier::Low, case, inputs, low.grid, reference.zhub, low.dt)
}

pub fn setup_high_res_box(
    case: &Case,
    placed: &PlacedTurbine,
    inputs: &SweepInputs,
) -> FfResult<BoxDescriptor> {
    let high = inputs.domain.high(placed.id)?;
    let turbine = inputs
        .layout
        .get(placed.id)
        .ok_or_else(|| FfError::config(format!("turbine {} is not in the layout", placed.id)))?;
    BoxDescriptor::new(
        BoxTier::High(placed.id),
        case,
        inputs,
        high.placed_at(placed.x, placed.y),
        turbine.zhub,
        high.dt,
    )
}

fn box_template(inputs: &SweepInputs, role: TemplateRole) -> FfResult<&Template> {
    inputs
        .templates
        .get(role)
        .and_then(|t| t.text())
        .ok_or_else(|| {
            FfError::config(format!("TurbSim inflow requires a '{}' template", role.key()))
        })
}

/// Low-resolution descriptor plus its rendered TurbSim input.
pub fn render_low_box(case: &Case, inputs: &SweepInputs) -> FfResult<(BoxDescriptor, String)> {
    let template = box_template(inputs, TemplateRole::TurbSimLow)?;
    let low = setup_low_res_box(case, inputs)?;
    let text = template.render(&low.tokens(case))?;
    Ok((low, text))
}

/// High-resolution descriptors plus rendered TurbSim inputs, one per turbine.
pub fn render_high_boxes(
    case: &Case,
    placed: &[PlacedTurbine],
    inputs: &SweepInputs,
) -> FfResult<Vec<(BoxDescriptor, String)>> {
    let template = box_template(inputs, TemplateRole::TurbSimHigh)?;
    let mut out = Vec::with_capacity(placed.len());
    for p in placed {
        let high = setup_high_res_box(case, p, inputs)?;
        let text = template.render(&high.tokens(case))?;
        out.push((high, text));
    }
    Ok(out)
}

/// `count` distinct seed values: `custom` (or the defaults) first, then
/// values derived from a hash of the seed index.
pub fn resolve_seed_values(custom: Option<&[i64]>, count: usize) -> Vec<i64> {
    let mut seeds: Vec<i64> = custom
        .unwrap_or(&DEFAULT_SEEDS)
        .iter()
        .copied()
        .take(count)
        .collect();
    let mut index = seeds.len();
    while seeds.len() < count {
        let candidate = derived_seed(index);
        if !seeds.contains(&candidate) {
            seeds.push(candidate);
        }
        index += 1;
    }
    seeds
}

fn derived_seed(index: usize) -> i64 {
    let digest = Sha256::digest(format!("ffsweep-seed-{index}").as_bytes());
    let word = i32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    i64::from(word)
}
