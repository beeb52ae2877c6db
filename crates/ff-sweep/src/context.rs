//! Everything a sweep needs, resolved and validated, plus the token values
//! derived from it for one case.

use crate::boxes::BOX_DIR;
use crate::enumerate::Case;
use crate::jobs::CASE_SCRIPT;
use crate::template::{Template, TokenScope, TokenValues};
use crate::templates::{TemplateFileSet, TemplateRole};
use crate::writer::{COMPLETE_MARKER, INCOMPLETE_MARKER};
use ff_core::{FfError, FfResult, Real, TurbineId, format_real};
use ff_domain::{ConditionAxes, DomainParameters, GlobalDomainConfig, Layout, PlacedTurbine};
use std::fs;
use std::path::{Path, PathBuf};

/// Source of the ambient wind FAST.Farm reads.
#[derive(Debug, Clone, PartialEq)]
pub enum InflowSource {
    /// Boxes generated by TurbSim: one low-resolution box per condition and
    /// seed, high-resolution boxes per case.
    TurbSim,
    /// Precursor LES output; no box inputs are generated.
    Les { path: PathBuf },
}

impl InflowSource {
    /// FAST.Farm `Mod_AmbWind`.
    pub fn mod_amb_wind(&self) -> u8 {
        match self {
            Self::TurbSim => 3,
            Self::Les { .. } => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub fastfarm_bin: PathBuf,
    pub turbsim_bin: Option<PathBuf>,
}

/// Parsed submission-script templates; `None` skips that script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptTemplates {
    pub turbsim_low: Option<Template>,
    pub turbsim_high: Option<Template>,
    pub fastfarm: Option<Template>,
}

impl ScriptTemplates {
    pub fn load(
        turbsim_low: Option<&Path>,
        turbsim_high: Option<&Path>,
        fastfarm: Option<&Path>,
    ) -> FfResult<Self> {
        Ok(Self {
            turbsim_low: load_script("script turbsim_low", turbsim_low, TokenScope::BatchJob)?,
            turbsim_high: load_script("script turbsim_high", turbsim_high, TokenScope::BatchJob)?,
            fastfarm: load_script("script fastfarm", fastfarm, TokenScope::CaseJob)?,
        })
    }
}

fn load_script(role: &str, path: Option<&Path>, scope: TokenScope) -> FfResult<Option<Template>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).map_err(|_| FfError::MissingTemplate {
        role: role.to_string(),
        path: path.to_path_buf(),
    })?;
    let template = Template::parse(&text)
        .map_err(|e| FfError::config(format!("{role} {}: {e}", path.display())))?;
    if let Some(token) = template.unknown_token(scope) {
        return Err(FfError::config(format!(
            "{role} {} uses token '{token}', which is not available in {} templates",
            path.display(),
            scope.label()
        )));
    }
    Ok(Some(template))
}

#[derive(Debug, Clone)]
pub struct SweepInputs {
    pub base_path: PathBuf,
    pub layout: Layout,
    pub global: GlobalDomainConfig,
    pub axes: ConditionAxes,
    pub domain: DomainParameters,
    pub templates: TemplateFileSet,
    pub scripts: ScriptTemplates,
    pub inflow: InflowSource,
    pub execution: Execution,
    /// TurbSim `RandSeed1` per seed index; at least `n_seeds` long.
    pub seed_values: Vec<i64>,
    /// Initial yaw per inflow direction, one value per turbine in id order.
    pub yaw_init_deg: Option<Vec<Vec<Real>>>,
}

impl SweepInputs {
    /// Cross-checks between otherwise independently valid inputs.
    pub fn validate(&self) -> FfResult<()> {
        if self.seed_values.len() < self.global.n_seeds {
            return Err(FfError::config(format!(
                "{} seed values for {} seeds",
                self.seed_values.len(),
                self.global.n_seeds
            )));
        }
        if let InflowSource::TurbSim = self.inflow {
            for role in [TemplateRole::TurbSimLow, TemplateRole::TurbSimHigh] {
                if self.templates.get(role).is_none() {
                    return Err(FfError::config(format!(
                        "TurbSim inflow requires a '{}' template",
                        role.key()
                    )));
                }
            }
            if (self.scripts.turbsim_low.is_some() || self.scripts.turbsim_high.is_some())
                && self.execution.turbsim_bin.is_none()
            {
                return Err(FfError::config(
                    "TurbSim batch scripts require execution.turbsim_bin",
                ));
            }
        }
        if self.templates.get(TemplateRole::FastFarm).is_none() {
            return Err(FfError::config("a 'fastfarm' template is required"));
        }
        self.check_output_names()?;
        if let Some(rows) = &self.yaw_init_deg {
            if rows.len() != self.axes.inflow_deg.len() {
                return Err(FfError::config(format!(
                    "yaw_init_deg has {} rows for {} inflow directions",
                    rows.len(),
                    self.axes.inflow_deg.len()
                )));
            }
            if let Some(row) = rows.iter().find(|r| r.len() != self.layout.len()) {
                return Err(FfError::config(format!(
                    "yaw_init_deg row has {} values for {} turbines",
                    row.len(),
                    self.layout.len()
                )));
            }
        }
        Ok(())
    }

    /// Names reserved in every case directory: markers, the job script and
    /// the box directory.
    fn check_output_names(&self) -> FfResult<()> {
        let ids: Vec<TurbineId> = self.layout.ids().collect();
        let mut reserved = vec![COMPLETE_MARKER, INCOMPLETE_MARKER];
        if self.scripts.fastfarm.is_some() {
            reserved.push(CASE_SCRIPT);
        }
        if self.inflow == InflowSource::TurbSim {
            reserved.push(BOX_DIR);
        }
        self.templates.check_output_names(&ids, &reserved)
    }

    pub fn case_dir(&self, case: &Case) -> PathBuf {
        self.base_path.join(case.relative_dir())
    }

    pub fn yaw_deg(&self, case: &Case, turbine: TurbineId) -> Real {
        let Some(rows) = &self.yaw_init_deg else {
            return 0.0;
        };
        let col = self.layout.position_of(turbine);
        rows.get(case.axis.inflow)
            .zip(col)
            .and_then(|(row, col)| row.get(col).copied())
            .unwrap_or(0.0)
    }

    pub fn random_seed(&self, seed: usize) -> FfResult<i64> {
        self.seed_values
            .get(seed)
            .copied()
            .ok_or_else(|| FfError::config(format!("no seed value for seed index {seed}")))
    }

    pub fn case_tokens(&self, case: &Case) -> TokenValues {
        let mut v = TokenValues::new();
        let c = case.condition;
        v.set("condition_index", case.condition_index)
            .set("case_index", case.index)
            .set("seed", case.seed)
            .set("condition_name", &case.condition_name)
            .set("case_name", &case.case_name)
            .set_real("vhub", c.vhub)
            .set_real("shear", c.shear)
            .set_real("ti", c.ti)
            .set_real("inflow_deg", c.inflow_deg)
            .set_real("tmax", self.global.tmax)
            .set_real("zbot", self.global.zbot)
            .set("wake_model", self.global.wake_model.label())
            .set("mod_wake", self.global.wake_model.mod_wake())
            .set("n_turbines", self.layout.len())
            .set("n_seeds", self.global.n_seeds)
            .set("controller_library", path_or_unused(self.templates.controller_library.as_deref()))
            .set("hydro_data", path_or_unused(self.templates.hydro_data.as_deref()))
            .set("low_box_dir", self.low_box_dir(case));
        v
    }

    /// Shared low-resolution box directory, relative to the case directory.
    fn low_box_dir(&self, case: &Case) -> String {
        match self.inflow {
            InflowSource::TurbSim => format!("../../{}/{BOX_DIR}", case.seed_dir_name()),
            InflowSource::Les { .. } => "unused".to_string(),
        }
    }

    fn role_file_tokens(&self, turbine: TurbineId, values: &mut TokenValues) {
        for role in TemplateRole::ALL {
            values.set(role.file_token(), self.templates.file_reference(role, turbine));
        }
    }

    pub fn turbine_tokens(&self, case: &Case, placed: &PlacedTurbine) -> FfResult<TokenValues> {
        let turbine = self
            .layout
            .get(placed.id)
            .ok_or_else(|| FfError::config(format!("turbine {} is not in the layout", placed.id)))?;
        let high = self.domain.high(placed.id)?;

        let mut v = self.case_tokens(case);
        v.set("turbine_id", placed.id)
            .set_real("turbine_x", placed.x)
            .set_real("turbine_y", placed.y)
            .set_real("turbine_z", placed.z)
            .set_real("rotor_diameter", turbine.d)
            .set_real("hub_height", turbine.zhub)
            .set_real("phi_deg", turbine.phi_deg)
            .set_real("yaw_deg", self.yaw_deg(case, placed.id))
            .set_real("dt_high", high.dt.value())
            .set_real("ds_high", high.ds.value());
        self.role_file_tokens(placed.id, &mut v);
        Ok(v)
    }

    pub fn farm_tokens(&self, case: &Case, placed: &[PlacedTurbine]) -> FfResult<TokenValues> {
        let low = &self.domain.low;
        let mut v = self.case_tokens(case);
        v.set("turbine_table", self.turbine_table(placed)?)
            .set_real("dt_low", low.dt.value())
            .set_real("ds_low", low.ds.value())
            .set_real("dt_high", self.domain.dt_high())
            .set_real("x0_low", low.grid.origin[0])
            .set_real("y0_low", low.grid.origin[1])
            .set_real("z0_low", low.grid.origin[2])
            .set("nx_low", low.grid.points()[0])
            .set("ny_low", low.grid.points()[1])
            .set("nz_low", low.grid.points()[2])
            .set("mod_amb_wind", self.inflow.mod_amb_wind())
            .set("wind_file_path", self.wind_file_path());
        self.role_file_tokens(self.layout.reference().id, &mut v);
        Ok(v)
    }

    /// FAST.Farm `WindFilePath`, relative to the case directory for TurbSim.
    fn wind_file_path(&self) -> String {
        match &self.inflow {
            InflowSource::TurbSim => BOX_DIR.to_string(),
            InflowSource::Les { path } => path.display().to_string(),
        }
    }

    /// Rows of the FAST.Farm `WT_X WT_Y WT_Z WT_FASTInFile X0_High Y0_High
    /// Z0_High dX_High dY_High dZ_High` table.
    fn turbine_table(&self, placed: &[PlacedTurbine]) -> FfResult<String> {
        let mut rows = Vec::with_capacity(placed.len());
        for p in placed {
            let high = self.domain.high(p.id)?;
            let grid = high.placed_at(p.x, p.y);
            let ds = format_real(high.ds.value());
            rows.push(format!(
                "{} {} {} \"{}\" {} {} {} {ds} {ds} {ds}",
                format_real(p.x),
                format_real(p.y),
                format_real(p.z),
                self.templates.file_reference(TemplateRole::Turbine, p.id),
                format_real(grid.origin[0]),
                format_real(grid.origin[1]),
                format_real(grid.origin[2]),
            ));
        }
        Ok(rows.join("\n"))
    }
}

fn path_or_unused(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "unused".to_string())
}
