//! Sweep file schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepProject {
    pub version: u32,
    pub name: String,
    /// Root of the generated case tree. Relative paths resolve against the
    /// directory holding the sweep file.
    pub base_path: PathBuf,
    #[serde(default)]
    pub turbine_defaults: TurbineDefaultsDef,
    pub turbines: Vec<TurbineDef>,
    pub reference_turbine: u32,
    pub domain: DomainDef,
    pub sweep: SweepDef,
    #[serde(default)]
    pub inflow: InflowDef,
    pub execution: ExecutionDef,
    pub templates: TemplatesDef,
    #[serde(default)]
    pub scripts: ScriptsDef,
}

/// Values inherited by every turbine that leaves the field out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TurbineDefaultsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zhub_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmax_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmax_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmeander: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurbineDef {
    pub id: u32,
    pub x_m: f64,
    pub y_m: f64,
    #[serde(default)]
    pub z_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zhub_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmax_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmax_hz: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmeander: Option<f64>,
    /// Floating platform heading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phi_deg: Option<f64>,
}

/// Geometry fields a turbine must end up with, either directly or through
/// `turbine_defaults`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurbineField {
    D,
    Zhub,
    Cmax,
    Fmax,
    Cmeander,
}

impl TurbineField {
    pub const ALL: [TurbineField; 5] = [
        TurbineField::D,
        TurbineField::Zhub,
        TurbineField::Cmax,
        TurbineField::Fmax,
        TurbineField::Cmeander,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TurbineField::D => "d_m",
            TurbineField::Zhub => "zhub_m",
            TurbineField::Cmax => "cmax_m",
            TurbineField::Fmax => "fmax_hz",
            TurbineField::Cmeander => "cmeander",
        }
    }
}

impl TurbineDef {
    /// Field value after applying `defaults`.
    pub fn resolved(&self, field: TurbineField, defaults: &TurbineDefaultsDef) -> Option<f64> {
        match field {
            TurbineField::D => self.d_m.or(defaults.d_m),
            TurbineField::Zhub => self.zhub_m.or(defaults.zhub_m),
            TurbineField::Cmax => self.cmax_m.or(defaults.cmax_m),
            TurbineField::Fmax => self.fmax_hz.or(defaults.fmax_hz),
            TurbineField::Cmeander => self.cmeander.or(defaults.cmeander),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainDef {
    pub tmax_s: f64,
    pub zbot_m: f64,
    pub wake_model: WakeModelDef,
    pub n_seeds: u32,
    /// TurbSim random seeds, indexed by seed number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_values: Option<Vec<i64>>,
    #[serde(default)]
    pub sizing: SizingDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WakeModelDef {
    Polar,
    Curl,
    Cartesian,
}

/// Overrides for the domain sizing guidance. Absent fields keep the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SizingDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyquist_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_time_refinement: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meander_dt_divisor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meander_ds_divisor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_chord_fraction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_chord_multiple: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_max_d_fraction: Option<f64>,
    /// Upstream, downstream, -y, +y, above-hub multiples of the largest D.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent_low: Option<[f64; 5]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_low_extent_d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent_high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmeander_reference: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_quantum_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_quantum_m: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub vhub_mps: Vec<f64>,
    pub shear: Vec<f64>,
    pub ti_percent: Vec<f64>,
    pub inflow_deg: Vec<f64>,
    /// One row per inflow direction, one column per turbine (in id order).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaw_init_deg: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InflowDef {
    #[default]
    TurbSim,
    Les {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionDef {
    pub fastfarm_bin: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbsim_bin: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatesDef {
    pub dir: PathBuf,
    #[serde(default)]
    pub files: TemplateFilesDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_library: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydro_data: Option<PathBuf>,
}

/// Template file name per role, relative to `TemplatesDef::dir`.
/// `null` (or an absent key) marks the role as unused for every case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TemplateFilesDef {
    #[serde(default)]
    pub elastodyn: Option<String>,
    #[serde(default)]
    pub simplified_elastodyn: Option<String>,
    #[serde(default)]
    pub hydrodyn: Option<String>,
    #[serde(default)]
    pub moordyn: Option<String>,
    #[serde(default)]
    pub seastate: Option<String>,
    #[serde(default)]
    pub servodyn: Option<String>,
    #[serde(default)]
    pub aerodyn: Option<String>,
    #[serde(default)]
    pub aerodisk: Option<String>,
    #[serde(default)]
    pub subdyn: Option<String>,
    #[serde(default)]
    pub inflowwind: Option<String>,
    #[serde(default)]
    pub beamdyn: Option<String>,
    #[serde(default)]
    pub blade: Option<String>,
    #[serde(default)]
    pub tower: Option<String>,
    #[serde(default)]
    pub turbine: Option<String>,
    #[serde(default)]
    pub controller_input: Option<String>,
    #[serde(default)]
    pub coeff_table: Option<String>,
    #[serde(default)]
    pub fastfarm: Option<String>,
    #[serde(default)]
    pub turbsim_low: Option<String>,
    #[serde(default)]
    pub turbsim_high: Option<String>,
}

impl TemplateFilesDef {
    /// `(role key, file name)` for every role, in a fixed order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 19] {
        [
            ("elastodyn", self.elastodyn.as_deref()),
            ("simplified_elastodyn", self.simplified_elastodyn.as_deref()),
            ("hydrodyn", self.hydrodyn.as_deref()),
            ("moordyn", self.moordyn.as_deref()),
            ("seastate", self.seastate.as_deref()),
            ("servodyn", self.servodyn.as_deref()),
            ("aerodyn", self.aerodyn.as_deref()),
            ("aerodisk", self.aerodisk.as_deref()),
            ("subdyn", self.subdyn.as_deref()),
            ("inflowwind", self.inflowwind.as_deref()),
            ("beamdyn", self.beamdyn.as_deref()),
            ("blade", self.blade.as_deref()),
            ("tower", self.tower.as_deref()),
            ("turbine", self.turbine.as_deref()),
            ("controller_input", self.controller_input.as_deref()),
            ("coeff_table", self.coeff_table.as_deref()),
            ("fastfarm", self.fastfarm.as_deref()),
            ("turbsim_low", self.turbsim_low.as_deref()),
            ("turbsim_high", self.turbsim_high.as_deref()),
        ]
    }
}

/// Submission-script templates. Each is optional; an absent script is not
/// generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScriptsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbsim_low: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbsim_high: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fastfarm: Option<PathBuf>,
}
