//! Minimal `{{ token }}` substitution engine for solver input templates.
//!
//! Templates are parsed once at load time; every token is checked against the
//! vocabulary of the scope the template is rendered in, so a typo surfaces as
//! a configuration error before any case directory exists.

use crate::templates::TemplateRole;
use ff_core::{FfError, FfResult, Real, format_real};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Token(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`. Errors carry the 1-based line of the offending token.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let line = line_of(source, consumed + open);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                return Err(format!("unterminated '{{{{' on line {line}"));
            };
            let name = after[..close].trim();
            let valid = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_';
            if name.is_empty() || !name.bytes().all(valid) {
                return Err(format!("invalid token name '{name}' on line {line}"));
            }
            segments.push(Segment::Token(name.to_string()));
            let advance = open + 2 + close + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }
        Ok(Self { segments })
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// First token not available in `scope`, if any.
    pub fn unknown_token(&self, scope: TokenScope) -> Option<&str> {
        self.tokens().find(|t| !scope.allows(t))
    }

    pub fn render(&self, values: &TokenValues) -> FfResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Token(name) => {
                    let value = values.get(name).ok_or_else(|| {
                        FfError::config(format!("token '{name}' has no value in this context"))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn line_of(source: &str, byte: usize) -> usize {
    source[..byte].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Substitution values, keyed by token name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenValues {
    values: BTreeMap<&'static str, String>,
}

impl TokenValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        self.values.insert(key, value.to_string());
        self
    }

    pub fn set_real(&mut self, key: &'static str, value: Real) -> &mut Self {
        self.values.insert(key, format_real(value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

pub const CASE_TOKENS: &[&str] = &[
    "condition_index",
    "case_index",
    "seed",
    "condition_name",
    "case_name",
    "vhub",
    "shear",
    "ti",
    "inflow_deg",
    "tmax",
    "zbot",
    "wake_model",
    "mod_wake",
    "n_turbines",
    "n_seeds",
    "controller_library",
    "hydro_data",
    "low_box_dir",
];

pub const TURBINE_TOKENS: &[&str] = &[
    "turbine_id",
    "turbine_x",
    "turbine_y",
    "turbine_z",
    "rotor_diameter",
    "hub_height",
    "phi_deg",
    "yaw_deg",
    "dt_high",
    "ds_high",
];

pub const FARM_TOKENS: &[&str] = &[
    "turbine_table",
    "dt_low",
    "ds_low",
    "dt_high",
    "x0_low",
    "y0_low",
    "z0_low",
    "nx_low",
    "ny_low",
    "nz_low",
    "mod_amb_wind",
    "wind_file_path",
];

pub const BOX_TOKENS: &[&str] = &[
    "vhub",
    "shear",
    "ti",
    "box_tier",
    "random_seed",
    "num_grid_y",
    "num_grid_z",
    "grid_width",
    "grid_height",
    "box_hub_height",
    "ref_height",
    "time_step",
    "analysis_time",
    "usable_time",
];

pub const JOB_TOKENS: &[&str] = &["job_name", "work_dir", "binary"];

/// Where a template is rendered, and therefore which tokens it may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    /// One copy per turbine.
    Turbine,
    /// One copy per case.
    Farm,
    LowBox,
    HighBox,
    CaseJob,
    BatchJob,
}

impl TokenScope {
    pub fn allows(self, token: &str) -> bool {
        let role_file = || TemplateRole::ALL.iter().any(|r| r.file_token() == token);
        match self {
            Self::Turbine => {
                CASE_TOKENS.contains(&token) || TURBINE_TOKENS.contains(&token) || role_file()
            }
            Self::Farm => {
                CASE_TOKENS.contains(&token) || FARM_TOKENS.contains(&token) || role_file()
            }
            Self::LowBox => BOX_TOKENS.contains(&token),
            Self::HighBox => BOX_TOKENS.contains(&token) || token == "turbine_id",
            Self::CaseJob => {
                JOB_TOKENS.contains(&token) || CASE_TOKENS.contains(&token) || token == "input_file"
            }
            Self::BatchJob => {
                JOB_TOKENS.contains(&token) || token == "inputs" || token == "n_inputs"
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Turbine => "per-turbine",
            Self::Farm => "farm",
            Self::LowBox => "low-resolution box",
            Self::HighBox => "high-resolution box",
            Self::CaseJob => "case job script",
            Self::BatchJob => "batch job script",
        }
    }
}
