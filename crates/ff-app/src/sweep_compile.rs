//! Compile a validated sweep file into the runtime types of ff-domain and
//! ff-sweep.

use crate::error::{AppError, AppResult};
use crate::project_service::resolve;
use ff_core::TurbineId;
use ff_domain::{ConditionAxes, GlobalDomainConfig, Layout, SizingGuidance, Turbine, WakeModel};
use ff_project::schema::*;
use ff_sweep::{
    Execution, InflowSource, ScriptTemplates, TemplateFileSet, TemplateRole, resolve_seed_values,
};
use std::path::Path;

pub fn build_layout(project: &SweepProject) -> AppResult<Layout> {
    let defaults = &project.turbine_defaults;
    let mut turbines = Vec::with_capacity(project.turbines.len());
    for def in &project.turbines {
        let field = |f: TurbineField| {
            def.resolved(f, defaults).ok_or(ff_project::ValidationError::MissingField {
                turbine: def.id,
                field: f.key(),
            })
        };
        turbines.push(Turbine {
            id: TurbineId::new(def.id),
            x: def.x_m,
            y: def.y_m,
            z: def.z_m,
            d: field(TurbineField::D)?,
            zhub: field(TurbineField::Zhub)?,
            cmax: field(TurbineField::Cmax)?,
            fmax: field(TurbineField::Fmax)?,
            cmeander: field(TurbineField::Cmeander)?,
            phi_deg: def.phi_deg.unwrap_or(0.0),
        });
    }
    Ok(Layout::new(turbines, TurbineId::new(project.reference_turbine))?)
}

pub fn build_sizing(def: &SizingDef) -> SizingGuidance {
    let d = SizingGuidance::default();
    SizingGuidance {
        nyquist_factor: def.nyquist_factor.unwrap_or(d.nyquist_factor),
        high_time_refinement: def.high_time_refinement.unwrap_or(d.high_time_refinement),
        meander_dt_divisor: def.meander_dt_divisor.unwrap_or(d.meander_dt_divisor),
        meander_ds_divisor: def.meander_ds_divisor.unwrap_or(d.meander_ds_divisor),
        high_chord_fraction: def.high_chord_fraction.unwrap_or(d.high_chord_fraction),
        low_chord_multiple: def.low_chord_multiple.unwrap_or(d.low_chord_multiple),
        low_max_d_fraction: def.low_max_d_fraction.unwrap_or(d.low_max_d_fraction),
        extent_low: def.extent_low.unwrap_or(d.extent_low),
        min_low_extent_d: def.min_low_extent_d.unwrap_or(d.min_low_extent_d),
        extent_high: def.extent_high.unwrap_or(d.extent_high),
        cmeander_reference: def.cmeander_reference.unwrap_or(d.cmeander_reference),
        time_quantum: def.time_quantum_s.unwrap_or(d.time_quantum),
        space_quantum: def.space_quantum_m.unwrap_or(d.space_quantum),
    }
}

pub fn build_global(project: &SweepProject) -> AppResult<GlobalDomainConfig> {
    let domain = &project.domain;
    let sizing = build_sizing(&domain.sizing);
    sizing.validate()?;
    Ok(GlobalDomainConfig {
        zbot: domain.zbot_m,
        tmax: domain.tmax_s,
        wake_model: match domain.wake_model {
            WakeModelDef::Polar => WakeModel::Polar,
            WakeModelDef::Curl => WakeModel::Curl,
            WakeModelDef::Cartesian => WakeModel::Cartesian,
        },
        n_seeds: domain.n_seeds as usize,
        sizing,
    })
}

pub fn build_axes(sweep: &SweepDef) -> ConditionAxes {
    ConditionAxes {
        vhub: sweep.vhub_mps.clone(),
        shear: sweep.shear.clone(),
        ti: sweep.ti_percent.clone(),
        inflow_deg: sweep.inflow_deg.clone(),
    }
}

pub fn build_inflow(def: &InflowDef) -> InflowSource {
    match def {
        InflowDef::TurbSim => InflowSource::TurbSim,
        InflowDef::Les { path } => InflowSource::Les { path: path.clone() },
    }
}

pub fn build_execution(def: &ExecutionDef) -> Execution {
    Execution {
        fastfarm_bin: def.fastfarm_bin.clone(),
        turbsim_bin: def.turbsim_bin.clone(),
    }
}

/// Resolve and parse every template. TurbSim templates are skipped for LES
/// inflow.
pub fn build_templates(project: &SweepProject, root: &Path) -> AppResult<TemplateFileSet> {
    let dir = resolve(root, &project.templates.dir);
    let les = matches!(project.inflow, InflowDef::Les { .. });
    let mut files = Vec::new();
    for (key, name) in project.templates.files.entries() {
        let role = TemplateRole::from_key(key)
            .ok_or_else(|| AppError::Project(format!("unknown template role '{key}'")))?;
        if les && role.is_box() {
            continue;
        }
        files.push((role, name));
    }
    Ok(TemplateFileSet::load(
        &dir,
        files,
        project.templates.controller_library.clone(),
        project.templates.hydro_data.clone(),
    )?)
}

pub fn build_scripts(scripts: &ScriptsDef, root: &Path) -> AppResult<ScriptTemplates> {
    let low = scripts.turbsim_low.as_deref().map(|p| resolve(root, p));
    let high = scripts.turbsim_high.as_deref().map(|p| resolve(root, p));
    let fastfarm = scripts.fastfarm.as_deref().map(|p| resolve(root, p));
    Ok(ScriptTemplates::load(
        low.as_deref(),
        high.as_deref(),
        fastfarm.as_deref(),
    )?)
}

pub fn build_seed_values(domain: &DomainDef) -> Vec<i64> {
    resolve_seed_values(domain.seed_values.as_deref(), domain.n_seeds as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_layout_uses_defaults() {
        let project = example_project_def();
        let layout = build_layout(&project).unwrap();
        assert_eq!(layout.len(), 12);
        assert_eq!(layout.reference().id, TurbineId::new(0));
        assert!(layout.iter().all(|t| t.d == 240.0 && t.zhub == 150.0));
    }

    #[test]
    fn sizing_overrides_replace_only_given_fields() {
        let def = SizingDef {
            extent_high: Some(1.5),
            ..SizingDef::default()
        };
        let sizing = build_sizing(&def);
        assert_eq!(sizing.extent_high, 1.5);
        assert_eq!(sizing.time_quantum, SizingGuidance::default().time_quantum);
    }

    #[test]
    fn seed_values_extend_custom_list() {
        let mut project = example_project_def();
        project.domain.seed_values = Some(vec![11, 12]);
        project.domain.n_seeds = 3;
        let seeds = build_seed_values(&project.domain);
        assert_eq!(&seeds[..2], &[11, 12]);
        assert_eq!(seeds.len(), 3);
    }

    fn example_project_def() -> SweepProject {
        ff_project::example_project()
    }
}
