//! Starter sweep: the reference project plus a skeleton of every template it
//! names, so that `init` produces something `setup` can run.

use crate::error::{AppError, AppResult};
use crate::project_service::save_project;
use ff_project::example_project;
use std::path::{Path, PathBuf};

pub const SWEEP_FILE: &str = "sweep.yaml";

const STARTER_TEMPLATES: &[(&str, &str)] = &[
    (
        "ElastoDyn.T",
        "------- ELASTODYN INPUT FILE -------\n\
         {{ case_name }} seed {{ seed }}, turbine {{ turbine_id }}\n\
         {{ dt_high }}   DT\n\
         {{ yaw_deg }}   NacYaw\n\
         {{ phi_deg }}   PtfmYaw\n\
         {{ hub_height }}   HubHt (informational)\n\
         \"{{ tower_file }}\"   TwrFile\n",
    ),
    (
        "ServoDyn.T",
        "------- SERVODYN INPUT FILE -------\n\
         {{ dt_high }}   DT\n\
         \"{{ controller_library }}\"   DLL_FileName\n\
         \"{{ controller_input_file }}\"   DLL_InFile\n",
    ),
    (
        "AeroDyn.dat",
        "------- AERODYN INPUT FILE -------\n\
         ! wake model: {{ wake_model }}\n\
         \"{{ blade_file }}\"   ADBlFile(1)\n\
         \"{{ blade_file }}\"   ADBlFile(2)\n\
         \"{{ blade_file }}\"   ADBlFile(3)\n",
    ),
    (
        "AeroDisk.dat",
        "------- AERODISK INPUT FILE -------\n\"{{ coeff_table_file }}\"   CpCtCqFile\n",
    ),
    ("SubDyn.dat", "------- SUBDYN INPUT FILE -------\n"),
    (
        "InflowWind.dat",
        "------- INFLOWWIND INPUT FILE -------\n\
         {{ vhub }}   HWindSpeed\n\
         {{ shear }}   PLExp\n",
    ),
    ("Blade.dat", "------- BLADE DEFINITION -------\n"),
    ("Tower.dat", "------- TOWER DEFINITION -------\n"),
    (
        "Model.T",
        "------- OPENFAST INPUT FILE -------\n\
         {{ dt_high }}   DT\n\
         \"{{ elastodyn_file }}\"   EDFile\n\
         \"{{ inflowwind_file }}\"   InflowFile\n\
         \"{{ aerodyn_file }}\"   AeroFile\n\
         \"{{ servodyn_file }}\"   ServoFile\n\
         \"{{ hydrodyn_file }}\"   HydroFile\n\
         \"{{ subdyn_file }}\"   SubFile\n",
    ),
    ("DISCON.IN", "! controller parameters\n"),
    ("CpCtCq.csv", "pitch,tsr,cp,ct,cq\n"),
    (
        "Model_FFarm.fstf",
        "------- FAST.Farm INPUT FILE -------\n\
         {{ condition_name }} {{ case_name }} seed {{ seed }}\n\
         {{ tmax }}   TMax\n\
         {{ mod_amb_wind }}   Mod_AmbWind\n\
         {{ n_turbines }}   NumTurbines\n\
         WT_X WT_Y WT_Z WT_FASTInFile X0_High Y0_High Z0_High dX_High dY_High dZ_High\n\
         {{ turbine_table }}\n\
         \"{{ wind_file_path }}\"   WindFilePath\n\
         {{ dt_low }}   DT_Low\n\
         {{ dt_high }}   DT_High\n\
         {{ nx_low }}   NX_Low\n\
         {{ ny_low }}   NY_Low\n\
         {{ nz_low }}   NZ_Low\n\
         {{ x0_low }}   X0_Low\n\
         {{ y0_low }}   Y0_Low\n\
         {{ z0_low }}   Z0_Low\n\
         {{ ds_low }}   dX_Low\n\
         {{ ds_low }}   dY_Low\n\
         {{ ds_low }}   dZ_Low\n\
         {{ mod_wake }}   Mod_Wake\n",
    ),
    (
        "template_Low_InflowXX_SeedY.inp",
        "------- TurbSim INPUT FILE (low resolution) -------\n\
         {{ random_seed }}   RandSeed1\n\
         {{ num_grid_z }}   NumGrid_Z\n\
         {{ num_grid_y }}   NumGrid_Y\n\
         {{ time_step }}   TimeStep\n\
         {{ analysis_time }}   AnalysisTime\n\
         {{ usable_time }}   UsableTime\n\
         {{ box_hub_height }}   HubHt\n\
         {{ grid_height }}   GridHeight\n\
         {{ grid_width }}   GridWidth\n\
         {{ ti }}   IECturbc\n\
         {{ ref_height }}   RefHt\n\
         {{ vhub }}   URef\n\
         {{ shear }}   PLExp\n",
    ),
    (
        "template_HighT1_InflowXX_SeedY.inp",
        "------- TurbSim INPUT FILE (high resolution, turbine {{ turbine_id }}) -------\n\
         {{ random_seed }}   RandSeed1\n\
         {{ num_grid_z }}   NumGrid_Z\n\
         {{ num_grid_y }}   NumGrid_Y\n\
         {{ time_step }}   TimeStep\n\
         {{ analysis_time }}   AnalysisTime\n\
         {{ usable_time }}   UsableTime\n\
         {{ box_hub_height }}   HubHt\n\
         {{ grid_height }}   GridHeight\n\
         {{ grid_width }}   GridWidth\n\
         {{ ti }}   IECturbc\n\
         {{ ref_height }}   RefHt\n\
         {{ vhub }}   URef\n\
         {{ shear }}   PLExp\n",
    ),
    (
        "runAllLowBox.sh",
        "#!/bin/bash\n\
         #SBATCH --job-name={{ job_name }}\n\
         #SBATCH --nodes=1\n\
         cd {{ work_dir }}\n\
         # {{ n_inputs }} boxes\n\
         while read -r inp; do\n\
         \x20 {{ binary }} \"$inp\" > \"${inp%.inp}.log\" 2>&1 &\n\
         done <<'EOF'\n\
         {{ inputs }}\n\
         EOF\n\
         wait\n",
    ),
    (
        "runAllHighBox.sh",
        "#!/bin/bash\n\
         #SBATCH --job-name={{ job_name }}\n\
         #SBATCH --nodes=1\n\
         cd {{ work_dir }}\n\
         # {{ n_inputs }} boxes\n\
         while read -r inp; do\n\
         \x20 {{ binary }} \"$inp\" > \"${inp%.inp}.log\" 2>&1 &\n\
         done <<'EOF'\n\
         {{ inputs }}\n\
         EOF\n\
         wait\n",
    ),
    (
        "runFASTFarm.sh",
        "#!/bin/bash\n\
         #SBATCH --job-name={{ job_name }}\n\
         #SBATCH --nodes=1\n\
         # vhub {{ vhub }} m/s, shear {{ shear }}, TI {{ ti }}%, inflow {{ inflow_deg }} deg\n\
         cd {{ work_dir }}\n\
         if [ -f {{ low_box_dir }}/Low.bts ]; then ln -sf ../{{ low_box_dir }}/Low.bts TurbSim/Low.bts; fi\n\
         {{ binary }} {{ input_file }} > log.fastfarm.txt 2>&1\n",
    ),
];

/// Write `sweep.yaml` and `templates/` under `dir`. Existing files are left
/// alone unless `force` is set.
pub fn write_starter(dir: &Path, force: bool) -> AppResult<Vec<PathBuf>> {
    let template_dir = dir.join("templates");
    std::fs::create_dir_all(&template_dir).map_err(|e| AppError::ProjectFileWrite {
        path: template_dir.clone(),
        source: e,
    })?;

    let mut written = Vec::new();
    let sweep_file = dir.join(SWEEP_FILE);
    if force || !sweep_file.exists() {
        save_project(&sweep_file, &example_project())?;
        written.push(sweep_file);
    }
    for (name, text) in STARTER_TEMPLATES {
        let path = template_dir.join(name);
        if !force && path.exists() {
            continue;
        }
        std::fs::write(&path, text).map_err(|e| AppError::ProjectFileWrite {
            path: path.clone(),
            source: e,
        })?;
        written.push(path);
    }
    Ok(written)
}
