#![allow(dead_code)]

use ff_core::TurbineId;
use ff_domain::*;
use ff_sweep::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ff-sweep-it-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn turbine(id: u32, x: f64, y: f64) -> Turbine {
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

fn write_templates(dir: &Path) {
    let files = [
        ("ElastoDyn.T", "NacYaw {{ yaw_deg }}\nPosX {{ turbine_x }}\nDT {{ dt_high }}\n"),
        (
            "Model.fst",
            "EDFile \"{{ elastodyn_file }}\"\nServoFile \"{{ servodyn_file }}\"\nTurbine {{ turbine_id }}\n",
        ),
        (
            "FarmInput.fstf",
            "Mod_AmbWind {{ mod_amb_wind }}\nWindFilePath \"{{ wind_file_path }}\"\n\
             LowBoxDir \"{{ low_box_dir }}\"\nDT_Low {{ dt_low }}\nDT_High {{ dt_high }}\n\
             {{ turbine_table }}\n",
        ),
        (
            "Low.inp",
            "RandSeed1 {{ random_seed }}\nNumGrid_Y {{ num_grid_y }}\nHubHt {{ box_hub_height }}\nAnalysisTime {{ analysis_time }}\nURef {{ vhub }}\n",
        ),
        (
            "High.inp",
            "Turbine {{ turbine_id }}\nRandSeed1 {{ random_seed }}\nTimeStep {{ time_step }}\n",
        ),
        (
            "runFASTFarm.sh",
            "#!/bin/bash\n#SBATCH --job-name={{ job_name }}\ncd {{ work_dir }}\n{{ binary }} {{ input_file }}\n",
        ),
        ("runAllLowBox.sh", "#!/bin/bash\n# {{ n_inputs }}\n{{ inputs }}\n"),
        ("runAllHighBox.sh", "#!/bin/bash\n# {{ n_inputs }}\n{{ inputs }}\n"),
    ];
    for (name, text) in files {
        fs::write(dir.join(name), text).unwrap();
    }
}

pub struct Fixture {
    pub root: PathBuf,
    pub inputs: SweepInputs,
    pub cases: Vec<Case>,
}

pub fn fixture(name: &str, turbines: Vec<Turbine>, inflow: InflowSource) -> Fixture {
    let root = scratch(name);
    let template_dir = root.join("templates");
    fs::create_dir_all(&template_dir).unwrap();
    write_templates(&template_dir);

    let n = turbines.len();
    let layout = Layout::new(turbines, TurbineId::new(0)).unwrap();
    let global = GlobalDomainConfig {
        zbot: 1.0,
        tmax: 600.0,
        wake_model: WakeModel::Polar,
        n_seeds: 2,
        sizing: SizingGuidance::default(),
    };
    let axes = ConditionAxes {
        vhub: vec![8.0, 10.0],
        shear: vec![0.2],
        ti: vec![6.0],
        inflow_deg: vec![-5.0, 5.0],
    };
    let domain = compute_domain_parameters(&layout, &global, &axes).unwrap();

    let mut files: Vec<(TemplateRole, Option<&str>)> = vec![
        (TemplateRole::ElastoDyn, Some("ElastoDyn.T")),
        (TemplateRole::ServoDyn, None),
        (TemplateRole::Turbine, Some("Model.fst")),
        (TemplateRole::FastFarm, Some("FarmInput.fstf")),
    ];
    if inflow == InflowSource::TurbSim {
        files.push((TemplateRole::TurbSimLow, Some("Low.inp")));
        files.push((TemplateRole::TurbSimHigh, Some("High.inp")));
    }
    let templates = TemplateFileSet::load(&template_dir, files, None, None).unwrap();
    let scripts = ScriptTemplates::load(
        Some(&template_dir.join("runAllLowBox.sh")),
        Some(&template_dir.join("runAllHighBox.sh")),
        Some(&template_dir.join("runFASTFarm.sh")),
    )
    .unwrap();

    let yaw_init_deg = Some(vec![vec![0.0; n], (0..n).map(|i| 2.5 * i as f64).collect()]);
    let cases = enumerate_cases(&axes, global.n_seeds).unwrap();
    let inputs = SweepInputs {
        base_path: root.join("sweep"),
        layout,
        seed_values: resolve_seed_values(None, global.n_seeds),
        global,
        axes,
        domain,
        templates,
        scripts,
        inflow,
        execution: Execution {
            fastfarm_bin: PathBuf::from("/opt/openfast/FAST.Farm"),
            turbsim_bin: Some(PathBuf::from("/opt/openfast/turbsim")),
        },
        yaw_init_deg,
    };
    Fixture { root, inputs, cases }
}

pub fn two_turbines() -> Vec<Turbine> {
    vec![turbine(0, 0.0, 0.0), turbine(1, 1200.0, 0.0)]
}

/// Every file under `dir`, keyed by relative path.
pub fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut out = BTreeMap::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        for entry in fs::read_dir(&d).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                out.insert(path.strip_prefix(dir).unwrap().to_path_buf(), fs::read(&path).unwrap());
            }
        }
    }
    out
}
