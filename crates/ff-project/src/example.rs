//! Reference sweep: twelve 15 MW-class turbines on a 1852 m grid.

use crate::schema::*;
use std::path::PathBuf;

const TURBINE_POSITIONS: [(f64, f64); 12] = [
    (0.0, 0.0),
    (1852.0, 0.0),
    (3704.0, 0.0),
    (5556.0, 0.0),
    (7408.0, 0.0),
    (1852.0, 1852.0),
    (3704.0, 1852.0),
    (5556.0, 1852.0),
    (7408.0, 1852.0),
    (3704.0, 3704.0),
    (5556.0, 3704.0),
    (7408.0, 3704.0),
];

pub fn example_project() -> SweepProject {
    let turbines = TURBINE_POSITIONS
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| TurbineDef {
            id: i as u32,
            x_m: x,
            y_m: y,
            z_m: 0.0,
            d_m: None,
            zhub_m: None,
            cmax_m: None,
            fmax_hz: None,
            cmeander: None,
            phi_deg: None,
        })
        .collect();

    SweepProject {
        version: LATEST_VERSION,
        name: "12-turbine reference farm".to_string(),
        base_path: PathBuf::from("cases"),
        turbine_defaults: TurbineDefaultsDef {
            d_m: Some(240.0),
            zhub_m: Some(150.0),
            cmax_m: Some(5.0),
            fmax_hz: Some(10.0 / 6.0),
            cmeander: Some(1.9),
        },
        turbines,
        reference_turbine: 0,
        domain: DomainDef {
            tmax_s: 1800.0,
            zbot_m: 1.0,
            wake_model: WakeModelDef::Polar,
            n_seeds: 6,
            seed_values: None,
            sizing: SizingDef::default(),
        },
        sweep: SweepDef {
            vhub_mps: vec![10.0],
            shear: vec![0.2],
            ti_percent: vec![10.0],
            inflow_deg: vec![0.0],
            yaw_init_deg: None,
        },
        inflow: InflowDef::TurbSim,
        execution: ExecutionDef {
            fastfarm_bin: PathBuf::from("/full/path/to/bin/FAST.Farm"),
            turbsim_bin: Some(PathBuf::from("/full/path/to/bin/turbsim")),
        },
        templates: TemplatesDef {
            dir: PathBuf::from("templates"),
            files: TemplateFilesDef {
                elastodyn: Some("ElastoDyn.T".to_string()),
                servodyn: Some("ServoDyn.T".to_string()),
                aerodyn: Some("AeroDyn.dat".to_string()),
                aerodisk: Some("AeroDisk.dat".to_string()),
                subdyn: Some("SubDyn.dat".to_string()),
                inflowwind: Some("InflowWind.dat".to_string()),
                blade: Some("Blade.dat".to_string()),
                tower: Some("Tower.dat".to_string()),
                turbine: Some("Model.T".to_string()),
                controller_input: Some("DISCON.IN".to_string()),
                coeff_table: Some("CpCtCq.csv".to_string()),
                fastfarm: Some("Model_FFarm.fstf".to_string()),
                turbsim_low: Some("template_Low_InflowXX_SeedY.inp".to_string()),
                turbsim_high: Some("template_HighT1_InflowXX_SeedY.inp".to_string()),
                ..TemplateFilesDef::default()
            },
            controller_library: Some(PathBuf::from("/full/path/to/controller/libdiscon.so")),
            hydro_data: None,
        },
        scripts: ScriptsDef {
            turbsim_low: Some(PathBuf::from("templates/runAllLowBox.sh")),
            turbsim_high: Some(PathBuf::from("templates/runAllHighBox.sh")),
            fastfarm: Some(PathBuf::from("templates/runFASTFarm.sh")),
        },
    }
}
