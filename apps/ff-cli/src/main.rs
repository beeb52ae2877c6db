use clap::{Parser, Subcommand};
use ff_app::{AppResult, RunOptions, project_service, run_service, starter};
use ff_core::format_real;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(about = "ffsweep CLI - FAST.Farm case sweep generator", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter sweep file and template skeletons
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Validate a sweep file, its layout and its templates
    Validate {
        /// Path to the sweep file (YAML or JSON)
        sweep_path: PathBuf,
    },
    /// Print the computed solver domains
    Domain {
        /// Path to the sweep file (YAML or JSON)
        sweep_path: PathBuf,
    },
    /// List the cases a sweep expands to
    Cases {
        /// Path to the sweep file (YAML or JSON)
        sweep_path: PathBuf,
    },
    /// Generate every case directory
    Setup {
        /// Path to the sweep file (YAML or JSON)
        sweep_path: PathBuf,
        /// Worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init { dir, force } => cmd_init(&dir, force),
        Commands::Validate { sweep_path } => cmd_validate(&sweep_path),
        Commands::Domain { sweep_path } => cmd_domain(&sweep_path),
        Commands::Cases { sweep_path } => cmd_cases(&sweep_path),
        Commands::Setup { sweep_path, jobs } => cmd_setup(&sweep_path, jobs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_init(dir: &Path, force: bool) -> AppResult<()> {
    let written = starter::write_starter(dir, force)?;
    for path in &written {
        println!("  wrote {}", path.display());
    }
    println!("✓ Starter sweep in {}", dir.display());
    Ok(())
}

fn cmd_validate(sweep_path: &Path) -> AppResult<()> {
    println!("Validating sweep: {}", sweep_path.display());
    project_service::load_project(sweep_path)?;
    let plan = run_service::prepare_sweep(sweep_path)?;
    println!(
        "✓ Sweep '{}' is valid: {} turbines, {} cases",
        plan.name,
        plan.inputs.layout.len(),
        plan.cases.len()
    );
    Ok(())
}

fn cmd_domain(sweep_path: &Path) -> AppResult<()> {
    let (layout, domain) = run_service::compute_domain(sweep_path)?;
    let low = &domain.low;
    let [nx, ny, nz] = low.grid.points();
    let [x0, y0, z0] = low.grid.origin;
    println!("Low resolution:");
    println!("  dt = {} s, ds = {} m", format_real(low.dt.value()), format_real(low.ds.value()));
    println!("  origin = ({}, {}, {}) m", format_real(x0), format_real(y0), format_real(z0));
    println!("  points = {nx} x {ny} x {nz}");

    println!("High resolution:");
    println!(
        "{:<8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>14}",
        "Turbine", "dt (s)", "ds (m)", "X0", "Y0", "Z0", "points"
    );
    for turbine in layout.iter() {
        let high = domain.high(turbine.id)?;
        let [px, py, pz] = high.grid.points();
        let [hx, hy, hz] = high.grid.origin;
        println!(
            "{:<8} {:>8} {:>8} {:>10} {:>10} {:>10} {:>14}",
            turbine.id.to_string(),
            format_real(high.dt.value()),
            format_real(high.ds.value()),
            format_real(hx),
            format_real(hy),
            format_real(hz),
            format!("{px}x{py}x{pz}")
        );
    }
    Ok(())
}

fn cmd_cases(sweep_path: &Path) -> AppResult<()> {
    let plan = run_service::prepare_sweep(sweep_path)?;
    println!(
        "{:<6} {:>8} {:>8} {:>8} {:>10}  Directory",
        "Case", "Vhub", "Shear", "TI", "Inflow"
    );
    for case in &plan.cases {
        let c = case.condition;
        println!(
            "{:<6} {:>8} {:>8} {:>8} {:>10}  {}",
            case.index,
            format_real(c.vhub),
            format_real(c.shear),
            format_real(c.ti),
            format_real(c.inflow_deg),
            case.relative_dir().display()
        );
    }
    println!("{} cases", plan.cases.len());
    Ok(())
}

fn cmd_setup(sweep_path: &Path, jobs: Option<usize>) -> AppResult<()> {
    let start = Instant::now();
    let plan = run_service::prepare_sweep(sweep_path)?;
    println!(
        "Generating {} cases under {}",
        plan.cases.len(),
        plan.inputs.base_path.display()
    );

    let summary = run_service::execute_sweep(&plan, &RunOptions { jobs })?;
    for failure in &summary.failed {
        eprintln!(
            "  ✗ case {} ({}): {}",
            failure.case_index,
            failure.dir.display(),
            failure.message
        );
    }
    if !summary.low_boxes.is_empty() {
        println!("  {} shared low-resolution boxes", summary.low_boxes.len());
    }
    for script in &summary.batch_scripts {
        println!("  batch script {}", script.display());
    }
    if let Some(reason) = &summary.batch_error {
        eprintln!("  ✗ batch scripts: {reason}");
    }
    println!(
        "{} of {} cases written in {:.2?}",
        summary.completed.len(),
        summary.total(),
        start.elapsed()
    );
    run_service::require_complete(&summary)?;
    println!("✓ Sweep ready");
    Ok(())
}
