use gravsim::simulation::diagnostics::{total_momentum, ConservationMonitor, ConservationState};
use gravsim::{bench_gravity, bench_leapfrog, bench_leapfrog_curve};
use gravsim::{Scenario, ScenarioConfig, SimulationStore};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gravsim", about = "Run an N-body gravity scenario")]
struct Args {
    /// Scenario file inside the scenarios/ directory
    #[arg(short, default_value = "two_body.yaml")]
    file_name: String,

    /// Number of ticks to run (overrides the scenario)
    #[arg(short = 'n')]
    ticks: Option<u64>,

    /// Print diagnostics every k ticks (0 = only the summary)
    #[arg(long, default_value_t = 60)]
    report_every: u64,

    /// Save the final state into this store file
    #[arg(long)]
    save: Option<PathBuf>,

    /// List the simulations stored in this file and exit
    #[arg(long)]
    list: Option<PathBuf>,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("cannot open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("cannot parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn list_simulations(path: &PathBuf) -> Result<()> {
    let store = SimulationStore::open_existing(path)
        .with_context(|| format!("cannot read store {}", path.display()))?;
    let sims = store.list_simulations();

    println!("Found {} simulations:", sims.len());
    for sim in sims {
        println!(
            "ID={} | Name={} | G={} | Bodies={} | Created={}",
            sim.id,
            sim.name,
            sim.gravitational_constant,
            store.objects(sim.id).count(),
            sim.created_at.to_rfc3339()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_leapfrog();
        bench_leapfrog_curve();
        return Ok(());
    }

    if let Some(path) = &args.list {
        return list_simulations(path);
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    let ticks = args.ticks.unwrap_or(scenario.ticks);

    println!(
        "gravsim: running {} with {} bodies, {:?}, {} ticks",
        args.file_name,
        scenario.registry.len(),
        scenario.driver.engine().scheme,
        ticks
    );

    let baseline = ConservationState::new(scenario.registry.bodies(), &scenario.driver.config);
    let mut corrections = 0u64;

    for tick in 1..=ticks {
        if let Some(report) = scenario.tick() {
            corrections += u64::from(report.drift_corrected);
        }

        if args.report_every > 0 && tick % args.report_every == 0 {
            let monitor = ConservationMonitor::check(&baseline, scenario.registry.bodies(), &scenario.driver.config);
            println!(
                "tick {:6}: |p| = {:.3e}, energy drift = {:.3e}",
                tick,
                total_momentum(scenario.registry.bodies()).norm(),
                monitor.energy_error
            );
        }
    }

    let monitor = ConservationMonitor::check(&baseline, scenario.registry.bodies(), &scenario.driver.config);
    println!(
        "done: {} steps, {} drift corrections, energy drift {:.3e}, momentum drift {:.3e}",
        scenario.driver.integrator().steps(),
        corrections,
        monitor.energy_error,
        monitor.momentum_error.norm()
    );

    if let Some(path) = &args.save {
        let name = args.file_name.trim_end_matches(".yaml");
        match SimulationStore::open(path)
            .and_then(|mut store| store.save_simulation(name, scenario.driver.config.g(), &scenario.registry))
        {
            Ok(id) => println!("saved as simulation {id} in {}", path.display()),
            Err(e) => eprintln!("save failed, store left unchanged: {e}"),
        }
    }

    Ok(())
}
