/* 3rd party libraries */
use clap::Parser;
use log::info;

/* Custom libraries */
use liftsim::config::load_config;
use liftsim::simulation::Simulation;
use liftsim::unwrap_or_exit;

/* Command line */
#[derive(Parser, Debug)]
#[clap(name = "liftsim", about = "Runs an elevator scenario and prints a JSON report")]
struct Args {
    /// Scenario file
    #[clap(long, default_value = "config.toml")]
    config: String,

    /// Overrides the tick count from the scenario
    #[clap(long)]
    ticks: Option<u64>,

    /// Prints the final state of every shaft after the report
    #[clap(long)]
    dump_state: bool,
}

/* Main */
fn main() {
    env_logger::init();
    let args = Args::parse();

    // Load the scenario
    let config = unwrap_or_exit!(load_config(&args.config), args.config);
    let ticks = args.ticks.unwrap_or(config.simulation.ticks);
    info!("Loaded {} with {} shafts", args.config, config.shafts.len());

    // Run it
    let mut simulation = unwrap_or_exit!(Simulation::from_config(&config), "building scenario");
    let report = simulation.run(ticks);

    // Report
    println!("{}", unwrap_or_exit!(serde_json::to_string_pretty(&report)));
    if args.dump_state {
        let snapshot = simulation.dispatcher().snapshot();
        println!("{}", unwrap_or_exit!(serde_json::to_string_pretty(&snapshot)));
    }
}
