//! Command-line driver: sequences the five core components over a PNML
//! file and writes a human-readable report to stdout. Diagnostics and
//! progress go to stderr via the `log` facade.

use clap::Parser;
use safe_net_analyzer::error::AnalysisError;
use safe_net_analyzer::petri_net::ilp::{GoodLpSolver, IntegerSolver};
use safe_net_analyzer::petri_net::oracle::ReachabilityOracle;
use safe_net_analyzer::petri_net::pnml::parse_pnml_file;
use safe_net_analyzer::petri_net::symbolic::{BddEngine, SymbolicEngine};
use safe_net_analyzer::petri_net::PetriNet;
use std::path::PathBuf;
use std::process::ExitCode;

/// Analyzes a 1-safe Place/Transition net: reachability, deadlock
/// detection, and linear optimization over the reachable markings.
#[derive(Debug, Parser)]
#[command(name = "safe_net_analyzer", version, about)]
struct Cli {
    /// Path to a PNML (PT-net) file.
    net: PathBuf,

    /// Comma-separated integer weights, one per place in declaration
    /// order, used as the optimization objective. Defaults to all ones.
    weights: Option<String>,

    /// Raise log verbosity (-v, -vv, -vvv). Independent of the report
    /// written to stdout.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: &Cli) -> Result<(), AnalysisError> {
    let net = parse_pnml_file(&cli.net)?;
    log::info!(
        "parsed {} place(s), {} transition(s) from {}",
        net.places().len(),
        net.transitions().len(),
        cli.net.display()
    );

    let weights = parse_weights(&net, cli.weights.as_deref())?;

    let explicit = net.reachability_analysis();
    println!("{explicit}");

    log::info!("computing symbolic reachable set");
    let reach = BddEngine.compute_reach(&net)?;
    println!(
        "Symbolic reachable set: {} marking(s) (explicit BFS found {})",
        reach.count(),
        explicit.reachable_set().len()
    );
    println!();

    let oracle = ReachabilityOracle::new(&reach);
    let solver = GoodLpSolver;

    match solver.find_deadlock(&net, &oracle)? {
        Some(m) => println!("Deadlock: {m}"),
        None => println!("Deadlock: none (no dead marking is reachable)"),
    }

    match solver.optimize(&net, &oracle, &weights)? {
        Some((m, value)) => println!("Optimum: {m} = {value}"),
        None => println!("Optimum: unreachable (R is empty)"),
    }

    Ok(())
}

/// Reads the optional comma-separated objective vector, defaulting to all
/// ones when absent. A wrong-length vector is a CLI usage error, reported
/// the same way a malformed PNML document would be.
fn parse_weights(net: &PetriNet, raw: Option<&str>) -> Result<Vec<i64>, AnalysisError> {
    let place_count = net.places().len();
    let Some(raw) = raw else {
        return Ok(vec![1; place_count]);
    };
    let weights: Result<Vec<i64>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>())
        .collect();
    let weights = weights.map_err(|e| {
        AnalysisError::InvalidObjective(format!("{raw:?} is not a comma-separated integer list: {e}"))
    })?;
    if weights.len() != place_count {
        return Err(AnalysisError::InvalidObjective(format!(
            "{} weight(s) given but the net has {place_count} place(s)",
            weights.len()
        )));
    }
    Ok(weights)
}
