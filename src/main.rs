use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::io::Read;
use std::path::PathBuf;

use geosim::{Scenario, SimConfig};

/// Greedy geographic routing simulator with a hashed location service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file; read from stdin when omitted
    input: Option<PathBuf>,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop at this time instead of the one in the scenario
    #[arg(short, long)]
    end_time: Option<u64>,

    /// Link kind for automatic adjacency (simple, distance)
    #[arg(long)]
    link_kind: Option<String>,

    /// Drop and list every event still queued after the run
    #[arg(long)]
    flush: bool,

    /// Print deliveries and packet accounting after the run
    #[arg(long)]
    summary: bool,

    /// Print the registered kinds per entity category before the run
    #[arg(long)]
    list_kinds: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .wrap_err_with(|| format!("Failed to load configuration '{}'", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(kind) = &args.link_kind {
        config.link_kind = kind.clone();
    }

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read scenario '{}'", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("Failed to read scenario from stdin")?;
            buf
        }
    };

    let scenario = Scenario::parse_with(&text, config).wrap_err("Failed to parse scenario")?;
    let (mut world, scenario_end) = scenario.build().wrap_err("Failed to set up the world")?;
    let end_time = args.end_time.unwrap_or(scenario_end);

    if args.list_kinds {
        for (category, kinds) in world.kinds() {
            println!("{}: {}", category, kinds.join(", "));
        }
    }

    info!(
        "Running {} nodes, {} links until T={}",
        world.node_count(),
        world.link_count(),
        end_time
    );
    world.start_simulate(end_time).wrap_err("Simulation aborted")?;

    for entry in world.trace() {
        println!("{}", entry);
    }

    if args.flush {
        let flushed = world.flush_events();
        println!("flushed {} events", flushed.len());
        for event in &flushed {
            println!("  {}", event);
        }
    }

    if args.summary {
        println!("{}", world.summary());
        for (node, delivery) in world.deliveries() {
            println!(
                "  delivered {} from {} to {} at {}: {}",
                delivery.packet, delivery.src, node, delivery.at, delivery.msg
            );
        }
        println!("trace hash {:016x}", world.trace_hash());
    }

    Ok(())
}
