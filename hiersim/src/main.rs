use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use clap::Parser;
use hierlib::config::HierarchyConfig;
use hierlib::hierarchy::Hierarchy;
use hierlib::io::read_trace_bytes;
use hierlib::observer::{AccessObserver, EventPrinter, NullObserver};
use hierlib::trace::parse_trace;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Multi-level cache hierarchy simulator"))]
struct Args {
    config: String,
    trace: String,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,

    /// Print each level's final resident blocks after the run
    #[arg(short, long)]
    contents: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    let config_file = File::open(&args.config)
        .map_err(|e| format!("Couldn't open the config file at path {}: {e}", args.config))?;
    let config: HierarchyConfig = serde_json::from_reader(BufReader::new(config_file))
        .map_err(|e| format!("Couldn't parse the config file: {e}"))?;
    let trace_file = File::open(&args.trace)
        .map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace))?;
    let bytes = read_trace_bytes(trace_file)?;
    let entries = parse_trace(&bytes);
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        print_configuration(&config, &args.trace);
    }
    let observer: Box<dyn AccessObserver> = if args.debug {
        Box::new(EventPrinter)
    } else {
        Box::new(NullObserver)
    };
    let mut hierarchy = Hierarchy::with_observer(&config, &entries, observer)
        .map_err(|e| format!("Invalid configuration: {e}"))?;
    hierarchy.run(&entries);
    let report = hierarchy.report();
    println!(
        "{}",
        serde_json::to_string_pretty(&report).map_err(|e| format!("Couldn't serialise the output {e}"))?
    );
    if args.contents {
        print_contents(&hierarchy);
    }
    if args.performance {
        let total_time = start.elapsed();
        let simulation_time = hierarchy.simulation_time();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!(
            "Total execution time (includes initial parsing, configuration, and output): {}s",
            total_time.as_nanos() as f64 / 1e9
        )
    }
    Ok(())
}

fn print_configuration(config: &HierarchyConfig, trace_path: &str) {
    println!("===== Simulator configuration =====");
    println!("{:<23}{}", "BLOCKSIZE:", config.block_size);
    for (position, level) in config.levels.iter().enumerate() {
        let name = match &level.name {
            Some(name) => name.clone(),
            None => format!("L{}", position + 1),
        };
        println!("{:<23}{}", format!("{name}_SIZE:"), level.size);
        println!("{:<23}{}", format!("{name}_ASSOC:"), level.assoc);
    }
    println!("{:<23}{}", "REPLACEMENT_POLICY:", config.replacement_policy);
    println!("{:<23}{}", "INCLUSION_PROPERTY:", config.inclusion);
    println!("{:<23}{}", "trace_file:", trace_path);
}

fn print_contents(hierarchy: &Hierarchy) {
    for level in hierarchy.contents() {
        println!("===== {} contents =====", level.name);
        for (index, set) in level.sets.iter().enumerate() {
            let blocks = set
                .iter()
                .map(|&(block, dirty)| format!("{block:x}{}", if dirty { " D" } else { "" }))
                .reduce(|a, b| format!("{a}, {b}"))
                .unwrap_or_default();
            println!("set {index:>6}: {blocks}");
        }
    }
}
