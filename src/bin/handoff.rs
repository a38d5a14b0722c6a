//! Bounded-buffer pipeline demo.
//!
//! Runs N producer threads and one consumer thread over a capacity-10 shared
//! buffer, printing one console line per produced and consumed item.
//!
//! # Usage
//!
//! ```sh
//! handoff --producers 10 --items 10
//! ```

use std::time::Duration;

use handoff::{DEFAULT_CAPACITY, PipelineConfig, PipelineError, run};

fn main() {
    handoff::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("handoff: {message}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = run_pipeline(config) {
        eprintln!("handoff: {e}");
        std::process::exit(1);
    }
}

fn run_pipeline(config: PipelineConfig) -> Result<(), PipelineError> {
    // Item values are the producer-local sequence index, as in the classic
    // exercise: locally sequential, not globally unique.
    let report = run::<u64, DEFAULT_CAPACITY, _>(config, |_, seq| seq as u64)?;

    eprintln!(
        "handoff: drained {} items, final occupancy {}",
        report.drained.len(),
        report.final_occupancy
    );
    Ok(())
}

fn parse_args(args: &[String]) -> Result<PipelineConfig, String> {
    let mut config = PipelineConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--producers" | "-n" => {
                config.producers = parse_value(args, &mut i)?;
            }
            "--items" | "-k" => {
                config.items_per_producer = parse_value(args, &mut i)?;
            }
            "--producer-interval" => {
                config.producer_interval = Duration::from_millis(parse_value(args, &mut i)?);
            }
            "--consumer-interval" => {
                config.consumer_interval = Duration::from_millis(parse_value(args, &mut i)?);
            }
            "--quiet" | "-q" => {
                config.echo = false;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            arg => return Err(format!("unknown argument: {arg}")),
        }
        i += 1;
    }

    Ok(config)
}

/// Parses the value following a flag, advancing the cursor past it.
fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize) -> Result<T, String> {
    let flag = &args[*i];
    *i += 1;
    let value = args
        .get(*i)
        .ok_or_else(|| format!("missing value for {flag}"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: {value}"))
}

fn print_usage() {
    eprintln!(
        r#"handoff - bounded-buffer producer/consumer demo

USAGE:
    handoff [OPTIONS]

OPTIONS:
    -n, --producers <N>            Producer thread count (default: 10)
    -k, --items <K>                Items per producer (default: 10)
        --producer-interval <MS>   Sleep after each put (default: 50)
        --consumer-interval <MS>   Sleep after each take (default: 150)
    -q, --quiet                    Suppress per-item console lines
    -h, --help                     Print this help message

The buffer capacity is fixed at {DEFAULT_CAPACITY} slots.

EXAMPLE:
    handoff --producers 3 --items 2 --producer-interval 10 --consumer-interval 30
"#
    );
}
