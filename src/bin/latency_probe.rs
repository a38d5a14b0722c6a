//! Mutex and semaphore latency instrument.
//!
//! Measures uncontended lock/unlock and acquire/release latencies over a
//! wall-clock window, writes the raw samples to `mutex_temporal.dat` and
//! `semaphore_temporal.dat`, and prints summary statistics.
//!
//! # Usage
//!
//! ```sh
//! latency-probe --duration 60 --pause 1000 --cpu 0
//! ```

use std::time::Duration;

use handoff::latency::{
    LatencySummary, ProbeConfig, probe_mutex, probe_semaphore, summarize, write_samples,
};

const MUTEX_SAMPLES_FILE: &str = "mutex_temporal.dat";
const SEMAPHORE_SAMPLES_FILE: &str = "semaphore_temporal.dat";

fn main() {
    handoff::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("latency-probe: {message}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        eprintln!("latency-probe: {e}");
        std::process::exit(1);
    }
}

fn run(config: &ProbeConfig) -> std::io::Result<()> {
    println!(
        "Measuring MUTEX latencies for {} seconds...",
        config.duration.as_secs()
    );
    let mutex_samples = probe_mutex(config);
    write_samples(&mutex_samples, MUTEX_SAMPLES_FILE)?;

    println!(
        "Measuring SEMAPHORE latencies for {} seconds...",
        config.duration.as_secs()
    );
    let sem_samples = probe_semaphore(config);
    write_samples(&sem_samples, SEMAPHORE_SAMPLES_FILE)?;

    print_summary("MUTEX", &summarize(&mutex_samples));
    print_summary("SEMAPHORE", &summarize(&sem_samples));

    println!("\nTemporal data saved to {MUTEX_SAMPLES_FILE} and {SEMAPHORE_SAMPLES_FILE}");
    Ok(())
}

fn print_summary(label: &str, summary: &LatencySummary) {
    println!("\n=== {label} STATISTICS ===");
    println!("Samples: {}", summary.count);
    println!("Minimum: {} ns", summary.min);
    println!("Maximum: {} ns", summary.max);
    println!("Average: {:.2} ns", summary.mean);
    println!("Std Dev: {:.2} ns", summary.std_dev);
}

fn parse_args(args: &[String]) -> Result<ProbeConfig, String> {
    let mut config = ProbeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--duration" | "-d" => {
                config.duration = Duration::from_secs(parse_value(args, &mut i)?);
            }
            "--pause" | "-p" => {
                config.pause = Duration::from_micros(parse_value(args, &mut i)?);
            }
            "--cpu" | "-c" => {
                config.pin_cpu = Some(parse_value(args, &mut i)?);
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
        r#"latency-probe - mutex/semaphore latency instrument

USAGE:
    latency-probe [OPTIONS]

OPTIONS:
    -d, --duration <SECS>   Measurement window per primitive (default: 60)
    -p, --pause <MICROS>    Pause between samples (default: 1000)
    -c, --cpu <ID>          Pin the sampling thread to a CPU
    -h, --help              Print this help message

OUTPUT:
    {MUTEX_SAMPLES_FILE} / {SEMAPHORE_SAMPLES_FILE} - "<index> <nanoseconds>" per sample
"#
    );
}
