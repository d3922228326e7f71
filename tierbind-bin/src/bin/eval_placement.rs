use std::{
    fs::File,
    io::{BufWriter, Write},
    time::Instant,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use tierbind_core::memory::{FormatResidency, NodeResidency, local_node, page_size};
use tierbind_core::util::pages_for;
use tierbind_core::{PlacementMap, Tier, TieredAllocator};

/// CLI arguments for the `eval_placement` binary.
///
/// Exercises tiered allocation end to end: reserve, place, prefault, query
/// residency, release.
#[derive(Debug, Parser, Serialize, Clone)]
struct CliArgs {
    /// The size to allocate per attempt in KB.
    #[clap(long = "size", default_value = "64")]
    size_kb: usize,
    /// Placement pattern: all-local, all-remote, alternate, or halves.
    #[clap(long = "pattern", default_value = "alternate")]
    pattern: String,
    /// The remote NUMA node id (e.g. the CXL-attached node).
    #[clap(long = "remote-node", default_value = "1")]
    remote_node: usize,
    /// Prefault every page so placement is resolved before the query.
    #[clap(long = "prefault")]
    prefault: bool,
    /// The number of allocation attempts to perform.
    #[clap(long = "attempts", default_value = "10")]
    attempts: u32,
    /// Output file for results (JSON format).
    #[clap(long = "output")]
    output: Option<String>,
    /// Verbose output - print per-page residency for every attempt.
    #[clap(long = "verbose", short = 'v')]
    verbose: bool,
}

#[derive(Debug, Serialize, Clone)]
struct PlacementAttempt {
    attempt: u32,
    success: bool,
    duration_ms: u64,
    residency: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct EvaluationResults {
    args: CliArgs,
    date: String,
    local_node: usize,
    page_size: usize,
    total_attempts: u32,
    successful_attempts: u32,
    attempts: Vec<PlacementAttempt>,
}

/// Builds the per-page tier map for a named pattern.
fn build_pattern(pattern: &str, pages: usize) -> Result<Vec<Tier>> {
    let tiers = match pattern {
        "all-local" => vec![Tier::Local; pages],
        "all-remote" => vec![Tier::Remote; pages],
        "alternate" => (0..pages)
            .map(|idx| if idx % 2 == 0 { Tier::Local } else { Tier::Remote })
            .collect(),
        "halves" => (0..pages)
            .map(|idx| if idx < pages / 2 { Tier::Local } else { Tier::Remote })
            .collect(),
        other => bail!("unknown pattern '{}'", other),
    };
    Ok(tiers)
}

fn main() -> Result<()> {
    let progress = tierbind_bin::init_logging_with_progress()?;
    let args = CliArgs::parse();

    let size = args.size_kb * 1024;
    anyhow::ensure!(size > 0, "size must be non-zero");
    let pages = pages_for(size);
    let tiers = build_pattern(&args.pattern, pages)?;
    let allocator = TieredAllocator::new()
        .prefault(args.prefault)
        .progress(progress);

    info!(
        "evaluating pattern '{}' over {} pages, local node {}, remote node {}",
        args.pattern,
        pages,
        local_node(),
        args.remote_node
    );

    let mut results = EvaluationResults {
        args: args.clone(),
        date: chrono::Local::now().to_rfc3339(),
        local_node: local_node(),
        page_size: page_size(),
        total_attempts: args.attempts,
        successful_attempts: 0,
        attempts: Vec::with_capacity(args.attempts as usize),
    };

    for attempt in 0..args.attempts {
        let start = Instant::now();
        let outcome = allocator
            .alloc(size, PlacementMap::new(&tiers), args.remote_node)
            .and_then(|region| {
                let region = region.expect("size is non-zero");
                let residency = region.page_nodes();
                region.dealloc();
                residency
            });
        let duration_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(residency) => {
                let summary = residency.format_residency();
                if args.verbose {
                    info!("attempt {}: {}", attempt, summary);
                }
                results.successful_attempts += 1;
                results.attempts.push(PlacementAttempt {
                    attempt,
                    success: true,
                    duration_ms,
                    residency: Some(summary),
                    error: None,
                });
            }
            Err(e) => {
                warn!("attempt {} failed: {}", attempt, e);
                results.attempts.push(PlacementAttempt {
                    attempt,
                    success: false,
                    duration_ms,
                    residency: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    info!(
        "{}/{} attempts succeeded",
        results.successful_attempts, results.total_attempts
    );
    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("create {}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &results)?;
        writer.flush()?;
        info!("results written to {}", path);
    } else {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}
