//! Segmentor: customer segmentation CLI
//!
//! Loads customer points, selects the number of segments from the elbow of
//! the K-Means inertia curve, then reports and plots the ranked segments.

use anyhow::Result;
use clap::Parser;
use segmentor::viz::print_segment_statistics;
use segmentor::{
    run_segmentation, Args, DelimitedFileSource, NoopRenderer, PlottersRenderer, SegmentRenderer,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    init_tracing(args.verbose);

    if args.verbose {
        println!("Segmentor - Customer Segmentation with Elbow Selection");
        println!("======================================================\n");
    }

    run_full_pipeline(&args)
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with --verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "segmentor=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run full segmentation pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== Segmentation Pipeline ===\n");

    let start_time = Instant::now();

    let config = args.segmentation_config()?;
    let fitter = args.fitter();
    let source = DelimitedFileSource::new(&args.input, args.separator_byte()?);

    if args.verbose {
        println!("Input file: {}", args.input);
        println!("Candidate cluster counts: {}..={}", config.k_min, config.k_max);
        println!("Accepted variance: {}%", config.accepted_variance);
        println!("Max iterations: {}", fitter.max_iterations);
        println!("Tolerance: {}", fitter.tolerance);
        println!("Seed: {}", fitter.seed);
        println!("Palette capacity: {}\n", config.palette.len());
    }

    let plotters;
    let renderer: &dyn SegmentRenderer = if args.no_plot {
        &NoopRenderer
    } else {
        plotters = PlottersRenderer::new(&args.output);
        &plotters
    };

    let report = run_segmentation(&source, &fitter, renderer, &config)?;
    let analysis = &report.analysis;

    println!("✓ Data loaded: {} customers", report.points.len());
    println!(
        "✓ Inertia curve built for k = {}..={}",
        analysis.curve.k_min(),
        analysis.curve.k_max()
    );
    println!("✓ Selected {} segments", analysis.cluster_count);

    print_segment_statistics(
        &report.points,
        &analysis.curve,
        analysis.cluster_count,
        analysis.fit.inertia,
        &analysis.summaries,
    );

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());
    if !args.no_plot {
        println!("Segment plot saved to: {}", args.output);
        println!(
            "Elbow chart saved to: {}",
            PlottersRenderer::new(&args.output).elbow_path().display()
        );
    }

    Ok(())
}
