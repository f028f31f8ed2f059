//! compendium_map command-line interface

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;
use log::{info, LevelFilter};

use compendium_map::cli::{Cli, ColorBy, Commands};
use compendium_map::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Some(Commands::Process {
            config,
            config_file,
            raw_dir,
            output_dir,
            min_expression,
            variance_percentile,
            threads,
        }) => run_process_command(
            &config,
            config_file.as_deref(),
            raw_dir.as_deref(),
            output_dir.as_deref(),
            min_expression,
            variance_percentile,
            threads,
        ),
        Some(Commands::Layout {
            config,
            config_file,
            expression,
            output,
            seed,
        }) => run_layout_command(
            &config,
            config_file.as_deref(),
            expression.as_deref(),
            output.as_deref(),
            seed,
        ),
        Some(Commands::Plot {
            config,
            config_file,
            layout,
            clinical,
            by,
            label_column,
            title,
            hide,
            output,
        }) => run_plot(
            &config,
            config_file.as_deref(),
            layout.as_deref(),
            clinical.as_deref(),
            by,
            label_column.as_deref(),
            &title,
            hide,
            &output,
        ),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_no_args() {
    println!("compendium_map v{}", VERSION);
    println!("Run `compendium_map -h` for usage or `compendium_map --help` for detailed information.");
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn run_process_command(
    config_name: &str,
    config_file: Option<&str>,
    raw_dir: Option<&str>,
    output_dir: Option<&str>,
    min_expression: Option<f64>,
    variance_percentile: Option<f64>,
    threads: usize,
) -> Result<()> {
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let mut config = ProjectConfig::resolve(config_name, config_file)?;

    // Command-line filters override the configured ones
    if min_expression.is_some() {
        config.filters.minimum_expression = min_expression;
    }
    if variance_percentile.is_some() {
        config.filters.variance_percentile = variance_percentile;
    }
    config.filters.validate()?;

    match (raw_dir, output_dir) {
        (None, None) => {
            compendium_map::run_process(&config)?;
        }
        (raw_dir, output_dir) => {
            let raw = raw_dir.map(PathBuf::from).unwrap_or_else(|| config.raw_data_dir_path());
            let out = output_dir
                .map(PathBuf::from)
                .unwrap_or_else(|| config.processed_dir_path());
            std::fs::create_dir_all(&out)?;

            let processed = compendium_map::process_compendia(&raw, &config.filters)?;
            let expression_path = out.join(&config.expression_file);
            write_expression_table(&expression_path, &processed.expression)?;
            info!("Processed expression data saved to {}", expression_path.display());
            let clinical_path = out.join(&config.clinical_file);
            write_clinical_table(&clinical_path, &processed.clinical)?;
            info!("Merged clinical data saved to {}", clinical_path.display());
        }
    }
    Ok(())
}

fn run_layout_command(
    config_name: &str,
    config_file: Option<&str>,
    expression_path: Option<&str>,
    output_path: Option<&str>,
    seed: u64,
) -> Result<()> {
    let config = ProjectConfig::resolve(config_name, config_file)?;
    let algorithm = PcaLayout {
        seed: Some(seed),
        ..PcaLayout::default()
    };

    if expression_path.is_none() && output_path.is_none() {
        compendium_map::run_layout(&config, &algorithm)?;
        return Ok(());
    }

    let expression_path = expression_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.expression_file_path());
    info!("Loading expression table from: {}", expression_path.display());
    let table = read_expression_table(&expression_path)?;
    info!("  {} samples, {} genes", table.n_samples(), table.n_genes());

    let layout = algorithm.fit_transform(&table)?;
    let output_path = match output_path {
        Some(path) => PathBuf::from(path),
        None => {
            std::fs::create_dir_all(config.processed_dir_path())?;
            config.layout_file_path()
        }
    };
    write_layout(&output_path, &layout)?;
    info!("Layout saved to {}", output_path.display());
    Ok(())
}

fn run_plot(
    config_name: &str,
    config_file: Option<&str>,
    layout_path: Option<&str>,
    clinical_path: Option<&str>,
    by: ColorBy,
    label_column: Option<&str>,
    title: &str,
    hide: Vec<String>,
    output_path: &str,
) -> Result<()> {
    let config = ProjectConfig::resolve(config_name, config_file)?;
    let layout_path = layout_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.layout_file_path());
    let clinical_path = clinical_path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.clinical_file_path());

    info!("Loading layout from: {}", layout_path.display());
    let layout = read_layout(&layout_path)?;
    info!("Loading clinical table from: {}", clinical_path.display());
    let clinical = read_clinical_table(&clinical_path)?;
    let column = label_column.unwrap_or(by.default_column());
    let data = LabeledLayout::join(&layout, &clinical, column)?;

    let opts = PlotOptions {
        title: title.to_string(),
        hidden: hide.into_iter().collect::<BTreeSet<_>>(),
        ..PlotOptions::default()
    };
    match by {
        ColorBy::Compendium => compendium_plot(&data, &opts, output_path),
        ColorBy::Disease => disease_plot(&data, &opts, output_path),
    }
}
