//! compendium_map: merge gene expression compendia and map samples in 2D
//!
//! Expression and clinical tables from several compendia are merged into
//! unified cross-compendium tables, low-information genes are filtered out,
//! and the samples are projected to two dimensions for scatter plots colored
//! by compendium or disease.
//!
//! # Example
//!
//! ```ignore
//! use compendium_map::prelude::*;
//!
//! let expression = load_expression_dir("data/raw")?;
//! let filters = GeneFilterParams { minimum_expression: Some(1.0), variance_percentile: Some(50.0) };
//! let merged = merge_expression(&expression, &filters)?;
//!
//! let layout = PcaLayout::default().fit_transform(&merged)?;
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod layout;
pub mod merge;
pub mod plot;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ConfigRegistry, DatasetTarget, ProjectConfig, VALID_CONFIGS};
    pub use crate::data::{
        ClinicalTable, ClinicalValue, CompendiumClinicalMap, CompendiumExpressionMap, CompendiumMap,
        ExpressionTable,
    };
    pub use crate::error::{CompendiumError, Result};
    pub use crate::io::{
        load_clinical_dir, load_expression_dir, read_clinical_table, read_expression_table, read_layout,
        write_clinical_table, write_expression_table, write_layout,
    };
    pub use crate::layout::{LabeledLayout, Layout, LayoutAlgorithm, PcaLayout};
    pub use crate::merge::{merge_clinical, merge_expression, GeneFilterParams, COMPENDIUM_COLUMN};
    pub use crate::plot::{compendium_plot, disease_plot, PlotOptions};
}

use std::path::Path;

use prelude::*;

/// Merged outputs of one processing run
#[derive(Debug, Clone)]
pub struct ProcessedCompendia {
    pub expression: ExpressionTable,
    pub clinical: ClinicalTable,
}

/// Load every compendium in `raw_dir` and merge expression and clinical tables
pub fn process_compendia<P: AsRef<Path>>(raw_dir: P, filters: &GeneFilterParams) -> Result<ProcessedCompendia> {
    let raw_dir = raw_dir.as_ref();

    log::info!("Loading expression compendia from: {}", raw_dir.display());
    let expression_tables = load_expression_dir(raw_dir)?;
    log::info!("Processing expression data...");
    let expression = merge_expression(&expression_tables, filters)?;

    log::info!("Loading clinical compendia from: {}", raw_dir.display());
    let clinical_tables = load_clinical_dir(raw_dir)?;
    let clinical = merge_clinical(&clinical_tables)?;

    Ok(ProcessedCompendia { expression, clinical })
}

/// Run the processing pipeline for a configuration and write the merged tables
pub fn run_process(config: &ProjectConfig) -> Result<ProcessedCompendia> {
    log::info!("Starting data processing pipeline ({})...", config.name);
    std::fs::create_dir_all(config.processed_dir_path())?;

    let processed = process_compendia(config.raw_data_dir_path(), &config.filters)?;

    let expression_path = config.expression_file_path();
    write_expression_table(&expression_path, &processed.expression)?;
    log::info!("Processed expression data saved to {}", expression_path.display());

    let clinical_path = config.clinical_file_path();
    write_clinical_table(&clinical_path, &processed.clinical)?;
    log::info!("Merged clinical data saved to {}", clinical_path.display());

    Ok(processed)
}

/// Project the configured merged expression table to 2D and write the layout file
pub fn run_layout<A: LayoutAlgorithm>(config: &ProjectConfig, algorithm: &A) -> Result<Layout> {
    let expression_path = config.expression_file_path();
    log::info!("Loading expression table from: {}", expression_path.display());
    let table = read_expression_table(&expression_path)?;
    log::info!("  {} samples, {} genes", table.n_samples(), table.n_genes());

    let layout = algorithm.fit_transform(&table)?;

    let layout_path = config.layout_file_path();
    write_layout(&layout_path, &layout)?;
    log::info!("{} layout saved to {}", algorithm.name(), layout_path.display());
    Ok(layout)
}
