//! Command-line interface for compendium_map

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "compendium_map")]
#[command(version)]
#[command(about = "Merge gene expression compendia and map samples in 2D")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Label used to color plotted samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorBy {
    Compendium,
    Disease,
}

impl ColorBy {
    /// Clinical column holding the label
    pub fn default_column(self) -> &'static str {
        match self {
            ColorBy::Compendium => "compendium",
            ColorBy::Disease => "disease",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge raw compendia into one expression table and one clinical table
    #[command(
        long_about = "Merge raw compendia into one expression table and one clinical table\n\n\
            Loads every *_expression.tsv and *clinical*.tsv file from the raw data\n\
            directory, stacks samples across compendia (genes missing from a compendium\n\
            are zero-filled), optionally filters genes, and writes the merged tables.",
        after_long_help = "\
Examples:
  # Built-in configuration
  compendium_map process --config default

  # Custom configuration with gene filters
  compendium_map process --config-file project.json \\
    --min-expression 1.0 --variance-percentile 50"
    )]
    Process {
        /// Built-in configuration name
        #[arg(long, conflicts_with = "config_file", default_value = "default")]
        config: String,

        /// JSON configuration file
        #[arg(long, value_name = "FILE")]
        config_file: Option<String>,

        /// Override the raw data directory
        #[arg(long, value_name = "DIR")]
        raw_dir: Option<String>,

        /// Override the processed output directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<String>,

        /// Keep genes whose mean log2(TPM+1) is strictly greater than this
        #[arg(long)]
        min_expression: Option<f64>,

        /// Remove genes at or below this variance percentile (0-100)
        #[arg(long)]
        variance_percentile: Option<f64>,

        /// Number of threads (0 = all available)
        #[arg(long, default_value = "0")]
        threads: usize,
    },

    /// Project a merged expression table to 2D
    #[command(
        long_about = "Project a merged expression table to 2D\n\n\
            Reads the configuration's processed expression table, projects every\n\
            sample onto the first two principal components and writes the layout\n\
            file next to it. --expression and --output override those paths.",
        after_long_help = "\
Examples:
  # Paths from the built-in test configuration
  compendium_map layout --config test

  # Explicit files
  compendium_map layout -e processed_compendium.tsv -o layout.tsv"
    )]
    Layout {
        /// Built-in configuration name
        #[arg(long, conflicts_with = "config_file", default_value = "default")]
        config: String,

        /// JSON configuration file
        #[arg(long, value_name = "FILE")]
        config_file: Option<String>,

        /// Merged expression TSV (defaults to the configured expression file)
        #[arg(short, long)]
        expression: Option<String>,

        /// Output layout TSV (defaults to the configured layout file)
        #[arg(short, long)]
        output: Option<String>,

        /// Seed for the randomized PCA
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Render a layout as a scatter plot
    Plot {
        /// Built-in configuration name
        #[arg(long, conflicts_with = "config_file", default_value = "default")]
        config: String,

        /// JSON configuration file
        #[arg(long, value_name = "FILE")]
        config_file: Option<String>,

        /// Layout TSV (defaults to the configured layout file)
        #[arg(short, long)]
        layout: Option<String>,

        /// Merged clinical TSV (defaults to the configured clinical file)
        #[arg(short, long)]
        clinical: Option<String>,

        /// Color samples by compendium or disease
        #[arg(long, value_enum, default_value = "compendium")]
        by: ColorBy,

        /// Clinical column holding the label (defaults to the --by column)
        #[arg(long)]
        label_column: Option<String>,

        /// Plot title
        #[arg(long, default_value = "Compendium map")]
        title: String,

        /// Hide the points of a label (repeatable)
        #[arg(long, value_name = "LABEL")]
        hide: Vec<String>,

        /// Output file (.svg or .png)
        #[arg(short, long, default_value = "compendium_map.svg")]
        output: String,
    },
}
