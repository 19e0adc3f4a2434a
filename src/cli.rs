use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{chart::ChartKind, table::DEFAULT_VISIBLE_COLUMNS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore small CSV/JSON datasets as tables and chart series", long_about = None)]
pub struct Cli {
    /// Settings file (YAML) overriding row ceiling, pie slices and sample catalog
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List columns with their inferred types and the default chart axes
    Columns(SourceArgs),
    /// Render the filtered and sorted records as a table
    View(ViewArgs),
    /// Emit the chart series for the current view as JSON
    Chart(ChartArgs),
    /// Summary statistics (min, max, average, count) for numeric columns
    Stats(QueryArgs),
    /// Distinct counts, top values and completeness as JSON
    Insights(QueryArgs),
    /// Write the current view as CSV
    Export(ExportArgs),
    /// Show every field of one record from the current view
    Inspect(InspectArgs),
    /// List the bundled sample datasets
    Samples,
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// CSV or JSON file to load ('-' reads stdin)
    #[arg(short = 'i', long = "input", conflicts_with = "sample")]
    pub input: Option<PathBuf>,
    /// MIME type of the input, overriding extension-based detection
    #[arg(long = "content-type", requires = "input")]
    pub content_type: Option<String>,
    /// Name of a bundled sample dataset (defaults to the configured sample)
    #[arg(long)]
    pub sample: Option<String>,
    /// Character encoding of the input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Case-insensitive text that at least one field must contain
    #[arg(short = 's', long = "search", default_value = "")]
    pub search: String,
    /// Column header to click; repeat to toggle direction or switch columns
    #[arg(long = "sort", action = clap::ArgAction::Append)]
    pub sort: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ViewArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    /// Number of leading columns to display
    #[arg(long = "max-columns", default_value_t = DEFAULT_VISIBLE_COLUMNS)]
    pub max_columns: usize,
    /// Limit number of rows displayed
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    /// Chart projection to compute
    #[arg(long, value_enum, default_value = "area")]
    pub kind: ChartKind,
    /// X-axis column (defaults to the first text column)
    #[arg(long)]
    pub x: Option<String>,
    /// Y-axis column (defaults to the first numeric column)
    #[arg(long)]
    pub y: Option<String>,
    /// Output layout
    #[arg(long, value_enum, default_value = "json")]
    pub format: ChartFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ChartFormat {
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub query: QueryArgs,
    /// 1-based position of the record within the current view
    #[arg(long, default_value_t = 1)]
    pub row: usize,
}
