pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod explorer;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod insights;
pub mod io_utils;
pub mod samples;
pub mod schema;
pub mod sort;
pub mod stats;
pub mod table;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result, anyhow, bail, ensure};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{ChartFormat, Cli, Commands, QueryArgs, SourceArgs},
    config::Settings,
    explorer::Explorer,
    samples::DirectoryFetcher,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("graphit", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = Settings::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Columns(args) => handle_columns(&settings, &args),
        Commands::View(args) => handle_view(&settings, &args),
        Commands::Chart(args) => handle_chart(&settings, &args),
        Commands::Stats(args) => handle_stats(&settings, &args),
        Commands::Insights(args) => handle_insights(&settings, &args),
        Commands::Export(args) => handle_export(&settings, &args),
        Commands::Inspect(args) => handle_inspect(&settings, &args),
        Commands::Samples => handle_samples(&settings),
    }
}

/// Loads the requested source into a fresh explorer.
pub fn open_explorer(settings: &Settings, source: &SourceArgs) -> Result<Explorer> {
    let mut explorer = Explorer::new(settings);
    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    if let Some(path) = &source.input {
        let bytes = io_utils::read_input(path)?;
        let file_name = if io_utils::is_dash(path) {
            "stdin".to_string()
        } else {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        };
        info!("Loading '{}' ({} byte(s))", path.display(), bytes.len());
        explorer.load_upload(&file_name, source.content_type.as_deref(), &bytes, encoding)?;
    } else {
        let name = source
            .sample
            .as_deref()
            .unwrap_or(settings.default_sample.as_str());
        let sample = settings
            .sample(name)
            .ok_or_else(|| anyhow!("Unknown sample dataset '{name}'"))?;
        let fetcher = DirectoryFetcher::new(&settings.datasets_dir);
        info!(
            "Loading sample '{}' from {:?}",
            sample.name,
            fetcher.root()
        );
        explorer.load_sample(sample, &fetcher, encoding)?;
    }
    Ok(explorer)
}

/// Loads the source, then replays the search and every sort click in order.
pub fn open_query(settings: &Settings, query: &QueryArgs) -> Result<Explorer> {
    let mut explorer = open_explorer(settings, &query.source)?;
    if !query.search.is_empty() {
        explorer.set_search(query.search.as_str());
    }
    for column in &query.sort {
        require_column(&explorer, column)?;
        explorer.toggle_sort(column);
    }
    debug!(
        "Query resolved to {} of {} record(s)",
        explorer.view().len(),
        explorer.dataset().len()
    );
    Ok(explorer)
}

fn require_column(explorer: &Explorer, column: &str) -> Result<()> {
    ensure!(
        explorer.schema().column_index(column).is_some(),
        "Column '{column}' not found in '{}'",
        explorer.dataset().name
    );
    Ok(())
}

fn handle_columns(settings: &Settings, args: &SourceArgs) -> Result<()> {
    let explorer = open_explorer(settings, args)?;
    let headers = vec!["#".to_string(), "name".to_string(), "type".to_string()];
    let rows = explorer
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.column_type.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    let axes = &explorer.chart().axes;
    println!("x-axis: {}", axes.x.as_deref().unwrap_or("-"));
    println!("y-axis: {}", axes.y.as_deref().unwrap_or("-"));
    Ok(())
}

fn handle_view(settings: &Settings, args: &cli::ViewArgs) -> Result<()> {
    let explorer = open_query(settings, &args.query)?;
    let view = explorer.view();
    let limit = args.limit.unwrap_or(usize::MAX);
    print!(
        "{}",
        table::render_view(
            explorer.columns(),
            view.iter().take(limit),
            explorer.sort(),
            args.max_columns,
        )
    );
    let quick = explorer.quick_stats();
    println!(
        "{} record(s), {} column(s), {} numeric",
        quick.records, quick.columns, quick.numeric_columns
    );
    Ok(())
}

fn handle_chart(settings: &Settings, args: &cli::ChartArgs) -> Result<()> {
    let mut explorer = open_query(settings, &args.query)?;
    if let Some(x) = &args.x {
        require_column(&explorer, x)?;
        explorer.set_x_axis(Some(x.clone()));
    }
    if let Some(y) = &args.y {
        require_column(&explorer, y)?;
        explorer.set_y_axis(Some(y.clone()));
    }
    explorer.set_chart_kind(args.kind);
    let series = explorer.series();
    info!(
        "Built {:?} series with {} point(s) over {} record(s)",
        args.kind,
        series.len(),
        explorer.view().len()
    );
    match args.format {
        ChartFormat::Json => {
            let json = serde_json::to_string_pretty(series).context("Serializing chart series")?;
            println!("{json}");
        }
        ChartFormat::Table => {
            let (headers, rows) = series.table();
            if headers.is_empty() {
                println!("No chart data: select both axes and a non-empty view");
            } else {
                table::print_table(&headers, &rows);
            }
        }
    }
    Ok(())
}

fn handle_stats(settings: &Settings, args: &QueryArgs) -> Result<()> {
    let explorer = open_query(settings, args)?;
    let stats = explorer.stats();
    if stats.is_empty() {
        info!("No numeric values in the current view");
        return Ok(());
    }
    let headers = ["column", "count", "min", "max", "avg"]
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    table::print_table(&headers, &stats.render_rows());
    Ok(())
}

fn handle_insights(settings: &Settings, args: &QueryArgs) -> Result<()> {
    let explorer = open_query(settings, args)?;
    let report = serde_json::json!({
        "summary": explorer.quick_stats(),
        "insights": explorer.insights(),
    });
    let json = serde_json::to_string_pretty(&report).context("Serializing insights")?;
    println!("{json}");
    Ok(())
}

fn handle_export(settings: &Settings, args: &cli::ExportArgs) -> Result<()> {
    let explorer = open_query(settings, &args.query)?;
    let csv = explorer.export_csv()?;
    let mut output = io_utils::open_output(args.output.as_deref())?;
    output
        .write_all(csv.as_bytes())
        .context("Writing exported CSV")?;
    output.flush().context("Flushing exported CSV")?;
    if let Some(path) = &args.output {
        info!(
            "Exported {} record(s) to {:?}",
            explorer.view().len(),
            path
        );
    }
    Ok(())
}

fn handle_inspect(settings: &Settings, args: &cli::InspectArgs) -> Result<()> {
    let explorer = open_query(settings, &args.query)?;
    let view = explorer.view();
    if args.row == 0 || args.row > view.len() {
        bail!(
            "Row {} is outside the current view of {} record(s)",
            args.row,
            view.len()
        );
    }
    let record = view
        .get(args.row - 1)
        .ok_or_else(|| anyhow!("Row {} is not available", args.row))?;
    let headers = vec!["field".to_string(), "value".to_string()];
    let rows = record
        .iter()
        .map(|(key, value)| vec![key.to_string(), value.as_display()])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}

fn handle_samples(settings: &Settings) -> Result<()> {
    let headers = ["name", "path", "description", "default"]
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = settings
        .samples
        .iter()
        .map(|sample| {
            let is_default = sample.name.eq_ignore_ascii_case(&settings.default_sample);
            vec![
                sample.name.clone(),
                sample.path.clone(),
                sample.description.clone(),
                if is_default { "*" } else { "" }.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    Ok(())
}
