//! The explorer store: one loaded dataset plus the user's search, sort and
//! chart selections, with every derived value kept in step.
//!
//! Any write to an input runs [`Explorer::recompute`], which rebuilds the view
//! (filter, then sort) and then the chart series, summary statistics and
//! insights from that view. Readers only ever see a fully recomputed state.
//!
//! Loads are sequenced with [`LoadTicket`]s. When two loads overlap, only the
//! most recently issued ticket may replace the dataset; an older completion is
//! reported as [`LoadOutcome::Superseded`] and dropped.

use encoding_rs::Encoding;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    chart::{self, ChartKind, ChartSeries, ChartSpec, DEFAULT_PIE_SLICES},
    config::Settings,
    data::{Dataset, Record},
    error::{LoadError, LoadResult},
    export, filter,
    ingest::{self, DEFAULT_ROW_LIMIT, FileKind},
    insights::{self, DataInsights},
    samples::{SampleDataset, SampleFetcher},
    schema::{self, ColumnDescriptor, Schema},
    sort::{self, SortSpec},
    stats::{self, SummaryStatistics},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { records: usize },
    /// A newer load was issued before this one completed.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickStats {
    pub dataset: String,
    pub records: usize,
    pub columns: usize,
    pub numeric_columns: usize,
}

/// The filtered and sorted projection of the loaded dataset.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    records: &'a [Record],
    rows: &'a [usize],
}

impl<'a> View<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zero-based position within the view.
    pub fn get(&self, position: usize) -> Option<&'a Record> {
        self.rows
            .get(position)
            .and_then(|&idx| self.records.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let records = self.records;
        self.rows.iter().filter_map(move |&idx| records.get(idx))
    }
}

#[derive(Debug, Clone)]
pub struct Explorer {
    max_rows: usize,
    pie_slices: usize,
    dataset: Dataset,
    schema: Schema,
    search: String,
    sort: SortSpec,
    chart: ChartSpec,
    rows: Vec<usize>,
    series: ChartSeries,
    stats: SummaryStatistics,
    insights: Option<DataInsights>,
    issued: u64,
}

impl Default for Explorer {
    fn default() -> Self {
        Self::with_limits(DEFAULT_ROW_LIMIT, DEFAULT_PIE_SLICES)
    }
}

impl Explorer {
    pub fn new(settings: &Settings) -> Self {
        Self::with_limits(settings.max_rows, settings.pie_slices)
    }

    pub fn with_limits(max_rows: usize, pie_slices: usize) -> Self {
        Self {
            max_rows,
            pie_slices,
            dataset: Dataset::default(),
            schema: Schema::default(),
            search: String::new(),
            sort: SortSpec::default(),
            chart: ChartSpec::default(),
            rows: Vec::new(),
            series: ChartSeries::Empty,
            stats: SummaryStatistics::default(),
            insights: None,
            issued: 0,
        }
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.schema.columns
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn chart(&self) -> &ChartSpec {
        &self.chart
    }

    pub fn view(&self) -> View<'_> {
        View {
            records: &self.dataset.records,
            rows: &self.rows,
        }
    }

    pub fn series(&self) -> &ChartSeries {
        &self.series
    }

    pub fn stats(&self) -> &SummaryStatistics {
        &self.stats
    }

    pub fn insights(&self) -> Option<&DataInsights> {
        self.insights.as_ref()
    }

    pub fn quick_stats(&self) -> QuickStats {
        QuickStats {
            dataset: self.dataset.name.clone(),
            records: self.rows.len(),
            columns: self.schema.len(),
            numeric_columns: self.schema.numeric_columns().count(),
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.recompute();
    }

    /// Header click: same column flips direction, new column sorts ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort.toggle(column);
        self.recompute();
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
        self.recompute();
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        self.chart.kind = kind;
        self.recompute();
    }

    pub fn set_x_axis(&mut self, column: Option<String>) {
        self.chart.axes.x = column;
        self.recompute();
    }

    pub fn set_y_axis(&mut self, column: Option<String>) {
        self.chart.axes.y = column;
        self.recompute();
    }

    /// Issues a ticket for a load about to start. Issuing a new ticket
    /// invalidates every earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Applies a finished load if `ticket` is still the newest one.
    ///
    /// # Errors
    ///
    /// Returns the load's own error when it failed; the current dataset is
    /// left untouched in that case.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: LoadResult<Dataset>,
    ) -> LoadResult<LoadOutcome> {
        if ticket.0 != self.issued {
            debug!(
                "Discarding load #{} because load #{} was issued after it",
                ticket.0, self.issued
            );
            return Ok(LoadOutcome::Superseded);
        }
        match result {
            Ok(dataset) => Ok(self.replace_dataset(dataset)),
            Err(err) => {
                warn!("Load rejected, keeping '{}': {err}", self.dataset.name);
                Err(err)
            }
        }
    }

    /// Replaces the dataset directly, bypassing parsing.
    pub fn load_dataset(&mut self, dataset: Dataset) -> LoadResult<LoadOutcome> {
        let ticket = self.begin_load();
        let checked = if dataset.len() > self.max_rows {
            Err(LoadError::SizeLimit {
                rows: dataset.len(),
                limit: self.max_rows,
            })
        } else {
            Ok(dataset)
        };
        self.finish_load(ticket, checked)
    }

    pub fn load_text(&mut self, name: &str, kind: FileKind, text: &str) -> LoadResult<LoadOutcome> {
        let ticket = self.begin_load();
        let parsed = ingest::parse_records(kind, text, self.max_rows)
            .map(|records| Dataset::new(name, records));
        self.finish_load(ticket, parsed)
    }

    /// Loads a user-supplied file whose format is judged by MIME type or name.
    pub fn load_upload(
        &mut self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
        encoding: &'static Encoding,
    ) -> LoadResult<LoadOutcome> {
        let ticket = self.begin_load();
        let parsed = FileKind::detect(file_name, content_type).and_then(|kind| {
            ingest::load_bytes(file_name, bytes, kind, encoding, self.max_rows)
        });
        self.finish_load(ticket, parsed)
    }

    /// Fetches and loads a bundled sample. Fetch failures surface as
    /// [`LoadError::Network`] naming the sample.
    pub fn load_sample(
        &mut self,
        sample: &SampleDataset,
        fetcher: &dyn SampleFetcher,
        encoding: &'static Encoding,
    ) -> LoadResult<LoadOutcome> {
        let ticket = self.begin_load();
        let parsed = fetcher
            .fetch(&sample.path)
            .map_err(|err| LoadError::Network {
                dataset: sample.name.clone(),
                reason: err.to_string(),
            })
            .and_then(|bytes| {
                ingest::load_bytes(&sample.name, &bytes, FileKind::Json, encoding, self.max_rows)
            });
        self.finish_load(ticket, parsed)
    }

    /// CSV text of the current view, all columns.
    pub fn export_csv(&self) -> anyhow::Result<String> {
        export::to_csv(&self.schema.headers(), self.view().iter())
    }

    fn replace_dataset(&mut self, dataset: Dataset) -> LoadOutcome {
        let records = dataset.len();
        self.schema = Schema::infer(&dataset);
        self.chart.axes = schema::default_axes(&dataset.records);
        info!(
            "Loaded '{}' with {} record(s) across {} column(s)",
            dataset.name,
            records,
            self.schema.len()
        );
        self.dataset = dataset;
        self.recompute();
        LoadOutcome::Applied { records }
    }

    fn recompute(&mut self) {
        let records = &self.dataset.records;
        let mut rows = filter::matching_rows(records, &self.search);
        sort::sort_rows(records, &mut rows, &self.sort);
        let view = rows
            .iter()
            .filter_map(|&idx| records.get(idx))
            .collect::<Vec<_>>();
        self.series = chart::aggregate(&view, &self.chart, self.pie_slices);
        self.stats = stats::summarize(&self.schema, &view);
        self.insights = insights::compute(&self.schema, &view);
        debug!(
            "Recomputed view: {} of {} row(s), {} chart point(s), {} summarized column(s)",
            rows.len(),
            records.len(),
            self.series.len(),
            self.stats.len()
        );
        self.rows = rows;
    }
}
