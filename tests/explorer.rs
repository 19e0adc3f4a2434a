mod common;

use std::{collections::HashMap, io};

use common::{TestWorkspace, datasets_dir, three_cities};
use encoding_rs::UTF_8;
use graphit::{
    chart::ChartKind,
    config::Settings,
    data::{Dataset, Value},
    error::LoadError,
    explorer::{Explorer, LoadOutcome},
    ingest::{self, FileKind},
    samples::{DirectoryFetcher, SampleDataset, SampleFetcher},
    schema::ColumnType,
    sort::{SortDirection, SortSpec},
};

/// In-memory fetcher keyed by catalog path.
struct StaticFetcher(HashMap<String, Vec<u8>>);

impl SampleFetcher for StaticFetcher {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "404 Not Found"))
    }
}

fn sample(name: &str, path: &str) -> SampleDataset {
    SampleDataset::new(name, path, "")
}

#[test]
fn stale_load_is_superseded_by_newer_ticket() {
    let mut explorer = Explorer::default();
    let slow = explorer.begin_load();
    let fast = explorer.begin_load();

    let newer = Dataset::new("fast", three_cities().records);
    assert_eq!(
        explorer.finish_load(fast, Ok(newer)).expect("fast load"),
        LoadOutcome::Applied { records: 3 }
    );
    let stale = Dataset::new("slow", Vec::new());
    assert_eq!(
        explorer.finish_load(slow, Ok(stale)).expect("slow load"),
        LoadOutcome::Superseded
    );
    assert_eq!(explorer.dataset().name, "fast");
    assert_eq!(explorer.view().len(), 3);
}

#[test]
fn settings_drive_row_ceiling() {
    let settings = Settings {
        max_rows: 2,
        ..Settings::default()
    };
    let mut explorer = Explorer::new(&settings);
    assert_eq!(explorer.max_rows(), 2);

    let err = explorer
        .load_dataset(three_cities())
        .expect_err("three rows over a ceiling of two");
    assert!(matches!(err, LoadError::SizeLimit { rows: 3, limit: 2 }));
}

#[test]
fn explicit_sort_and_axis_overrides_recompute_series() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(three_cities()).expect("initial load");

    explorer.set_sort(SortSpec::by("city", SortDirection::Desc));
    let first = explorer.view().get(0).and_then(|r| r.get("city")).cloned();
    assert_eq!(first, Some(Value::Text("Pune".to_string())));

    explorer.set_chart_kind(ChartKind::Bar);
    explorer.set_x_axis(Some("pop".to_string()));
    explorer.set_y_axis(Some("pop".to_string()));
    assert_eq!(explorer.series().len(), 3);

    explorer.set_y_axis(None);
    assert!(explorer.series().is_empty());
}

#[test]
fn stale_failure_is_also_discarded() {
    let mut explorer = Explorer::default();
    let slow = explorer.begin_load();
    let _fast = explorer.begin_load();

    let outcome = explorer.finish_load(slow, Err(LoadError::format("late garbage")));
    assert!(matches!(outcome, Ok(LoadOutcome::Superseded)));
}

#[test]
fn failed_load_keeps_search_and_sort() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(three_cities()).expect("initial load");
    explorer.set_search("pune");
    explorer.toggle_sort("pop");

    let err = explorer
        .load_text("broken.json", FileKind::Json, "{not json")
        .expect_err("malformed json");
    assert!(matches!(err, LoadError::Format { .. }));
    assert_eq!(explorer.dataset().name, "cities");
    assert_eq!(explorer.search(), "pune");
    assert_eq!(explorer.sort().column.as_deref(), Some("pop"));
    assert_eq!(explorer.view().len(), 2);
}

#[test]
fn successful_load_resets_axes_but_keeps_search() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(three_cities()).expect("initial load");
    explorer.set_search("agra");

    explorer
        .load_text(
            "movies.csv",
            FileKind::Csv,
            "title,rating\nAgra Diaries,7.5\nQueen,8.2\n",
        )
        .expect("csv load");
    assert_eq!(explorer.chart().axes.x.as_deref(), Some("title"));
    assert_eq!(explorer.chart().axes.y.as_deref(), Some("rating"));
    assert_eq!(explorer.view().len(), 1);
}

#[test]
fn sample_fetch_failure_names_the_dataset() {
    let mut explorer = Explorer::default();
    explorer.load_dataset(three_cities()).expect("initial load");
    let fetcher = StaticFetcher(HashMap::new());

    let err = explorer
        .load_sample(&sample("Indian Cities", "missing.json"), &fetcher, UTF_8)
        .expect_err("missing sample");
    assert!(matches!(err, LoadError::Network { .. }));
    assert_eq!(
        err.to_string(),
        "Failed to load Indian Cities: 404 Not Found"
    );
    assert_eq!(explorer.dataset().name, "cities");
}

#[test]
fn sample_loads_are_capped_like_uploads() {
    let mut explorer = Explorer::with_limits(2, 10);
    let fetcher = StaticFetcher(HashMap::from([(
        "three.json".to_string(),
        br#"[{"a":1},{"a":2},{"a":3}]"#.to_vec(),
    )]));

    let err = explorer
        .load_sample(&sample("Three", "three.json"), &fetcher, UTF_8)
        .expect_err("over the configured ceiling");
    assert!(matches!(err, LoadError::SizeLimit { rows: 3, limit: 2 }));
    assert!(explorer.dataset().is_empty());
}

#[test]
fn bundled_samples_load_from_datasets_directory() {
    let settings = Settings::default();
    let fetcher = DirectoryFetcher::new(datasets_dir());
    for entry in &settings.samples {
        let mut explorer = Explorer::new(&settings);
        let outcome = explorer
            .load_sample(entry, &fetcher, UTF_8)
            .unwrap_or_else(|err| panic!("{}: {err}", entry.name));
        assert!(matches!(outcome, LoadOutcome::Applied { records } if records > 0));
        assert_eq!(explorer.dataset().name, entry.name);
        assert!(explorer.chart().axes.is_complete());
        assert!(!explorer.series().is_empty());
    }
}

#[test]
fn indian_cities_sample_has_expected_schema() {
    let settings = Settings::default();
    let fetcher = DirectoryFetcher::new(datasets_dir());
    let mut explorer = Explorer::new(&settings);
    let cities = settings.sample(&settings.default_sample).expect("default sample");
    explorer
        .load_sample(cities, &fetcher, UTF_8)
        .expect("load cities");

    assert_eq!(explorer.schema().column_type("city"), ColumnType::String);
    assert_eq!(explorer.schema().column_type("population"), ColumnType::Number);
    let quick = explorer.quick_stats();
    assert_eq!(quick.records, 8);
    assert_eq!(quick.numeric_columns, 3);

    let insights = explorer.insights().expect("insights");
    assert_eq!(insights.unique_count("region"), Some(4));
    let regions = insights.top_values_for("region").expect("region top values");
    assert_eq!(regions[0].value, "West");
    assert_eq!(regions[0].count, 3);
    assert!(insights.top_values_for("population").is_none());
    assert_eq!(insights.data_quality.missing, 0);
}

#[test]
fn directory_fetcher_refuses_parent_paths() {
    let workspace = TestWorkspace::new();
    workspace.write("ok.json", "[]");
    let fetcher = DirectoryFetcher::new(workspace.path());
    assert_eq!(fetcher.root(), workspace.path());

    assert_eq!(fetcher.fetch("ok.json").expect("inside root"), b"[]");
    let err = fetcher.fetch("../etc/passwd").expect_err("escapes root");
    assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
}

#[test]
fn upload_uses_mime_then_extension() {
    let mut explorer = Explorer::default();
    explorer
        .load_upload("data", Some("text/csv"), b"x,y\n1,2\n", UTF_8)
        .expect("csv by mime");
    assert_eq!(explorer.dataset().len(), 1);

    let err = explorer
        .load_upload("data", None, b"x,y\n1,2\n", UTF_8)
        .expect_err("no hint");
    assert!(matches!(err, LoadError::UnsupportedType { .. }));

    let direct = ingest::load_bytes("d.json", b"[]", FileKind::Json, UTF_8, 10).expect("empty");
    assert!(direct.is_empty());
}
