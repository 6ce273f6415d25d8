//! Integration tests for the load -> normalize -> filter -> aggregate pipeline.
//!
//! Fixtures under tests/fixtures cover messy headers, a clinic-less source
//! and a source with no usable columns.

use mortality_insights::data::schema::{BIRTHS, CLINIC, CLINIC_PLACEHOLDER, DEATHS, YEAR};
use mortality_insights::data::{DataLoader, LoaderError, SchemaError};
use mortality_insights::export;
use mortality_insights::stats::{filter_and_aggregate, Aggregation, FilterSelection};
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn scratch_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name)
}

fn selection(lo: i64, hi: i64, clinics: &[&str], aggregation: Aggregation) -> FilterSelection {
    FilterSelection {
        year_range: (lo, hi),
        clinics: clinics.iter().map(|c| c.to_string()).collect(),
        aggregation,
    }
}

#[test]
fn test_messy_headers_end_to_end() {
    let mut loader = DataLoader::new();
    let dataset = loader
        .load(&fixtures_path().join("yearly_deaths_messy_headers.csv"))
        .expect("fixture should load");

    // " Year " / "Death Count" / "Birth Count" / "Hospital" resolve via aliases.
    assert_eq!(dataset.columns.year, "year");
    assert_eq!(dataset.columns.deaths, "death_count");
    assert_eq!(dataset.columns.births.as_deref(), Some("birth_count"));
    assert_eq!(dataset.columns.clinic.as_deref(), Some("hospital"));

    // The unparseable year row stays in the frame as a null year.
    assert_eq!(dataset.row_count(), 8);
    assert_eq!(dataset.year_bounds(), Some((1841, 1844)));
    assert_eq!(dataset.clinic_names(), vec!["clinic 1", "clinic 2"]);

    let view = filter_and_aggregate(
        &dataset.df,
        &selection(1841, 1844, &[], Aggregation::Sum),
    )
    .unwrap();

    // 7 of 8 rows: the null-year row cannot satisfy the range predicate.
    assert_eq!(view.rows.height(), 7);
    assert_eq!(view.totals.deaths, Some(806.0));
    assert_eq!(view.totals.births, Some(13304.0));

    // Both clinics reduce to 403 deaths; the tie breaks by name ascending.
    let clinics = view.by_clinic.column(CLINIC).unwrap().str().unwrap();
    assert_eq!(clinics.get(0), Some("clinic 1"));
    assert_eq!(clinics.get(1), Some("clinic 2"));
    let deaths = view.by_clinic.column(DEATHS).unwrap().f64().unwrap();
    assert_eq!(deaths.get(0), Some(403.0));
    assert_eq!(deaths.get(1), Some(403.0));
}

#[test]
fn test_narrowed_selection() {
    let mut loader = DataLoader::new();
    let dataset = loader
        .load(&fixtures_path().join("yearly_deaths_messy_headers.csv"))
        .unwrap();

    let view = filter_and_aggregate(
        &dataset.df,
        &selection(1842, 1842, &["clinic 2"], Aggregation::Sum),
    )
    .unwrap();

    assert_eq!(view.rows.height(), 1);
    assert_eq!(view.totals.deaths, Some(57.0));

    let years = view.by_year.column(YEAR).unwrap().i64().unwrap();
    assert_eq!(years.get(0), Some(1842));
    assert_eq!(view.by_year.height(), 1);
}

#[test]
fn test_mean_mode_applies_uniformly() {
    let mut loader = DataLoader::new();
    let dataset = loader
        .load(&fixtures_path().join("yearly_deaths_messy_headers.csv"))
        .unwrap();

    let view = filter_and_aggregate(
        &dataset.df,
        &selection(1841, 1841, &[], Aggregation::Mean),
    )
    .unwrap();

    // 1841: deaths 37 and 86, births 254 and 3036.
    assert_eq!(view.totals.deaths, Some(61.5));
    assert_eq!(view.totals.births, Some(1645.0));
    let by_year_deaths = view.by_year.column(DEATHS).unwrap().f64().unwrap();
    assert_eq!(by_year_deaths.get(0), Some(61.5));
    let by_year_births = view.by_year.column(BIRTHS).unwrap().f64().unwrap();
    assert_eq!(by_year_births.get(0), Some(1645.0));
}

#[test]
fn test_clinicless_source_gets_placeholder_group() {
    let mut loader = DataLoader::new();
    let dataset = loader.load(&fixtures_path().join("no_clinic.csv")).unwrap();

    assert!(dataset.columns.clinic.is_none());
    assert!(!dataset.has_births());
    assert_eq!(dataset.clinic_names(), vec![CLINIC_PLACEHOLDER]);

    let view = filter_and_aggregate(
        &dataset.df,
        &selection(1846, 1848, &[], Aggregation::Sum),
    )
    .unwrap();

    // Exactly one clinic group, the placeholder.
    assert_eq!(view.by_clinic.height(), 1);
    let clinics = view.by_clinic.column(CLINIC).unwrap().str().unwrap();
    assert_eq!(clinics.get(0), Some(CLINIC_PLACEHOLDER));
    assert_eq!(view.totals.deaths, Some(680.0));
    assert_eq!(view.totals.births, None);
}

#[test]
fn test_missing_required_columns_is_fatal() {
    let mut loader = DataLoader::new();
    let err = loader
        .load(&fixtures_path().join("missing_required.csv"))
        .unwrap_err();

    match err {
        LoaderError::Schema(SchemaError::MissingRequired(detected)) => {
            assert!(detected.contains(&"name".to_string()));
            assert!(detected.contains(&"value".to_string()));
        }
        other => panic!("expected MissingRequired, got: {other}"),
    }
}

#[test]
fn test_missing_source_file_is_fatal() {
    let mut loader = DataLoader::new();
    let err = loader
        .load(Path::new("tests/fixtures/does_not_exist.csv"))
        .unwrap_err();
    assert!(matches!(err, LoaderError::SourceMissing(_)));
}

#[test]
fn test_cache_reuses_dataset_until_path_changes() {
    let scratch = scratch_path("cached_source.csv");
    fs::copy(
        fixtures_path().join("yearly_deaths_messy_headers.csv"),
        &scratch,
    )
    .unwrap();

    let mut loader = DataLoader::new();
    let first_rows = loader.load(&scratch).unwrap().row_count();
    assert_eq!(first_rows, 8);

    // Overwriting the file must not be observed while the path is unchanged.
    fs::copy(fixtures_path().join("no_clinic.csv"), &scratch).unwrap();
    assert!(loader.is_cached(&scratch));
    assert_eq!(loader.load(&scratch).unwrap().row_count(), first_rows);

    // A different path invalidates the cache.
    let other = fixtures_path().join("no_clinic.csv");
    assert_eq!(loader.load(&other).unwrap().row_count(), 3);
    assert!(!loader.is_cached(&scratch));
}

#[test]
fn test_export_writes_canonical_headers() {
    let mut loader = DataLoader::new();
    let dataset = loader
        .load(&fixtures_path().join("yearly_deaths_messy_headers.csv"))
        .unwrap();

    let view = filter_and_aggregate(
        &dataset.df,
        &selection(1841, 1842, &[], Aggregation::Sum),
    )
    .unwrap();

    let out = scratch_path("filtered_extract.csv");
    export::write_filtered(&view.rows, &out).unwrap();

    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("year,deaths,births,clinic"));
    assert_eq!(lines.count(), view.rows.height());
}
