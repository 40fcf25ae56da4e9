mod common;

use market_monitor::domain_types::MetricValue;
use market_monitor::storage::{
    CsvTimeSeriesStore, Dataset, HistoryQuery, NewRow, StorageError, TimeSeriesStore,
    TimeSeriesTable,
};
use proptest::prelude::*;
use rstest::rstest;

use common::timestamp;

fn kospi_row(day: u32, hour: u32, value: f64) -> NewRow {
    NewRow::new(timestamp(day, hour))
        .with("KOSPI", MetricValue::Number(value))
        .with("KOSDAQ", MetricValue::Number(value / 3.0))
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());

    store.upsert(Dataset::BasicIndicators, kospi_row(1, 9, 2500.0)).await.unwrap();
    store.upsert(Dataset::BasicIndicators, kospi_row(2, 9, 2510.0)).await.unwrap();
    let before = store
        .read(Dataset::BasicIndicators, &HistoryQuery::all())
        .await
        .unwrap();

    store.upsert(Dataset::BasicIndicators, kospi_row(2, 9, 2510.0)).await.unwrap();
    let after = store
        .read(Dataset::BasicIndicators, &HistoryQuery::all())
        .await
        .unwrap();

    assert_eq!(before, after);
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn test_same_day_collection_replaces_row() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());

    store.upsert(Dataset::BasicIndicators, kospi_row(3, 9, 2500.0)).await.unwrap();
    store.upsert(Dataset::BasicIndicators, kospi_row(3, 16, 2520.0)).await.unwrap();

    let rows = store
        .read(Dataset::BasicIndicators, &HistoryQuery::all())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].timestamp, timestamp(3, 16));
    assert_eq!(rows[0].number("KOSPI"), Some(2520.0));
}

#[rstest]
#[case(Dataset::BasicIndicators, 1380.456, 1380.46)]
#[case(Dataset::GlobalIndicators, 4.2549, 4.25)]
#[case(Dataset::SelectedIndicators, 1380.456, 1380.5)]
#[tokio::test]
async fn test_round_trip_applies_dataset_precision(
    #[case] dataset: Dataset,
    #[case] written: f64,
    #[case] expected: f64,
) {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());

    let row = NewRow::new(timestamp(8, 15)).with("USD/KRW", MetricValue::Number(written));
    store.upsert(dataset, row).await.unwrap();

    let latest = store.read_at_offset(dataset, 0).await.unwrap().unwrap();
    assert_eq!(latest.number("USD/KRW"), Some(expected));
}

#[tokio::test]
async fn test_read_at_offset_counts_rows_not_days() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());

    // 11/2 與 11/3 沒有收集
    for day in [1, 4, 5] {
        store
            .upsert(Dataset::GlobalIndicators, kospi_row(day, 9, 2500.0 + day as f64))
            .await
            .unwrap();
    }

    let previous = store
        .read_at_offset(Dataset::GlobalIndicators, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(previous.date, timestamp(4, 0).date());

    let oldest = store
        .read_at_offset(Dataset::GlobalIndicators, 2)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(oldest.date, timestamp(1, 0).date());

    assert!(store
        .read_at_offset(Dataset::GlobalIndicators, 3)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_history_filters() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());
    for day in 1..=10 {
        store
            .upsert(Dataset::BasicIndicators, kospi_row(day, 9, 2400.0 + day as f64))
            .await
            .unwrap();
    }

    let latest = store
        .read(Dataset::BasicIndicators, &HistoryQuery::latest(3))
        .await
        .unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].date, timestamp(10, 0).date());

    let ranged = store
        .read(
            Dataset::BasicIndicators,
            &HistoryQuery::between(Some(timestamp(3, 0).date()), Some(timestamp(5, 0).date())),
        )
        .await
        .unwrap();
    let days: Vec<_> = ranged.iter().map(|row| row.number("KOSPI").unwrap()).collect();
    assert_eq!(days, vec![2405.0, 2404.0, 2403.0]);
}

#[tokio::test]
async fn test_corrupt_table_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());
    let path = store.path_for(Dataset::BasicIndicators);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "date,timestamp,KOSPI\n2024-13-45,,1\n").unwrap();

    let result = store.read(Dataset::BasicIndicators, &HistoryQuery::all()).await;
    assert!(matches!(result, Err(StorageError::CorruptRow { .. })));

    let write = store.upsert(Dataset::BasicIndicators, kospi_row(1, 9, 1.0)).await;
    assert!(write.is_err());
}

#[tokio::test]
async fn test_existing_table_with_capitalized_headers() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvTimeSeriesStore::open(dir.path());
    let path = store.path_for(Dataset::SelectedIndicators);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "Date,Timestamp,KOSPI,VIX\n2024-11-01,2024-11-01 09:00:00,2500.1,\n",
    )
    .unwrap();

    store
        .upsert(
            Dataset::SelectedIndicators,
            NewRow::new(timestamp(2, 9)).with("VIX", MetricValue::Number(15.04)),
        )
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "date,timestamp,KOSPI,VIX\n\
         2024-11-02,2024-11-02 09:00:00,,15\n\
         2024-11-01,2024-11-01 09:00:00,2500.1,\n"
    );
}

proptest! {
    #[test]
    fn prop_table_stays_sorted_and_unique(
        writes in prop::collection::vec((1u32..=28, 0u32..24, -1.0e6f64..1.0e6), 1..40)
    ) {
        let mut table = TimeSeriesTable::new();
        for (day, hour, value) in &writes {
            table.upsert(kospi_row(*day, *hour, *value), 2);
        }

        let rows = table.query(&HistoryQuery::all());
        prop_assert!(rows.windows(2).all(|pair| pair[0].date > pair[1].date));

        let mut days: Vec<u32> = writes.iter().map(|(day, _, _)| *day).collect();
        days.sort_unstable();
        days.dedup();
        prop_assert_eq!(rows.len(), days.len());
    }
}
