#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tempfile::TempDir;

use market_monitor::data_provider::StaticProvider;
use market_monitor::domain_types::{Category, MetricCatalogue, MetricValue, MetricValues};
use market_monitor::service::MarketService;
use market_monitor::storage::CsvTimeSeriesStore;

pub fn timestamp(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn values(entries: &[(&str, Option<f64>)]) -> MetricValues {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.map(MetricValue::Number)))
        .collect()
}

/// 精簡的目錄：每個擴展類別一到兩個指標，加上自選指標
pub fn small_catalogue() -> MetricCatalogue {
    MetricCatalogue::new()
        .with_category(Category::ExchangeRates, &[("USD/KRW", "KRW=X")])
        .with_category(Category::LocalIndices, &[("KOSPI", "^KS11"), ("KOSDAQ", "^KQ11")])
        .with_category(Category::GlobalIndices, &[("S&P500", "^GSPC")])
        .with_category(Category::Commodities, &[("GOLD", "GC=F"), ("SILVER", "SI=F")])
        .with_category(Category::Bonds, &[("US_10Y", "^TNX")])
        .with_category(Category::Volatility, &[("VIX", "^VIX")])
        .with_category(Category::Crypto, &[("BTC/USD", "BTC-USD")])
        .with_category(
            Category::Selected,
            &[("USD/KRW", "KRW=X"), ("KOSPI", "^KS11"), ("VIX", "^VIX")],
        )
}

/// 第一天的報價
pub fn day_one_provider() -> StaticProvider {
    StaticProvider::new()
        .with_quote("KRW=X", 1380.0)
        .with_quote("^KS11", 2500.0)
        .with_quote("^KQ11", 700.0)
        .with_quote("^GSPC", 5900.0)
        .with_quote("GC=F", 2600.0)
        .with_quote("SI=F", 30.0)
        .with_quote("^TNX", 4.25)
        .with_quote("^VIX", 14.0)
        .with_failure("BTC-USD", "rate limited")
}

pub struct TestEnv {
    pub dir: TempDir,
    pub provider: Arc<StaticProvider>,
    pub service: MarketService,
}

pub fn setup(provider: StaticProvider) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(provider);
    let store = Arc::new(CsvTimeSeriesStore::open(dir.path().join("data")));
    let service = MarketService::new(provider.clone(), store, dir.path().join("current"))
        .with_catalogue(small_catalogue());
    TestEnv {
        dir,
        provider,
        service,
    }
}
