//! Yahoo Finance chart API 行情來源

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::data_provider::error::{ProviderError, ProviderResult};
use crate::data_provider::DataProvider;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// 從 chart API 回應取出最新收盤價
///
/// 優先使用 `meta.regularMarketPrice`，否則取 `indicators.quote[0].close` 最後一個非空值。
fn extract_latest_close(symbol: &str, body: &[u8]) -> ProviderResult<Option<f64>> {
    let response: ChartResponse =
        serde_json::from_slice(body).map_err(|e| ProviderError::MalformedPayload {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;

    if let Some(error) = response.chart.error {
        let description = error
            .description
            .or(error.code)
            .unwrap_or_else(|| "unknown error".to_string());
        debug!("{} chart API 錯誤: {}", symbol, description);
        return Err(ProviderError::UnknownSymbol(symbol.to_string()));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::UnknownSymbol(symbol.to_string()))?;

    let price = result.meta.regular_market_price.or_else(|| {
        result
            .indicators
            .and_then(|indicators| indicators.quote.into_iter().next())
            .and_then(|quote| quote.close.into_iter().rev().flatten().next())
    });

    Ok(price.filter(|value| value.is_finite()))
}

/// 以 `reqwest` 呼叫 `/v8/finance/chart/{symbol}` 的行情來源
#[derive(Debug)]
pub struct YahooChartProvider {
    base_url: Url,
    client: Client,
}

impl YahooChartProvider {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> ProviderResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url =
            Url::parse(trimmed).map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", trimmed, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::InvalidUrl(trimmed.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        debug!("建立 YahooChartProvider: base_url={}", base_url);
        Ok(Self { base_url, client })
    }

    /// 代碼中的 `^`、`=` 等字元由 URL 路徑編碼處理
    fn chart_url(&self, symbol: &str) -> ProviderResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn get_latest_close(&self, symbol: &str) -> ProviderResult<Option<f64>> {
        let url = self.chart_url(symbol)?;
        debug!("請求行情: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::UnknownSymbol(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        extract_latest_close(symbol, &body)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
