//! 記憶體內的固定報價來源

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;

use crate::data_provider::error::{ProviderError, ProviderResult};
use crate::data_provider::DataProvider;

#[derive(Debug, Clone)]
enum StaticQuote {
    Price(f64),
    Missing,
    Failure(String),
}

/// 代碼 → 報價的固定表，用於離線執行與測試
///
/// 代碼不分大小寫；表中沒有的代碼返回 `UnknownSymbol`。
#[derive(Debug, Default)]
pub struct StaticProvider {
    quotes: DashMap<String, StaticQuote>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_quotes(quotes: &HashMap<String, f64>) -> Self {
        let provider = Self::new();
        for (symbol, price) in quotes {
            provider.set_quote(symbol, *price);
        }
        provider
    }

    fn key(symbol: &str) -> String {
        symbol.trim().to_ascii_uppercase()
    }

    pub fn with_quote(self, symbol: &str, price: f64) -> Self {
        self.set_quote(symbol, price);
        self
    }

    /// 代碼存在但沒有報價
    pub fn with_missing(self, symbol: &str) -> Self {
        self.quotes.insert(Self::key(symbol), StaticQuote::Missing);
        self
    }

    /// 查詢此代碼時返回錯誤
    pub fn with_failure(self, symbol: &str, message: &str) -> Self {
        self.quotes
            .insert(Self::key(symbol), StaticQuote::Failure(message.to_string()));
        self
    }

    /// 更新報價（可在共用的實例上呼叫）
    pub fn set_quote(&self, symbol: &str, price: f64) {
        self.quotes.insert(Self::key(symbol), StaticQuote::Price(price));
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait]
impl DataProvider for StaticProvider {
    async fn get_latest_close(&self, symbol: &str) -> ProviderResult<Option<f64>> {
        let quote = self
            .quotes
            .get(&Self::key(symbol))
            .map(|entry| entry.value().clone());
        match quote {
            Some(StaticQuote::Price(price)) => Ok(Some(price)),
            Some(StaticQuote::Missing) => Ok(None),
            Some(StaticQuote::Failure(message)) => Err(ProviderError::Other(message)),
            None => Err(ProviderError::UnknownSymbol(symbol.to_string())),
        }
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_static_quotes() {
        let provider = StaticProvider::new()
            .with_quote("^KS11", 2531.66)
            .with_missing("^KQ11")
            .with_failure("^VIX", "timeout");

        assert_eq!(provider.get_latest_close("^ks11").await.unwrap(), Some(2531.66));
        assert_eq!(provider.get_latest_close("^KQ11").await.unwrap(), None);
        assert_matches!(provider.get_latest_close("^VIX").await, Err(ProviderError::Other(_)));
        assert_matches!(
            provider.get_latest_close("GC=F").await,
            Err(ProviderError::UnknownSymbol(_))
        );
    }

    #[tokio::test]
    async fn test_set_quote_overrides() {
        let provider = StaticProvider::new().with_quote("KRW=X", 1380.0);
        provider.set_quote("KRW=X", 1395.5);
        assert_eq!(provider.get_latest_close("KRW=X").await.unwrap(), Some(1395.5));
        assert_eq!(provider.len(), 1);
    }
}
