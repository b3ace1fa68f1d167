//! 메모리 종목 저장소.
//!
//! 현재 데이터셋을 `Arc` 스냅샷으로 보관합니다. 교체 연산은 새 스냅샷을 만든 뒤
//! 포인터를 바꾸므로, 읽는 쪽은 항상 완성된 스냅샷 하나만 봅니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use twstock_core::{Dataset, Industry, Market, Stock, StockPrice};

use super::{IndustryMembers, StockStore};
use crate::error::StoreResult;

/// 메모리 종목 저장소.
#[derive(Debug, Default)]
pub struct MemoryStockStore {
    dataset: RwLock<Arc<Dataset>>,
    prices: RwLock<HashMap<String, StockPrice>>,
    case_sensitive: bool,
}

impl MemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 데이터셋으로 생성합니다.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(Arc::new(dataset)),
            ..Self::default()
        }
    }

    /// 검색 시 대소문자 구분 여부.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// 현재 스냅샷.
    pub async fn snapshot(&self) -> Arc<Dataset> {
        self.dataset.read().await.clone()
    }

    async fn swap(&self, dataset: Dataset) {
        *self.dataset.write().await = Arc::new(dataset);
    }
}

#[async_trait]
impl StockStore for MemoryStockStore {
    async fn replace_all_industries(
        &self,
        market: Market,
        industries: &[Industry],
    ) -> StoreResult<()> {
        let mut guard = self.dataset.write().await;
        let mut next = Dataset::clone(&guard);
        next.replace_industries(
            market,
            industries
                .iter()
                .filter(|industry| industry.market == market)
                .cloned()
                .collect(),
        );
        *guard = Arc::new(next);
        Ok(())
    }

    async fn replace_all_stocks(&self, stocks: &[Stock]) -> StoreResult<()> {
        let mut guard = self.dataset.write().await;
        let mut next = Dataset::clone(&guard);
        next.replace_stocks(stocks.to_vec());
        *guard = Arc::new(next);
        Ok(())
    }

    async fn replace_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
        self.swap(dataset.clone()).await;
        Ok(())
    }

    async fn clear_all(&self) -> StoreResult<()> {
        self.swap(Dataset::new()).await;
        Ok(())
    }

    async fn list_all_industries(&self, market: Market) -> StoreResult<Vec<Industry>> {
        let snapshot = self.snapshot().await;
        Ok(snapshot.industries(market).cloned().collect())
    }

    async fn list_all_stocks(&self) -> StoreResult<Vec<Stock>> {
        Ok(self.snapshot().await.stocks().to_vec())
    }

    async fn list_industries_with_stocks(&self, market: Market) -> StoreResult<Vec<IndustryMembers>> {
        let snapshot = self.snapshot().await;
        Ok(IndustryMembers::group(
            snapshot.industries(market).cloned().collect(),
            snapshot
                .stocks()
                .iter()
                .filter(|stock| stock.market == market)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_market_and_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> StoreResult<Vec<Stock>> {
        let snapshot = self.snapshot().await;
        Ok(snapshot.stocks_in(market, industry_code).cloned().collect())
    }

    async fn find_like(&self, text: &str, limit: usize) -> StoreResult<Vec<Stock>> {
        if text.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let snapshot = self.snapshot().await;
        let mut matches: Vec<Stock> = snapshot
            .stocks()
            .iter()
            .filter(|stock| stock.name_contains(text, self.case_sensitive))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn count_stocks(&self) -> StoreResult<usize> {
        Ok(self.snapshot().await.stock_count())
    }

    async fn upsert_prices(&self, prices: &[StockPrice]) -> StoreResult<usize> {
        let mut guard = self.prices.write().await;
        for price in prices {
            let mut next = price.clone();
            if next.last_price.is_none() {
                next.last_price = guard.get(&price.stock_id).and_then(|p| p.last_price);
            }
            guard.insert(price.stock_id.clone(), next);
        }
        Ok(prices.len())
    }

    async fn get_price(&self, stock_id: &str) -> StoreResult<Option<StockPrice>> {
        Ok(self.prices.read().await.get(stock_id).cloned())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
