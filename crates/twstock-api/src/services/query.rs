//! 조회 서비스.
//!
//! 저장소 조회 결과를 응답 DTO로 조합합니다. 모든 연산은 읽기 전용이며
//! 동기화를 유발하지 않습니다.

use std::sync::Arc;
use twstock_core::{IndustryDto, Market, SearchConfig, StockDto, StockPrice};
use twstock_data::{StockStore, StoreResult};

/// 업종/종목/시세 조회 서비스.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn StockStore>,
    search_limit: usize,
}

impl QueryService {
    pub fn new(store: Arc<dyn StockStore>, search: &SearchConfig) -> Self {
        Self {
            store,
            search_limit: search.limit.max(1),
        }
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// 시장의 업종 목록 (소속 종목 포함, 저장소 순서).
    ///
    /// 업종과 종목은 저장소의 같은 스냅샷에서 읽습니다.
    pub async fn list_industries(&self, market: Market) -> StoreResult<Vec<IndustryDto>> {
        let members = self.store.list_industries_with_stocks(market).await?;

        Ok(members
            .into_iter()
            .map(|member| {
                let stocks = member.stocks.into_iter().map(StockDto::from).collect();
                IndustryDto::from(&member.industry).with_stocks(stocks)
            })
            .collect())
    }

    /// 시장/업종의 종목 목록.
    pub async fn list_stocks(&self, market: Market, industry_code: &str) -> StoreResult<Vec<StockDto>> {
        let stocks = self
            .store
            .find_by_market_and_industry(market, industry_code)
            .await?;
        Ok(stocks.into_iter().map(StockDto::from).collect())
    }

    /// 명칭 검색 (최대 `search.limit`개).
    pub async fn search(&self, text: &str) -> StoreResult<Vec<StockDto>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let stocks = self.store.find_like(text, self.search_limit).await?;
        Ok(stocks.into_iter().map(StockDto::from).collect())
    }

    /// 종목의 최신 시세.
    pub async fn get_price(&self, stock_id: &str) -> StoreResult<Option<StockPrice>> {
        self.store.get_price(stock_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use twstock_core::{Dataset, Industry, Stock};
    use twstock_data::{IndustryMembers, MemoryStockStore};

    fn stock(id: &str, name: &str, code: &str, market: Market) -> Stock {
        Stock {
            id: id.to_string(),
            exchange_code: market.as_str().to_string(),
            full_name: format!("{}股份有限公司", name),
            short_name: name.to_string(),
            industry_code: code.to_string(),
            market,
        }
    }

    async fn service() -> QueryService {
        let store = MemoryStockStore::with_dataset(Dataset::from_parts(
            vec![
                Industry::new(Market::Tse, "01", "水泥工業"),
                Industry::new(Market::Tse, "02", "食品工業"),
                Industry::new(Market::Otc, "02", "食品工業"),
            ],
            vec![
                stock("1101.tw", "台泥", "01", Market::Tse),
                stock("1102.tw", "亞泥", "01", Market::Tse),
                stock("1201.tw", "味全", "02", Market::Tse),
                stock("1264.tw", "德麥", "02", Market::Otc),
            ],
        ));
        QueryService::new(Arc::new(store), &SearchConfig::default())
    }

    #[tokio::test]
    async fn test_list_industries_nests_market_stocks() {
        let service = service().await;

        let industries = service.list_industries(Market::Tse).await.unwrap();
        assert_eq!(industries.len(), 2);
        assert_eq!(industries[0].code, "01");
        let names: Vec<&str> = industries[0].stocks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["台泥", "亞泥"]);

        // 같은 업종 코드라도 다른 시장 종목은 섞이지 않음
        assert_eq!(industries[1].stocks.len(), 1);
        assert_eq!(industries[1].stocks[0].id, "1201.tw");
    }

    #[tokio::test]
    async fn test_list_stocks() {
        let service = service().await;

        let stocks = service.list_stocks(Market::Otc, "02").await.unwrap();
        assert_eq!(stocks, vec![StockDto { id: "1264.tw".into(), name: "德麥".into() }]);
        assert!(service.list_stocks(Market::Otc, "01").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_caps_results() {
        let stocks: Vec<Stock> = (0..15)
            .map(|i| stock(&format!("{}.tw", 1500 + i), &format!("電機{}", i), "05", Market::Tse))
            .collect();
        let store = MemoryStockStore::with_dataset(Dataset::from_parts(vec![], stocks));
        let service = QueryService::new(Arc::new(store), &SearchConfig::default());

        let found = service.search("電機").await.unwrap();
        assert_eq!(found.len(), 10);
        assert!(found.iter().all(|s| s.name.contains("電機")));
        assert!(service.search("").await.unwrap().is_empty());
    }

    /// 개별 조회 사이마다 다른 데이터셋을 커밋하는 저장소.
    struct CommittingStore {
        inner: MemoryStockStore,
        next: Dataset,
    }

    impl CommittingStore {
        async fn commit_next(&self) {
            self.inner.replace_dataset(&self.next).await.unwrap();
        }
    }

    #[async_trait]
    impl StockStore for CommittingStore {
        async fn replace_all_industries(&self, market: Market, industries: &[Industry]) -> StoreResult<()> {
            self.inner.replace_all_industries(market, industries).await
        }
        async fn replace_all_stocks(&self, stocks: &[Stock]) -> StoreResult<()> {
            self.inner.replace_all_stocks(stocks).await
        }
        async fn replace_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
            self.inner.replace_dataset(dataset).await
        }
        async fn clear_all(&self) -> StoreResult<()> {
            self.inner.clear_all().await
        }
        async fn list_all_industries(&self, market: Market) -> StoreResult<Vec<Industry>> {
            let industries = self.inner.list_all_industries(market).await;
            self.commit_next().await;
            industries
        }
        async fn list_all_stocks(&self) -> StoreResult<Vec<Stock>> {
            let stocks = self.inner.list_all_stocks().await;
            self.commit_next().await;
            stocks
        }
        async fn list_industries_with_stocks(&self, market: Market) -> StoreResult<Vec<IndustryMembers>> {
            let members = self.inner.list_industries_with_stocks(market).await;
            self.commit_next().await;
            members
        }
        async fn find_by_market_and_industry(&self, market: Market, code: &str) -> StoreResult<Vec<Stock>> {
            self.inner.find_by_market_and_industry(market, code).await
        }
        async fn find_like(&self, text: &str, limit: usize) -> StoreResult<Vec<Stock>> {
            self.inner.find_like(text, limit).await
        }
        async fn count_stocks(&self) -> StoreResult<usize> {
            self.inner.count_stocks().await
        }
        async fn upsert_prices(&self, prices: &[StockPrice]) -> StoreResult<usize> {
            self.inner.upsert_prices(prices).await
        }
        async fn get_price(&self, stock_id: &str) -> StoreResult<Option<StockPrice>> {
            self.inner.get_price(stock_id).await
        }
        async fn health_check(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_list_industries_reads_one_snapshot_during_sync() {
        let store = CommittingStore {
            inner: MemoryStockStore::with_dataset(Dataset::from_parts(
                vec![Industry::new(Market::Tse, "01", "水泥工業")],
                vec![stock("1101.tw", "台泥", "01", Market::Tse)],
            )),
            next: Dataset::from_parts(
                vec![Industry::new(Market::Tse, "02", "食品工業")],
                vec![stock("1201.tw", "味全", "02", Market::Tse)],
            ),
        };
        let service = QueryService::new(Arc::new(store), &SearchConfig::default());

        // 조회 도중 커밋된 새 데이터셋과 섞이지 않고 이전 데이터셋 그대로
        let industries = service.list_industries(Market::Tse).await.unwrap();
        assert_eq!(industries.len(), 1);
        assert_eq!(industries[0].code, "01");
        assert_eq!(
            industries[0].stocks,
            vec![StockDto { id: "1101.tw".into(), name: "台泥".into() }]
        );

        // 다음 조회는 새 데이터셋
        let industries = service.list_industries(Market::Tse).await.unwrap();
        assert_eq!(industries[0].code, "02");
        assert_eq!(industries[0].stocks[0].id, "1201.tw");
    }
}
