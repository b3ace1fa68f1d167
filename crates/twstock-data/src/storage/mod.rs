//! 종목 저장소.
//!
//! 동기화 사이클(쓰기)과 조회 API(읽기)가 공유하는 저장소 계약을 정의합니다.
//! 모든 교체 연산은 원자적이며, 읽는 쪽은 이전 데이터셋 또는 새 데이터셋 중
//! 하나만 관찰합니다.
//!
//! - [`PgStockStore`]: PostgreSQL 구현 (트랜잭션 단위 교체)
//! - [`MemoryStockStore`]: 메모리 구현 (스냅샷 포인터 교체)

pub mod memory;
pub mod postgres;

pub use memory::MemoryStockStore;
pub use postgres::{Database, PgStockStore};

use async_trait::async_trait;
use std::collections::HashMap;
use twstock_core::{Dataset, Industry, Market, Stock, StockPrice};

use crate::error::StoreResult;

/// 검색 결과 기본 개수.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// 업종과 소속 종목.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustryMembers {
    pub industry: Industry,
    pub stocks: Vec<Stock>,
}

impl IndustryMembers {
    /// 같은 시장의 업종과 종목을 업종 코드로 묶습니다. 두 목록의 순서를 유지합니다.
    pub fn group(industries: Vec<Industry>, stocks: Vec<Stock>) -> Vec<Self> {
        let mut members: HashMap<(Market, String), Vec<Stock>> = HashMap::new();
        for stock in stocks {
            members
                .entry((stock.market, stock.industry_code.clone()))
                .or_default()
                .push(stock);
        }

        industries
            .into_iter()
            .map(|industry| {
                let stocks = members
                    .remove(&(industry.market, industry.code.clone()))
                    .unwrap_or_default();
                Self { industry, stocks }
            })
            .collect()
    }
}

/// 업종/종목/시세 저장소.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 해당 시장의 업종을 모두 삭제하고 새 목록을 삽입합니다.
    async fn replace_all_industries(
        &self,
        market: Market,
        industries: &[Industry],
    ) -> StoreResult<()>;

    /// 모든 시장의 종목을 삭제하고 새 목록을 삽입합니다.
    async fn replace_all_stocks(&self, stocks: &[Stock]) -> StoreResult<()>;

    /// 두 시장의 업종과 전체 종목을 한 번에 교체합니다.
    async fn replace_dataset(&self, dataset: &Dataset) -> StoreResult<()>;

    /// 업종과 종목을 모두 삭제합니다.
    async fn clear_all(&self) -> StoreResult<()>;

    /// 시장의 업종 목록 (목록 순서).
    async fn list_all_industries(&self, market: Market) -> StoreResult<Vec<Industry>>;

    /// 전체 종목 (목록 순서).
    async fn list_all_stocks(&self) -> StoreResult<Vec<Stock>>;

    /// 시장의 업종 목록과 소속 종목을 하나의 스냅샷에서 읽습니다.
    async fn list_industries_with_stocks(&self, market: Market) -> StoreResult<Vec<IndustryMembers>>;

    /// 시장/업종의 종목 (목록 순서).
    async fn find_by_market_and_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> StoreResult<Vec<Stock>>;

    /// 약칭 또는 정식 명칭에 `text`가 포함된 종목을 ID 순으로 최대 `limit`개 반환합니다.
    async fn find_like(&self, text: &str, limit: usize) -> StoreResult<Vec<Stock>>;

    /// 저장된 종목 수.
    async fn count_stocks(&self) -> StoreResult<usize>;

    /// 최신 시세를 저장합니다 (종목 ID 기준 덮어쓰기).
    async fn upsert_prices(&self, prices: &[StockPrice]) -> StoreResult<usize>;

    /// 종목의 최신 시세.
    async fn get_price(&self, stock_id: &str) -> StoreResult<Option<StockPrice>>;

    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> StoreResult<()>;
}
