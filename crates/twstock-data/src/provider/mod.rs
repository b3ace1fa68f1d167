//! 데이터 Provider 모듈.
//!
//! 원격 거래소 데이터 소스를 호출하는 게이트웨이를 정의합니다.
//!
//! ## TWSE MIS
//! - `TwseClient`: 대만증권거래소 시장정보시스템(mis.twse.com.tw) 클라이언트
//! - 업종 목록, 업종별 종목, 최신 시세 조회

pub mod twse;

pub use twse::TwseClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use twstock_core::{Industry, Market, Stock, StockPrice, StockRecord};

use crate::error::FetchError;

/// 업종 목록 응답의 원소 (`{code, name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryEntry {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

impl IndustryEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// 시장별 업종 목록 (`{tse: [...], otc: [...]}`).
///
/// 응답에 시장 키가 없으면 빈 목록으로 취급합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryListing {
    #[serde(default)]
    pub tse: Vec<IndustryEntry>,
    #[serde(default)]
    pub otc: Vec<IndustryEntry>,
}

impl IndustryListing {
    /// 해당 시장의 원시 목록.
    pub fn entries(&self, market: Market) -> &[IndustryEntry] {
        match market {
            Market::Tse => &self.tse,
            Market::Otc => &self.otc,
        }
    }

    /// 해당 시장의 업종 (목록 순서).
    pub fn industries(&self, market: Market) -> Vec<Industry> {
        self.entries(market)
            .iter()
            .map(|entry| Industry::new(market, entry.code.clone(), entry.name.clone()))
            .collect()
    }

    /// 두 시장의 업종 수 합계.
    pub fn len(&self) -> usize {
        self.tse.len() + self.otc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 원격 거래소 데이터 게이트웨이.
///
/// 각 호출은 한 번의 HTTP GET이며 재시도하지 않습니다.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// 시장별 업종 목록 조회.
    async fn fetch_industries(&self) -> Result<IndustryListing, FetchError>;

    /// 업종별 종목 원시 레코드 조회 (응답 순서 유지).
    async fn fetch_stocks_for_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> Result<Vec<StockRecord>, FetchError>;

    /// 종목들의 최신 시세 조회.
    async fn fetch_prices(&self, stocks: &[Stock]) -> Result<Vec<StockPrice>, FetchError>;
}
