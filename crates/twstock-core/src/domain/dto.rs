//! 외부 응답용 읽기 전용 프로젝션.

use serde::{Deserialize, Serialize};

use super::{Industry, Stock};

/// 종목 요약 (ID + 약칭).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDto {
    pub id: String,
    pub name: String,
}

impl From<&Stock> for StockDto {
    fn from(stock: &Stock) -> Self {
        Self {
            id: stock.id.clone(),
            name: stock.short_name.clone(),
        }
    }
}

impl From<Stock> for StockDto {
    fn from(stock: Stock) -> Self {
        Self {
            id: stock.id,
            name: stock.short_name,
        }
    }
}

/// 업종 요약. 소속 종목 목록을 함께 담을 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryDto {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub stocks: Vec<StockDto>,
}

impl IndustryDto {
    /// 소속 종목을 설정합니다.
    #[must_use]
    pub fn with_stocks(mut self, stocks: Vec<StockDto>) -> Self {
        self.stocks = stocks;
        self
    }
}

impl From<&Industry> for IndustryDto {
    fn from(industry: &Industry) -> Self {
        Self {
            code: industry.code.clone(),
            name: industry.name.clone(),
            stocks: Vec::new(),
        }
    }
}
