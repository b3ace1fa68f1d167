//! 종목 엔티티와 원격 종목 레코드.

use serde::{Deserialize, Serialize};

use super::Market;
use crate::filter::{check_admissible, Rejection};

/// 저장된 종목.
///
/// 적격성 필터를 통과한 레코드만 이 타입으로 변환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// MIS 채널 ID (예: "1101.tw")
    pub id: String,
    /// 원격 응답의 거래소 코드 (`ex`)
    pub exchange_code: String,
    /// 정식 명칭 (`nf`)
    pub full_name: String,
    /// 약칭 (`n`)
    pub short_name: String,
    /// 소속 업종 코드
    pub industry_code: String,
    /// 소속 시장
    pub market: Market,
}

impl Stock {
    /// 구분자(`.`) 앞의 숫자 티커 부분.
    pub fn ticker(&self) -> &str {
        self.id.split('.').next().unwrap_or(&self.id)
    }

    /// 약칭 또는 정식 명칭에 `text`가 포함되는지 확인합니다.
    pub fn name_contains(&self, text: &str, case_sensitive: bool) -> bool {
        if case_sensitive {
            self.short_name.contains(text) || self.full_name.contains(text)
        } else {
            let needle = text.to_lowercase();
            self.short_name.to_lowercase().contains(&needle)
                || self.full_name.to_lowercase().contains(&needle)
        }
    }
}

/// 업종별 종목 조회 API가 반환하는 원시 레코드 (`msgArray` 원소).
///
/// 모든 필드는 누락될 수 있으며, 알 수 없는 필드는 무시됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 채널 ID (`ch`)
    #[serde(rename = "ch", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 거래소 코드 (`ex`)
    #[serde(rename = "ex", default, skip_serializing_if = "Option::is_none")]
    pub exchange_code: Option<String>,
    /// 정식 명칭 (`nf`)
    #[serde(rename = "nf", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// 약칭 (`n`)
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
}

impl StockRecord {
    /// 필드를 모두 지정하여 레코드를 생성합니다.
    pub fn new(
        id: impl Into<String>,
        exchange_code: impl Into<String>,
        full_name: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            exchange_code: Some(exchange_code.into()),
            full_name: Some(full_name.into()),
            short_name: Some(short_name.into()),
        }
    }

    /// 적격성 검사를 거쳐 시장/업종이 지정된 [`Stock`]으로 변환합니다.
    pub fn into_stock(
        self,
        market: Market,
        industry_code: impl Into<String>,
    ) -> Result<Stock, Rejection> {
        check_admissible(&self)?;

        Ok(Stock {
            // check_admissible가 id/full_name 존재를 보장함
            id: self.id.unwrap_or_default(),
            exchange_code: self.exchange_code.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            short_name: self.short_name.unwrap_or_default(),
            industry_code: industry_code.into(),
            market,
        })
    }
}
