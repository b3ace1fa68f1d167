//! 최신 시세 스냅샷.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 종목별 최신 시세.
///
/// 종목 ID당 하나의 스냅샷만 유지하며 이력은 보관하지 않습니다.
/// 체결이 없는 필드(원격 응답의 `"-"`)는 `None`입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    /// 종목 ID (예: "1101.tw")
    pub stock_id: String,
    /// 숫자 종목 코드 (예: "1101")
    pub code: String,
    /// 약칭
    pub name: Option<String>,
    /// 최근 체결가
    pub last_price: Option<Decimal>,
    /// 시가
    pub open: Option<Decimal>,
    /// 고가
    pub high: Option<Decimal>,
    /// 저가
    pub low: Option<Decimal>,
    /// 전일 종가
    pub prev_close: Option<Decimal>,
    /// 누적 거래량 (장)
    pub volume: Option<i64>,
    /// 체결 시각
    pub traded_at: Option<DateTime<Utc>>,
}

impl StockPrice {
    /// 전일 대비 변동폭.
    pub fn change(&self) -> Option<Decimal> {
        Some(self.last_price? - self.prev_close?)
    }

    /// 전일 대비 변동률 (%).
    pub fn change_pct(&self) -> Option<Decimal> {
        let prev = self.prev_close?;
        if prev.is_zero() {
            return None;
        }
        Some((self.change()? / prev * Decimal::ONE_HUNDRED).round_dp(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(last: Option<Decimal>, prev: Option<Decimal>) -> StockPrice {
        StockPrice {
            stock_id: "1101.tw".to_string(),
            code: "1101".to_string(),
            name: Some("台泥".to_string()),
            last_price: last,
            open: None,
            high: None,
            low: None,
            prev_close: prev,
            volume: None,
            traded_at: None,
        }
    }

    #[test]
    fn test_change() {
        let p = price(Some(dec!(33.5)), Some(dec!(33.0)));
        assert_eq!(p.change(), Some(dec!(0.5)));
        assert_eq!(p.change_pct(), Some(dec!(1.52)));
    }

    #[test]
    fn test_change_without_trade() {
        let p = price(None, Some(dec!(33.0)));
        assert_eq!(p.change(), None);
        assert_eq!(p.change_pct(), None);

        let zero = price(Some(dec!(1)), Some(Decimal::ZERO));
        assert_eq!(zero.change_pct(), None);
    }
}
