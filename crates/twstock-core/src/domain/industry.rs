//! 업종 분류.

use serde::{Deserialize, Serialize};

use super::Market;

/// 시장 내 업종 분류.
///
/// 상장(TSE)/장외(OTC) 업종은 구조가 동일하며 `market` 필드로만 구분됩니다.
/// `(market, code)` 조합이 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// 소속 시장
    pub market: Market,
    /// 업종 코드 (예: "01")
    pub code: String,
    /// 업종명 (예: "水泥工業")
    pub name: String,
}

impl Industry {
    /// 새 업종을 생성합니다.
    pub fn new(market: Market, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            market,
            code: code.into(),
            name: name.into(),
        }
    }
}
