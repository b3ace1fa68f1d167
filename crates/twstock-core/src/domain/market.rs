//! 시장 구분.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 시장 구분 (상장/장외).
///
/// 두 시장은 업종 코드 네임스페이스가 서로 독립적입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// 대만증권거래소 상장 (上市)
    Tse,
    /// 장외시장 (上櫃)
    Otc,
}

impl Market {
    /// 동기화 순서대로 나열한 전체 시장.
    pub const ALL: [Market; 2] = [Market::Tse, Market::Otc];

    /// 원격 API 및 DB에서 사용하는 소문자 코드.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Tse => "tse",
            Market::Otc => "otc",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tse" => Ok(Market::Tse),
            "otc" => Ok(Market::Otc),
            _ => Err(CoreError::InvalidMarket(s.to_string())),
        }
    }
}
