//! 종목 적격성 필터.
//!
//! 업종별 종목 목록에는 워런트, 해외 통화 콜옵션, 회사채 등 주식이 아닌 상품이
//! 섞여 있습니다. 다음 조건을 모두 만족하는 레코드만 저장 대상이 됩니다:
//!
//! 1. `id`를 첫 번째 `.`로 나눈 앞부분이 정수로 파싱됨
//! 2. 정식 명칭에 [`EXCLUDED_NAME_KEYWORDS`]가 포함되지 않음
//!
//! 탈락은 에러가 아닌 결과값([`Rejection`])이며, 개별 로그를 남기지 않습니다.

use std::fmt;

use crate::domain::StockRecord;

/// 정식 명칭에 포함되면 제외되는 키워드.
///
/// - `美購`: 미국 달러 결제 콜옵션
/// - `歐購`: 유로 결제 콜옵션
/// - `公司債`: 회사채
pub const EXCLUDED_NAME_KEYWORDS: [&str; 3] = ["美購", "歐購", "公司債"];

/// 레코드 탈락 사유.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `id` 필드 없음
    MissingId,
    /// 정식 명칭 없음
    MissingFullName,
    /// 티커 앞부분이 정수가 아님
    NonNumericTicker(String),
    /// 제외 키워드 포함
    ExcludedName(&'static str),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingId => write!(f, "missing id"),
            Rejection::MissingFullName => write!(f, "missing full name"),
            Rejection::NonNumericTicker(id) => write!(f, "non-numeric ticker: {}", id),
            Rejection::ExcludedName(keyword) => write!(f, "excluded instrument: {}", keyword),
        }
    }
}

/// 레코드의 적격성을 검사하고 탈락 사유를 반환합니다.
pub fn check_admissible(record: &StockRecord) -> Result<(), Rejection> {
    let id = record.id.as_deref().ok_or(Rejection::MissingId)?;

    let prefix = id.split('.').next().unwrap_or_default();
    if prefix.parse::<i32>().is_err() {
        return Err(Rejection::NonNumericTicker(id.to_string()));
    }

    let full_name = record
        .full_name
        .as_deref()
        .ok_or(Rejection::MissingFullName)?;

    if let Some(keyword) = EXCLUDED_NAME_KEYWORDS
        .into_iter()
        .find(|keyword| full_name.contains(keyword))
    {
        return Err(Rejection::ExcludedName(keyword));
    }

    Ok(())
}

/// 레코드가 저장 대상이면 `true`.
pub fn admit(record: &StockRecord) -> bool {
    check_admissible(record).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, full_name: &str) -> StockRecord {
        StockRecord::new(id, "tse", full_name, "short")
    }

    #[test]
    fn test_admits_numeric_ticker() {
        assert!(admit(&record("1101.tw", "Taiwan Cement Corp")));
        assert!(admit(&record("2330", "台灣積體電路製造股份有限公司")));
    }

    #[test]
    fn test_rejects_non_numeric_ticker() {
        assert_eq!(
            check_admissible(&record("BOND1", "Bond")),
            Err(Rejection::NonNumericTicker("BOND1".to_string()))
        );
        assert!(!admit(&record("03001P.tw", "Warrant")));
        assert!(!admit(&record(".tw", "Empty prefix")));
        assert!(!admit(&record("", "Empty id")));
    }

    #[test]
    fn test_rejects_excluded_names() {
        assert_eq!(
            check_admissible(&record("1101.tw", "XYZ 公司債")),
            Err(Rejection::ExcludedName("公司債"))
        );
        assert!(!admit(&record("7001.tw", "某某美購01")));
        assert!(!admit(&record("7002.tw", "某某歐購02")));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let no_id = StockRecord {
            full_name: Some("Name".to_string()),
            ..Default::default()
        };
        assert_eq!(check_admissible(&no_id), Err(Rejection::MissingId));

        let no_name = StockRecord {
            id: Some("1101.tw".to_string()),
            ..Default::default()
        };
        assert_eq!(check_admissible(&no_name), Err(Rejection::MissingFullName));
    }
}
