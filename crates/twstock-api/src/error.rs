//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use twstock_data::PersistenceError;
use validator::ValidationErrors;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "INVALID_MARKET",
///   "message": "Invalid market: nyse (expected tse or otc)",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "INVALID_MARKET", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 에러 코드 반환.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 저장소 오류 → 500 `DB_ERROR`.
pub fn db_error(err: PersistenceError) -> (StatusCode, Json<ApiErrorResponse>) {
    tracing::error!(error = %err, "저장소 조회 실패");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorResponse::new("DB_ERROR", err.to_string())),
    )
}

/// 입력 검증 오류 → 400 `VALIDATION_ERROR`.
pub fn validation_error(errors: ValidationErrors) -> (StatusCode, Json<ApiErrorResponse>) {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization_skips_empty_details() {
        let error = ApiErrorResponse::new("NOT_FOUND", "Price not found: 9999.tw");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json.get("details").is_none());
        assert!(json["timestamp"].is_i64());
        assert_eq!(error.to_string(), "[NOT_FOUND] Price not found: 9999.tw");
    }

    #[test]
    fn test_db_error_status() {
        let (status, Json(body)) = db_error(PersistenceError::PoolExhausted);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code(), "DB_ERROR");
    }
}
