//! 핵심 도메인 에러 타입.

use thiserror::Error;

/// 도메인 및 설정 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 알 수 없는 시장 코드
    #[error("Invalid market: {0}")]
    InvalidMarket(String),

    /// 설정 로드 실패
    #[error("Configuration error: {0}")]
    Config(String),

    /// 설정 값 검증 실패
    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
