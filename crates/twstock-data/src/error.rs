//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 원격 엔드포인트 호출 실패.
///
/// 게이트웨이는 재시도하지 않습니다. 재시도 정책은 호출자 책임입니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 네트워크/전송 오류
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx가 아닌 응답
    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// 잘못된 JSON 본문
    #[error("Malformed JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// 요청 URL.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// 저장소 오류.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    Connection(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    Query(String),

    /// 중복 레코드
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => PersistenceError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    PersistenceError::Duplicate(db_err.message().to_string())
                } else {
                    PersistenceError::Query(db_err.message().to_string())
                }
            }
            _ => PersistenceError::Query(err.to_string()),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, PersistenceError>;
