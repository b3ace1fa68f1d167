//! 에러 타입 정의.

use thiserror::Error;
use twstock_data::{FetchError, PersistenceError};

/// 동기화 사이클 에러
#[derive(Debug, Error)]
pub enum SyncError {
    /// 원격 조회 실패 (업종 목록)
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// 저장소 교체 실패 (이전 데이터 유지)
    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// 다른 사이클이 실행 중
    #[error("A sync cycle is already running")]
    AlreadyRunning,
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, SyncError>;
