//! 대만 증권거래소 종목 동기화 수집기.
//!
//! 이 crate는 API 서버와 함께 또는 단독으로 실행되는 수집 기능을 제공합니다:
//! - 동기화 사이클 (업종 목록 → 업종별 종목 → 원자적 교체)
//! - 최신 시세 갱신 (배치)
//! - 일일 스케줄러 (기본 01:00 Asia/Taipei)

pub mod error;
pub mod prices;
pub mod scheduler;
pub mod stats;
pub mod status;
pub mod sync;

pub use error::{Result, SyncError};
pub use prices::refresh_prices;
pub use scheduler::{next_run_after, start_sync_scheduler};
pub use stats::SyncStats;
pub use status::SyncStatus;
pub use sync::SyncOrchestrator;
