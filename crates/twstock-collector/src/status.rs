//! 마지막 동기화 결과.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::SyncStats;

/// 헬스 체크에 노출되는 마지막 동기화 상태.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    /// 사이클 실행 중 여부
    pub running: bool,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    /// 마지막 사이클 성공 여부 (아직 실행 전이면 `None`)
    pub last_success: Option<bool>,
    pub last_error: Option<String>,
    pub last_stats: Option<SyncStats>,
}

impl SyncStatus {
    pub(crate) fn start(&mut self, at: DateTime<Utc>) {
        self.running = true;
        self.last_started_at = Some(at);
    }

    pub(crate) fn finish_ok(&mut self, at: DateTime<Utc>, stats: SyncStats) {
        self.running = false;
        self.last_finished_at = Some(at);
        self.last_success = Some(true);
        self.last_error = None;
        self.last_stats = Some(stats);
    }

    pub(crate) fn finish_err(&mut self, at: DateTime<Utc>, error: String) {
        self.running = false;
        self.last_finished_at = Some(at);
        self.last_success = Some(false);
        self.last_error = Some(error);
    }
}
