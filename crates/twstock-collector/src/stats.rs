//! 동기화 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 동기화 사이클 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStats {
    /// 처리한 업종 수 (두 시장 합계)
    pub industries: usize,
    /// 종목 조회에 실패해 건너뛴 업종 수
    pub industries_failed: usize,
    /// 수신한 원시 종목 레코드 수
    pub records: usize,
    /// 적격 판정된 레코드 수
    pub admitted: usize,
    /// 제외된 레코드 수
    pub rejected: usize,
    /// 저장된 종목 수 (ID 중복 제거 후)
    pub stocks: usize,
    /// 갱신된 시세 수
    pub prices: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 업종 조회 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.industries == 0 {
            0.0
        } else {
            ((self.industries - self.industries_failed) as f64 / self.industries as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            industries = self.industries,
            industries_failed = self.industries_failed,
            records = self.records,
            admitted = self.admitted,
            rejected = self.rejected,
            stocks = self.stocks,
            prices = self.prices,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );
    }
}
