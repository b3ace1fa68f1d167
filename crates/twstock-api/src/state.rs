//! 애플리케이션 상태 관리.
//!
//! 모든 API 핸들러에서 공유되는 상태를 정의합니다.

use std::sync::Arc;
use twstock_collector::{SyncOrchestrator, SyncStatus};
use twstock_core::SearchConfig;
use twstock_data::StockStore;

use crate::services::QueryService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 조회 서비스
    pub query: QueryService,

    /// 종목 저장소 (헬스 체크용)
    pub store: Arc<dyn StockStore>,

    /// 동기화 오케스트레이터 (수집기를 함께 띄운 경우)
    pub sync: Option<Arc<SyncOrchestrator>>,

    /// API 버전
    pub version: String,

    /// 서버 시작 시간
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn StockStore>, search: &SearchConfig) -> Self {
        Self {
            query: QueryService::new(store.clone(), search),
            store,
            sync: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// 동기화 오케스트레이터를 연결합니다.
    #[must_use]
    pub fn with_sync(mut self, orchestrator: Arc<SyncOrchestrator>) -> Self {
        self.sync = Some(orchestrator);
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.health_check().await.is_ok()
    }

    /// 마지막 동기화 상태.
    pub async fn sync_status(&self) -> Option<SyncStatus> {
        match &self.sync {
            Some(orchestrator) => Some(orchestrator.status().await),
            None => None,
        }
    }
}

/// 테스트용 상태 (메모리 저장소).
#[cfg(test)]
pub fn create_test_state() -> AppState {
    create_test_state_with(twstock_core::Dataset::new())
}

/// 주어진 데이터셋을 담은 테스트용 상태.
#[cfg(test)]
pub fn create_test_state_with(dataset: twstock_core::Dataset) -> AppState {
    let store = Arc::new(twstock_data::MemoryStockStore::with_dataset(dataset));
    AppState::new(store, &SearchConfig::default())
}
