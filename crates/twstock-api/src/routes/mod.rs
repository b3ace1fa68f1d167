//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness, 마지막 동기화 결과)
//! - `/api/v1/markets` - 시장별 업종/종목 목록
//! - `/api/v1/stocks` - 종목 검색
//! - `/api/v1/prices` - 최신 시세

pub mod health;
pub mod markets;
pub mod prices;
pub mod stocks;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use markets::markets_router;
pub use prices::{prices_router, PriceResponse};
pub use stocks::{stocks_router, SearchQuery};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/markets", markets_router())
        .nest("/api/v1/stocks", stocks_router())
        .nest("/api/v1/prices", prices_router())
}
