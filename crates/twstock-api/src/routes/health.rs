//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use twstock_collector::SyncStatus;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,

    /// 마지막 동기화 결과
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<SyncStatus>,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// 저장소 연결 상태
    pub store: ComponentStatus,

    /// 동기화 상태
    pub sync: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down" | "not_configured")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    /// 정상 상태.
    pub fn up() -> Self {
        Self {
            status: "up".to_string(),
            message: None,
        }
    }

    /// 비정상 상태.
    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    /// 미설정 상태.
    pub fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }

    /// 정보 포함 정상 상태.
    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }
}

fn sync_component(status: Option<&SyncStatus>) -> ComponentStatus {
    let Some(status) = status else {
        return ComponentStatus::not_configured();
    };

    match (status.running, status.last_success) {
        (true, _) => ComponentStatus::up_with_info("sync in progress"),
        (false, None) => ComponentStatus::up_with_info("no sync yet"),
        (false, Some(true)) => {
            let stocks = status.last_stats.as_ref().map(|s| s.stocks).unwrap_or(0);
            ComponentStatus::up_with_info(format!("{} stocks", stocks))
        }
        (false, Some(false)) => ComponentStatus::down(
            status
                .last_error
                .clone()
                .unwrap_or_else(|| "last sync failed".to_string()),
        ),
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 저장소 연결과 마지막 동기화 결과를 확인합니다. 동기화 실패는 degraded로 처리하고
/// 저장소 연결 실패만 503을 반환합니다.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_status = "healthy";
    let mut status_code = StatusCode::OK;

    let store_status = if state.is_store_healthy().await {
        ComponentStatus::up()
    } else {
        overall_status = "unhealthy";
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        ComponentStatus::down("연결 실패")
    };

    let last_sync = state.sync_status().await;
    let sync_status = sync_component(last_sync.as_ref());
    if sync_status.status == "down" && overall_status == "healthy" {
        overall_status = "degraded";
    }

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            store: store_status,
            sync: sync_status,
        },
        last_sync,
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_returns_json() {
        use crate::state::create_test_state;

        let state = Arc::new(create_test_state());
        let app = Router::new()
            .route("/health/ready", get(health_ready))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(health["status"], "healthy");
        assert_eq!(health["components"]["store"]["status"], "up");
        assert_eq!(health["components"]["sync"]["status"], "not_configured");
        assert!(health.get("last_sync").is_none());
    }

    #[test]
    fn test_sync_component_from_status() {
        assert_eq!(sync_component(None).status, "not_configured");

        let failed = SyncStatus {
            last_success: Some(false),
            last_error: Some("Fetch failed".to_string()),
            ..Default::default()
        };
        let component = sync_component(Some(&failed));
        assert_eq!(component.status, "down");
        assert_eq!(component.message.as_deref(), Some("Fetch failed"));

        let fresh = SyncStatus::default();
        assert_eq!(sync_component(Some(&fresh)).status, "up");
    }
}
