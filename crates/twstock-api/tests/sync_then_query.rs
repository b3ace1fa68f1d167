//! 동기화 후 조회 흐름 통합 테스트.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;
use twstock_api::{create_api_router, AppState};
use twstock_collector::SyncOrchestrator;
use twstock_core::{Market, SearchConfig, Stock, StockPrice, StockRecord, SyncConfig};
use twstock_data::{FetchError, IndustryEntry, IndustryListing, MarketDataGateway, MemoryStockStore};

struct CementGateway;

#[async_trait]
impl MarketDataGateway for CementGateway {
    async fn fetch_industries(&self) -> Result<IndustryListing, FetchError> {
        Ok(IndustryListing {
            tse: vec![IndustryEntry::new("001", "Cement")],
            otc: vec![],
        })
    }

    async fn fetch_stocks_for_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> Result<Vec<StockRecord>, FetchError> {
        if market != Market::Tse || industry_code != "001" {
            return Ok(Vec::new());
        }
        Ok(vec![
            StockRecord::new("1101.TW", "TSE", "Taiwan Cement Corp", "Taiwan Cement"),
            StockRecord::new("BOND1", "TSE", "XYZ 公司債", "Bond1"),
        ])
    }

    async fn fetch_prices(&self, _stocks: &[Stock]) -> Result<Vec<StockPrice>, FetchError> {
        Ok(Vec::new())
    }
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_sync_cycle_is_visible_through_api() {
    let store = Arc::new(MemoryStockStore::new());
    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::new(CementGateway),
        store.clone(),
        SyncConfig::default(),
    ));
    let state = Arc::new(AppState::new(store, &SearchConfig::default()).with_sync(orchestrator.clone()));
    let app = create_api_router().with_state(state);

    // 동기화 전: 빈 결과
    let (status, body) = get_json(&app, "/api/v1/markets/tse/industries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));

    orchestrator.run_cycle().await.unwrap();

    let (_, body) = get_json(&app, "/api/v1/markets/tse/industries").await;
    assert_eq!(
        body,
        serde_json::json!([
            {"code": "001", "name": "Cement", "stocks": [{"id": "1101.TW", "name": "Taiwan Cement"}]}
        ])
    );

    let (_, body) = get_json(&app, "/api/v1/stocks/search?q=Bond").await;
    assert_eq!(body, serde_json::json!([]));

    let (status, body) = get_json(&app, "/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["last_sync"]["last_success"], true);
    assert_eq!(body["last_sync"]["last_stats"]["stocks"], 1);
    assert_eq!(body["components"]["sync"]["message"], "1 stocks");
}
