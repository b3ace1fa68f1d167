//! 시장별 업종/종목 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/markets/{market}/industries` - 업종 목록 (소속 종목 포함)
//! - `GET /api/v1/markets/{market}/industries/{code}/stocks` - 업종별 종목 목록

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use twstock_core::{IndustryDto, Market, StockDto};

use crate::error::{db_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 경로의 시장 값을 파싱합니다. 알 수 없는 값은 400 `INVALID_MARKET`.
pub(crate) fn parse_market(value: &str) -> ApiResult<Market> {
    Market::from_str(value).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::new("INVALID_MARKET", e.to_string())),
        )
    })
}

/// 업종 목록 조회.
///
/// GET /api/v1/markets/{market}/industries
pub async fn list_industries(
    State(state): State<Arc<AppState>>,
    Path(market): Path<String>,
) -> ApiResult<Json<Vec<IndustryDto>>> {
    let market = parse_market(&market)?;

    let industries = state.query.list_industries(market).await.map_err(db_error)?;

    debug!(%market, count = industries.len(), "업종 목록 조회");
    Ok(Json(industries))
}

/// 업종별 종목 목록 조회.
///
/// GET /api/v1/markets/{market}/industries/{code}/stocks
pub async fn list_stocks(
    State(state): State<Arc<AppState>>,
    Path((market, code)): Path<(String, String)>,
) -> ApiResult<Json<Vec<StockDto>>> {
    let market = parse_market(&market)?;

    let stocks = state
        .query
        .list_stocks(market, &code)
        .await
        .map_err(db_error)?;

    Ok(Json(stocks))
}

/// 시장 라우터 생성.
pub fn markets_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{market}/industries", get(list_industries))
        .route("/{market}/industries/{code}/stocks", get(list_stocks))
}
