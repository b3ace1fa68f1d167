//! 최신 시세 endpoint.
//!
//! - `GET /api/v1/prices/{stock_id}` - 종목의 최신 시세 스냅샷

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use twstock_core::StockPrice;

use crate::error::{db_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 시세 응답 (전일 대비 등락 포함).
#[derive(Debug, Serialize)]
pub struct PriceResponse {
    #[serde(flatten)]
    pub price: StockPrice,
    /// 전일 대비
    pub change: Option<Decimal>,
    /// 전일 대비 등락률 (%)
    pub change_pct: Option<Decimal>,
}

impl From<StockPrice> for PriceResponse {
    fn from(price: StockPrice) -> Self {
        Self {
            change: price.change(),
            change_pct: price.change_pct(),
            price,
        }
    }
}

/// 최신 시세 조회.
///
/// GET /api/v1/prices/{stock_id}
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<PriceResponse>> {
    let price = state
        .query
        .get_price(&stock_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiErrorResponse::new(
                    "NOT_FOUND",
                    format!("Price not found: {}", stock_id),
                )),
            )
        })?;

    Ok(Json(PriceResponse::from(price)))
}

/// 시세 라우터 생성.
pub fn prices_router() -> Router<Arc<AppState>> {
    Router::new().route("/{stock_id}", get(get_price))
}
