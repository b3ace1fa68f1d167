//! 종목 검색 endpoint.
//!
//! - `GET /api/v1/stocks/search?q={text}` - 약칭/정식 명칭 부분 일치 검색

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use twstock_core::StockDto;
use validator::Validate;

use crate::error::{db_error, validation_error, ApiResult};
use crate::state::AppState;

/// 검색 쿼리.
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    /// 검색어
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "검색어는 1-50자여야 합니다"))]
    pub q: String,
}

/// 종목 검색.
///
/// GET /api/v1/stocks/search?q=水泥
pub async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<StockDto>>> {
    query.validate().map_err(validation_error)?;

    let stocks = state.query.search(&query.q).await.map_err(db_error)?;
    Ok(Json(stocks))
}

/// 종목 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search_stocks))
}
