//! 최신 시세 갱신.

use std::time::Instant;
use tracing::{info, warn};
use twstock_data::{MarketDataGateway, StockStore};

use crate::Result;

/// 저장된 전체 종목의 시세를 `batch_size`개씩 조회해 저장합니다.
///
/// 배치 조회 실패는 로그만 남기고 다음 배치로 진행합니다. 저장 실패는 즉시 반환합니다.
pub async fn refresh_prices(
    gateway: &dyn MarketDataGateway,
    store: &dyn StockStore,
    batch_size: usize,
) -> Result<usize> {
    let start = Instant::now();
    let stocks = store.list_all_stocks().await?;

    if stocks.is_empty() {
        info!("시세 갱신 대상 종목 없음");
        return Ok(0);
    }

    let mut saved = 0;
    let mut failed_batches = 0;

    for (index, batch) in stocks.chunks(batch_size.max(1)).enumerate() {
        match gateway.fetch_prices(batch).await {
            Ok(prices) => {
                saved += store.upsert_prices(&prices).await?;
            }
            Err(e) => {
                failed_batches += 1;
                warn!(batch = index, size = batch.len(), error = %e, "시세 배치 조회 실패");
            }
        }
    }

    info!(
        stocks = stocks.len(),
        saved,
        failed_batches,
        elapsed = format!("{:.1}s", start.elapsed().as_secs_f64()),
        "시세 갱신 완료"
    );
    Ok(saved)
}
