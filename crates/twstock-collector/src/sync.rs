//! 종목 동기화 사이클.
//!
//! 1. 업종 목록 조회 (1회)
//! 2. 업종별 종목 조회 (TSE → OTC, 목록 순서, 동시 실행 수 제한)
//! 3. 적격 종목만 데이터셋에 추가
//! 4. 데이터셋으로 저장소를 원자적으로 교체
//! 5. (선택) 최신 시세 갱신

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use twstock_core::{Dataset, Industry, Market, StockRecord, SyncConfig};
use twstock_data::{FetchError, IndustryListing, MarketDataGateway, StockStore};

use crate::{prices, Result, SyncError, SyncStats, SyncStatus};

/// 동기화 오케스트레이터.
///
/// 한 번에 하나의 사이클만 실행됩니다. 실행 중 들어온 요청은
/// [`SyncError::AlreadyRunning`]으로 거절됩니다.
pub struct SyncOrchestrator {
    gateway: Arc<dyn MarketDataGateway>,
    store: Arc<dyn StockStore>,
    config: SyncConfig,
    cycle_lock: Mutex<()>,
    status: RwLock<SyncStatus>,
}

impl SyncOrchestrator {
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        store: Arc<dyn StockStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
            cycle_lock: Mutex::new(()),
            status: RwLock::new(SyncStatus::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn StockStore> {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// 마지막 동기화 상태.
    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// 사이클 실행 중 여부.
    pub fn is_running(&self) -> bool {
        self.cycle_lock.try_lock().is_err()
    }

    /// 동기화 사이클을 1회 실행합니다.
    pub async fn run_cycle(&self) -> Result<SyncStats> {
        let _cycle = self
            .cycle_lock
            .try_lock()
            .map_err(|_| SyncError::AlreadyRunning)?;

        self.status.write().await.start(Utc::now());
        info!("종목 동기화 사이클 시작");

        let result = self.execute().await;

        let mut status = self.status.write().await;
        match &result {
            Ok(stats) => status.finish_ok(Utc::now(), stats.clone()),
            Err(e) => status.finish_err(Utc::now(), e.to_string()),
        }

        result
    }

    /// 저장된 전체 종목의 최신 시세를 갱신합니다.
    pub async fn refresh_prices(&self) -> Result<usize> {
        prices::refresh_prices(
            self.gateway.as_ref(),
            self.store.as_ref(),
            self.config.price_batch_size,
        )
        .await
    }

    async fn execute(&self) -> Result<SyncStats> {
        let start = Instant::now();
        let mut stats = SyncStats::new();

        let listing = match self.gateway.fetch_industries().await {
            Ok(listing) => listing,
            Err(e) => {
                error!(error = %e, url = e.url(), "업종 목록 조회 실패");
                self.clear_after_failure().await;
                return Err(e.into());
            }
        };

        let dataset = self.build_dataset(&listing, &mut stats).await;

        if let Err(e) = self.store.replace_dataset(&dataset).await {
            error!(error = %e, "데이터셋 교체 실패, 이전 데이터 유지");
            return Err(e.into());
        }
        stats.stocks = dataset.stock_count();

        if self.config.include_prices {
            match self.refresh_prices().await {
                Ok(count) => stats.prices = count,
                Err(e) => warn!(error = %e, "시세 갱신 실패"),
            }
        }

        stats.elapsed = start.elapsed();
        Ok(stats)
    }

    async fn clear_after_failure(&self) {
        if !self.config.clear_on_failure {
            warn!("기존 데이터셋 유지");
            return;
        }

        match self.store.clear_all().await {
            Ok(()) => warn!("업종 목록 조회 실패로 저장소를 비웠습니다"),
            Err(e) => error!(error = %e, "저장소 초기화 실패"),
        }
    }

    /// 업종별 종목을 조회해 데이터셋을 조립합니다.
    ///
    /// 결과는 동시 실행 여부와 관계없이 업종 목록 순서로 합쳐집니다.
    #[instrument(skip_all, fields(industries = listing.len(), fan_out = self.config.fan_out))]
    async fn build_dataset(&self, listing: &IndustryListing, stats: &mut SyncStats) -> Dataset {
        let industries: Vec<Industry> = Market::ALL
            .iter()
            .flat_map(|&market| listing.industries(market))
            .collect();

        let gateway = &self.gateway;
        let fetched: Vec<(Industry, std::result::Result<Vec<StockRecord>, FetchError>)> =
            stream::iter(industries)
                .map(|industry| async move {
                    let result = gateway
                        .fetch_stocks_for_industry(industry.market, &industry.code)
                        .await;
                    (industry, result)
                })
                .buffered(self.config.fan_out.max(1))
                .collect()
                .await;

        let mut dataset = Dataset::new();

        for (industry, result) in fetched {
            stats.industries += 1;

            match result {
                Ok(records) => {
                    let received = records.len();
                    let mut admitted = 0;

                    for record in records {
                        match record.into_stock(industry.market, industry.code.as_str()) {
                            Ok(stock) => {
                                admitted += 1;
                                dataset.push_stock(stock);
                            }
                            Err(_) => stats.rejected += 1,
                        }
                    }

                    stats.records += received;
                    stats.admitted += admitted;
                    debug!(
                        market = %industry.market,
                        industry = %industry.code,
                        count = received,
                        admitted,
                        "업종 종목 처리"
                    );
                }
                Err(e) => {
                    stats.industries_failed += 1;
                    warn!(
                        market = %industry.market,
                        industry = %industry.code,
                        error = %e,
                        "업종 종목 조회 실패, 건너뜀"
                    );
                }
            }

            dataset.push_industry(industry);
        }

        dataset
    }
}
