//! 일일 동기화 스케줄러.
//!
//! 서버 실행 중 매일 지정 시각(기본 01:00 Asia/Taipei)에 동기화 사이클을 실행합니다.
//! `run_on_startup`이 켜져 있으면 시작 직후 1회 먼저 실행합니다.

use chrono::{DateTime, Days, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use twstock_core::{CoreResult, ScheduleConfig};

use crate::{SyncError, SyncOrchestrator};

/// 다음 실행 시각을 찾지 못했을 때의 대기 시간.
const FALLBACK_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// `now` 이후 처음 도래하는 `tz` 기준 `hour:minute` 시각.
///
/// 정확히 그 시각이면 다음 날로 넘어갑니다. 시각이 유효하지 않으면 `None`입니다.
pub fn next_run_after(now: DateTime<Utc>, hour: u32, minute: u32, tz: Tz) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(&tz).date_naive();

    // 일광 절약 시간 전환으로 해당 시각이 없는 날은 건너뜀
    (0..=2).find_map(|offset| {
        let date = today.checked_add_days(Days::new(offset))?;
        let local = date.and_hms_opt(hour, minute, 0)?;
        let candidate = tz.from_local_datetime(&local).earliest()?.with_timezone(&Utc);
        (candidate > now).then_some(candidate)
    })
}

/// 동기화 스케줄러를 시작합니다.
///
/// `shutdown` 토큰이 취소되면 진행 중인 사이클을 중단하고 종료합니다.
/// 중단된 사이클의 트랜잭션은 커밋되지 않습니다.
pub fn start_sync_scheduler(
    orchestrator: Arc<SyncOrchestrator>,
    config: ScheduleConfig,
    shutdown: CancellationToken,
) -> CoreResult<JoinHandle<()>> {
    let tz = config.tz()?;

    let handle = tokio::spawn(async move {
        info!(
            hour = config.hour,
            minute = config.minute,
            timezone = %tz,
            run_on_startup = config.run_on_startup,
            "동기화 스케줄러 시작"
        );

        if config.run_on_startup {
            info!("시작 시 동기화 실행");
            tokio::select! {
                _ = run_scheduled_cycle(&orchestrator) => {}
                _ = shutdown.cancelled() => {
                    info!("동기화 스케줄러: 종료 시그널 수신 (초기 동기화 중)");
                    return;
                }
            }
        }

        loop {
            let now = Utc::now();
            let delay = next_run_after(now, config.hour, config.minute, tz)
                .and_then(|next| {
                    info!(next_run = %next.with_timezone(&tz), "다음 동기화 예약");
                    (next - now).to_std().ok()
                })
                .unwrap_or(FALLBACK_DELAY);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    tokio::select! {
                        _ = run_scheduled_cycle(&orchestrator) => {}
                        _ = shutdown.cancelled() => {
                            warn!("동기화 스케줄러: 종료 시그널 수신, 진행 중인 사이클 중단");
                            break;
                        }
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("동기화 스케줄러: 종료 시그널 수신, 정리 중...");
                    break;
                }
            }
        }

        info!("동기화 스케줄러 종료됨");
    });

    Ok(handle)
}

async fn run_scheduled_cycle(orchestrator: &SyncOrchestrator) {
    match orchestrator.run_cycle().await {
        Ok(stats) => stats.log_summary("종목 동기화"),
        Err(SyncError::AlreadyRunning) => {
            warn!("이전 동기화 사이클이 실행 중이라 이번 실행을 건너뜁니다");
        }
        Err(e) => error!(error = %e, "종목 동기화 실패"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn taipei() -> Tz {
        "Asia/Taipei".parse().unwrap()
    }

    #[test]
    fn test_next_run_same_day() {
        // 2024-03-01 00:30 Asia/Taipei = 2024-02-29 16:30 UTC
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 16, 30, 0).unwrap();
        let next = next_run_after(now, 1, 0, taipei()).unwrap();

        assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_rolls_to_next_day() {
        // 2024-03-01 09:00 Asia/Taipei
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap();
        let next = next_run_after(now, 1, 0, taipei()).unwrap();

        let local = next.with_timezone(&taipei());
        assert_eq!(local.date_naive().to_string(), "2024-03-02");
        assert_eq!((local.hour(), local.minute()), (1, 0));
    }

    #[test]
    fn test_next_run_at_exact_time_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 17, 0, 0).unwrap();
        let next = next_run_after(now, 1, 0, taipei()).unwrap();

        assert_eq!(next - now, chrono::Duration::days(1));
    }

    #[test]
    fn test_next_run_invalid_time() {
        let now = Utc::now();
        assert!(next_run_after(now, 24, 0, taipei()).is_none());
    }
}
