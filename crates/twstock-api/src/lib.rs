//! REST API 서버.
//!
//! 동기화된 대만 증권거래소 업종/종목 데이터를 조회하는 읽기 전용 API를 제공합니다.
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`services`]: 조회 서비스
//! - [`error`]: 통합 에러 응답

pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::*;
pub use services::QueryService;
pub use state::AppState;
