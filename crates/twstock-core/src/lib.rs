//! # TwStock Core
//!
//! 대만 증권거래소(TWSE) 종목 동기화 서비스의 핵심 도메인 모델을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장/업종/종목/시세 도메인 타입
//! - 종목 적격성 필터 (숫자 티커, 제외 상품명)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use filter::{admit, check_admissible, Rejection, EXCLUDED_NAME_KEYWORDS};
pub use logging::*;
