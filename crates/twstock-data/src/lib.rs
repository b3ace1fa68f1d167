//! 원격 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - TWSE MIS 게이트웨이 (업종 목록, 업종별 종목, 최신 시세)
//! - 종목 저장소 trait 및 PostgreSQL / 메모리 구현

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{FetchError, PersistenceError, StoreResult};
pub use provider::{IndustryEntry, IndustryListing, MarketDataGateway, TwseClient};
pub use storage::{Database, IndustryMembers, MemoryStockStore, PgStockStore, StockStore};
