//! API 서비스 계층.

pub mod query;

pub use query::QueryService;
