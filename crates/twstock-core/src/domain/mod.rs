//! 종목 동기화를 위한 도메인 모델.

mod dataset;
mod dto;
mod industry;
mod market;
mod price;
mod stock;

pub use dataset::*;
pub use dto::*;
pub use industry::*;
pub use market::*;
pub use price::*;
pub use stock::*;
