//! TWSE MIS 클라이언트.
//!
//! 대만증권거래소 시장정보시스템(MIS)의 JSON 엔드포인트를 호출합니다.
//!
//! # 엔드포인트
//!
//! | 용도 | 경로 | 응답 |
//! |------|------|------|
//! | 업종 목록 | `/stock/api/getIndustry.jsp` | `{tse:[{code,name}], otc:[...]}` |
//! | 업종별 종목 | `/stock/api/getCategory.jsp?ex={market}&i={code}` | `{msgArray:[{ch,ex,nf,n}]}` |
//! | 최신 시세 | `/stock/api/getStockInfo.jsp?ex_ch=tse_1101.tw\|...` | `{msgArray:[...]}` |
//!
//! 모든 응답에서 알 수 없는 필드는 무시합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use twstock_data::provider::{MarketDataGateway, TwseClient};
//! use twstock_core::{Market, RemoteConfig};
//!
//! let client = TwseClient::new(&RemoteConfig::default())?;
//! let listing = client.fetch_industries().await?;
//! let records = client.fetch_stocks_for_industry(Market::Tse, "01").await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use twstock_core::{Market, RemoteConfig, Stock, StockPrice, StockRecord};

use super::{IndustryListing, MarketDataGateway};
use crate::error::FetchError;

const INDUSTRY_PATH: &str = "/stock/api/getIndustry.jsp";
const CATEGORY_PATH: &str = "/stock/api/getCategory.jsp";
const STOCK_INFO_PATH: &str = "/stock/api/getStockInfo.jsp";

/// TWSE MIS 클라이언트.
#[derive(Clone)]
pub struct TwseClient {
    client: reqwest::Client,
    base_url: String,
}

/// `msgArray` 봉투.
#[derive(Debug, Deserialize)]
struct MsgEnvelope<T> {
    #[serde(rename = "msgArray", default = "Vec::new")]
    msg_array: Vec<T>,
}

/// 시세 응답 값. 문자열과 숫자가 섞여 올 수 있습니다.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// 시세 조회 원시 레코드.
#[derive(Debug, Deserialize)]
struct RawPrice {
    /// 종목 코드
    #[serde(default)]
    c: Option<String>,
    /// 채널 ID
    #[serde(default)]
    ch: Option<String>,
    /// 약칭
    #[serde(default)]
    n: Option<String>,
    /// 최근 체결가
    #[serde(default)]
    z: Option<Scalar>,
    /// 시가
    #[serde(default)]
    o: Option<Scalar>,
    /// 고가
    #[serde(default)]
    h: Option<Scalar>,
    /// 저가
    #[serde(default)]
    l: Option<Scalar>,
    /// 전일 종가
    #[serde(default)]
    y: Option<Scalar>,
    /// 누적 거래량
    #[serde(default)]
    v: Option<Scalar>,
    /// 체결 시각 (epoch 밀리초)
    #[serde(default)]
    tlong: Option<Scalar>,
}

impl RawPrice {
    fn into_price(self) -> Option<StockPrice> {
        let stock_id = match (self.ch, self.c.as_deref()) {
            (Some(ch), _) if !ch.is_empty() => ch,
            (_, Some(code)) if !code.is_empty() => format!("{}.tw", code),
            _ => return None,
        };
        let code = self
            .c
            .unwrap_or_else(|| stock_id.split('.').next().unwrap_or_default().to_string());

        Some(StockPrice {
            stock_id,
            code,
            name: self.n.filter(|n| !n.is_empty()),
            last_price: parse_decimal_opt(&self.z),
            open: parse_decimal_opt(&self.o),
            high: parse_decimal_opt(&self.h),
            low: parse_decimal_opt(&self.l),
            prev_close: parse_decimal_opt(&self.y),
            volume: parse_decimal_opt(&self.v).and_then(|v| v.trunc().to_i64()),
            traded_at: parse_decimal_opt(&self.tlong)
                .and_then(|ms| ms.trunc().to_i64())
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

impl TwseClient {
    /// 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &RemoteConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 기본 설정에 기본 URL만 바꿔 생성합니다 (테스트/프록시용).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::new(&RemoteConfig {
            base_url: base_url.into(),
            ..RemoteConfig::default()
        })
    }

    /// 기본 URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET 요청 후 JSON 본문을 역직렬화합니다.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);

        let request = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        let url = request.url().to_string();

        tracing::debug!(url = %url, "MIS 요청");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[async_trait]
impl MarketDataGateway for TwseClient {
    async fn fetch_industries(&self) -> Result<IndustryListing, FetchError> {
        let listing: IndustryListing = self.get_json(INDUSTRY_PATH, &[]).await?;

        tracing::info!(
            tse = listing.tse.len(),
            otc = listing.otc.len(),
            "업종 목록 조회 완료"
        );
        Ok(listing)
    }

    async fn fetch_stocks_for_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> Result<Vec<StockRecord>, FetchError> {
        let envelope: MsgEnvelope<StockRecord> = self
            .get_json(
                CATEGORY_PATH,
                &[("ex", market.as_str()), ("i", industry_code)],
            )
            .await?;

        tracing::debug!(
            market = %market,
            industry = industry_code,
            count = envelope.msg_array.len(),
            "업종별 종목 조회 완료"
        );
        Ok(envelope.msg_array)
    }

    async fn fetch_prices(&self, stocks: &[Stock]) -> Result<Vec<StockPrice>, FetchError> {
        if stocks.is_empty() {
            return Ok(Vec::new());
        }

        let channels = stocks
            .iter()
            .map(|stock| format!("{}_{}", stock.market, stock.id.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");

        let envelope: MsgEnvelope<RawPrice> = self
            .get_json(
                STOCK_INFO_PATH,
                &[("ex_ch", channels.as_str()), ("json", "1"), ("delay", "0")],
            )
            .await?;

        let prices: Vec<StockPrice> = envelope
            .msg_array
            .into_iter()
            .filter_map(RawPrice::into_price)
            .collect();

        tracing::debug!(
            requested = stocks.len(),
            received = prices.len(),
            "시세 조회 완료"
        );
        Ok(prices)
    }
}

/// 시세 문자열을 Decimal로 변환합니다. `"-"`나 빈 문자열은 `None`입니다.
fn parse_decimal_opt(value: &Option<Scalar>) -> Option<Decimal> {
    let text = value.as_ref()?.as_text();
    let text = text.replace(',', "");
    if text.is_empty() || text == "-" {
        return None;
    }
    Decimal::from_str(&text).ok()
}
