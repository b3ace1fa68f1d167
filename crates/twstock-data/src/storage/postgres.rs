//! PostgreSQL 종목 저장소.
//!
//! 교체 연산은 하나의 트랜잭션 안에서 DELETE 후 UNNEST 일괄 삽입으로 수행합니다.
//! 커밋 전까지 다른 연결은 이전 데이터를 그대로 봅니다. 실패 시 트랜잭션이
//! 롤백되어 기존 데이터가 유지됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};
use twstock_core::{DatabaseConfig, Dataset, Industry, Market, Stock, StockPrice};

use super::{IndustryMembers, StockStore};
use crate::error::{PersistenceError, StoreResult};

/// 일괄 삽입 청크 크기.
const INSERT_CHUNK: usize = 500;

/// 데이터베이스 연결 풀 래퍼.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 새로운 데이터베이스 연결 풀을 생성합니다.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 Database 인스턴스를 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내부 연결 풀을 반환합니다.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> StoreResult<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 데이터베이스 상태를 확인합니다.
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, FromRow)]
struct IndustryRow {
    market: String,
    code: String,
    name: String,
}

impl TryFrom<IndustryRow> for Industry {
    type Error = PersistenceError;

    fn try_from(row: IndustryRow) -> Result<Self, Self::Error> {
        Ok(Industry::new(parse_market(&row.market)?, row.code, row.name))
    }
}

#[derive(Debug, Clone, FromRow)]
struct StockRow {
    id: String,
    exchange_code: String,
    full_name: String,
    short_name: String,
    industry_code: String,
    market: String,
}

impl TryFrom<StockRow> for Stock {
    type Error = PersistenceError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        Ok(Stock {
            market: parse_market(&row.market)?,
            id: row.id,
            exchange_code: row.exchange_code,
            full_name: row.full_name,
            short_name: row.short_name,
            industry_code: row.industry_code,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
struct PriceRow {
    stock_id: String,
    code: String,
    name: Option<String>,
    last_price: Option<Decimal>,
    open: Option<Decimal>,
    high: Option<Decimal>,
    low: Option<Decimal>,
    prev_close: Option<Decimal>,
    volume: Option<i64>,
    traded_at: Option<DateTime<Utc>>,
}

impl From<PriceRow> for StockPrice {
    fn from(row: PriceRow) -> Self {
        StockPrice {
            stock_id: row.stock_id,
            code: row.code,
            name: row.name,
            last_price: row.last_price,
            open: row.open,
            high: row.high,
            low: row.low,
            prev_close: row.prev_close,
            volume: row.volume,
            traded_at: row.traded_at,
        }
    }
}

fn parse_market(value: &str) -> StoreResult<Market> {
    Market::from_str(value).map_err(|e| PersistenceError::Query(e.to_string()))
}

/// LIKE 패턴의 와일드카드(`%`, `_`)와 이스케이프 문자를 이스케이프합니다.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Store
// =============================================================================

/// PostgreSQL 종목 저장소.
#[derive(Clone)]
pub struct PgStockStore {
    db: Database,
    case_sensitive: bool,
}

impl PgStockStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            case_sensitive: false,
        }
    }

    /// 검색 시 대소문자 구분 여부.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

async fn delete_industries(conn: &mut PgConnection, market: Option<Market>) -> StoreResult<u64> {
    let result = match market {
        Some(market) => {
            sqlx::query("DELETE FROM industries WHERE market = $1")
                .bind(market.as_str())
                .execute(&mut *conn)
                .await?
        }
        None => sqlx::query("DELETE FROM industries").execute(&mut *conn).await?,
    };
    Ok(result.rows_affected())
}

async fn delete_stocks(conn: &mut PgConnection) -> StoreResult<u64> {
    let result = sqlx::query("DELETE FROM stocks").execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// `offset`부터 시작하는 청크의 목록 위치.
fn chunk_positions(offset: usize, len: usize) -> StoreResult<Vec<i64>> {
    (offset..offset + len)
        .map(|position| {
            i64::try_from(position)
                .map_err(|_| PersistenceError::Query(format!("position out of range: {}", position)))
        })
        .collect()
}

/// UNNEST 패턴으로 업종을 일괄 삽입합니다. `position`은 입력 순서입니다.
///
/// 입력의 `(market, code)`는 유일해야 합니다 ([`Dataset`]을 거쳐 중복을 정리).
async fn insert_industries(conn: &mut PgConnection, industries: &[Industry]) -> StoreResult<usize> {
    let mut inserted = 0;

    for (chunk_index, chunk) in industries.chunks(INSERT_CHUNK).enumerate() {
        let markets: Vec<&str> = chunk.iter().map(|i| i.market.as_str()).collect();
        let codes: Vec<&str> = chunk.iter().map(|i| i.code.as_str()).collect();
        let names: Vec<&str> = chunk.iter().map(|i| i.name.as_str()).collect();
        let positions = chunk_positions(chunk_index * INSERT_CHUNK, chunk.len())?;

        let result = sqlx::query(
            r#"
            INSERT INTO industries (market, code, name, position)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::int8[])
            ON CONFLICT (market, code) DO UPDATE SET
                name = EXCLUDED.name
            "#,
        )
        .bind(&markets)
        .bind(&codes)
        .bind(&names)
        .bind(&positions)
        .execute(&mut *conn)
        .await?;

        inserted += result.rows_affected() as usize;
    }

    Ok(inserted)
}

/// UNNEST 패턴으로 종목을 일괄 삽입합니다.
///
/// 입력의 ID는 유일해야 합니다 ([`Dataset`]을 거쳐 중복을 정리).
async fn insert_stocks(conn: &mut PgConnection, stocks: &[Stock]) -> StoreResult<usize> {
    let mut inserted = 0;

    for (chunk_index, chunk) in stocks.chunks(INSERT_CHUNK).enumerate() {
        let ids: Vec<&str> = chunk.iter().map(|s| s.id.as_str()).collect();
        let exchange_codes: Vec<&str> = chunk.iter().map(|s| s.exchange_code.as_str()).collect();
        let full_names: Vec<&str> = chunk.iter().map(|s| s.full_name.as_str()).collect();
        let short_names: Vec<&str> = chunk.iter().map(|s| s.short_name.as_str()).collect();
        let industry_codes: Vec<&str> = chunk.iter().map(|s| s.industry_code.as_str()).collect();
        let markets: Vec<&str> = chunk.iter().map(|s| s.market.as_str()).collect();
        let positions = chunk_positions(chunk_index * INSERT_CHUNK, chunk.len())?;

        let result = sqlx::query(
            r#"
            INSERT INTO stocks
                (id, exchange_code, full_name, short_name, industry_code, market, position)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], $7::int8[]
            )
            ON CONFLICT (id) DO UPDATE SET
                exchange_code = EXCLUDED.exchange_code,
                full_name = EXCLUDED.full_name,
                short_name = EXCLUDED.short_name,
                industry_code = EXCLUDED.industry_code,
                market = EXCLUDED.market
            "#,
        )
        .bind(&ids)
        .bind(&exchange_codes)
        .bind(&full_names)
        .bind(&short_names)
        .bind(&industry_codes)
        .bind(&markets)
        .bind(&positions)
        .execute(&mut *conn)
        .await?;

        inserted += result.rows_affected() as usize;
    }

    Ok(inserted)
}

#[async_trait]
impl StockStore for PgStockStore {
    #[instrument(skip(self, industries), fields(count = industries.len()))]
    async fn replace_all_industries(
        &self,
        market: Market,
        industries: &[Industry],
    ) -> StoreResult<()> {
        // 중복 코드는 메모리 저장소와 같이 첫 위치, 마지막 이름으로 정리
        let incoming = Dataset::from_parts(
            industries
                .iter()
                .filter(|industry| industry.market == market)
                .cloned()
                .collect(),
            Vec::new(),
        );

        let mut tx = self.db.pool().begin().await?;

        let deleted = delete_industries(&mut tx, Some(market)).await?;
        let inserted = insert_industries(&mut tx, incoming.all_industries()).await?;

        tx.commit().await?;

        debug!(%market, deleted, inserted, "업종 교체 완료");
        Ok(())
    }

    #[instrument(skip(self, stocks), fields(count = stocks.len()))]
    async fn replace_all_stocks(&self, stocks: &[Stock]) -> StoreResult<()> {
        let incoming = Dataset::from_parts(Vec::new(), stocks.to_vec());

        let mut tx = self.db.pool().begin().await?;

        let deleted = delete_stocks(&mut tx).await?;
        let inserted = insert_stocks(&mut tx, incoming.stocks()).await?;

        tx.commit().await?;

        debug!(deleted, inserted, "종목 교체 완료");
        Ok(())
    }

    #[instrument(
        skip(self, dataset),
        fields(industries = dataset.industry_count(), stocks = dataset.stock_count())
    )]
    async fn replace_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
        let mut tx = self.db.pool().begin().await?;

        delete_industries(&mut tx, None).await?;
        delete_stocks(&mut tx).await?;
        insert_industries(&mut tx, dataset.all_industries()).await?;
        insert_stocks(&mut tx, dataset.stocks()).await?;

        tx.commit().await?;

        info!(
            industries = dataset.industry_count(),
            stocks = dataset.stock_count(),
            "데이터셋 교체 커밋"
        );
        Ok(())
    }

    async fn clear_all(&self) -> StoreResult<()> {
        let mut tx = self.db.pool().begin().await?;

        let industries = delete_industries(&mut tx, None).await?;
        let stocks = delete_stocks(&mut tx).await?;

        tx.commit().await?;

        info!(industries, stocks, "저장소 초기화");
        Ok(())
    }

    async fn list_all_industries(&self, market: Market) -> StoreResult<Vec<Industry>> {
        let rows: Vec<IndustryRow> = sqlx::query_as(
            r#"
            SELECT market, code, name
            FROM industries
            WHERE market = $1
            ORDER BY position, code
            "#,
        )
        .bind(market.as_str())
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(Industry::try_from).collect()
    }

    async fn list_all_stocks(&self) -> StoreResult<Vec<Stock>> {
        let rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT id, exchange_code, full_name, short_name, industry_code, market
            FROM stocks
            ORDER BY position, id
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(Stock::try_from).collect()
    }

    async fn list_industries_with_stocks(&self, market: Market) -> StoreResult<Vec<IndustryMembers>> {
        // 두 조회가 같은 스냅샷을 보도록 REPEATABLE READ 읽기 전용 트랜잭션 사용
        let mut tx = self.db.pool().begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let industry_rows: Vec<IndustryRow> = sqlx::query_as(
            r#"
            SELECT market, code, name
            FROM industries
            WHERE market = $1
            ORDER BY position, code
            "#,
        )
        .bind(market.as_str())
        .fetch_all(&mut *tx)
        .await?;

        let stock_rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT id, exchange_code, full_name, short_name, industry_code, market
            FROM stocks
            WHERE market = $1
            ORDER BY position, id
            "#,
        )
        .bind(market.as_str())
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let industries = industry_rows
            .into_iter()
            .map(Industry::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        let stocks = stock_rows
            .into_iter()
            .map(Stock::try_from)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(IndustryMembers::group(industries, stocks))
    }

    async fn find_by_market_and_industry(
        &self,
        market: Market,
        industry_code: &str,
    ) -> StoreResult<Vec<Stock>> {
        let rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT id, exchange_code, full_name, short_name, industry_code, market
            FROM stocks
            WHERE market = $1 AND industry_code = $2
            ORDER BY position, id
            "#,
        )
        .bind(market.as_str())
        .bind(industry_code)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(Stock::try_from).collect()
    }

    async fn find_like(&self, text: &str, limit: usize) -> StoreResult<Vec<Stock>> {
        if text.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(text));
        let query = if self.case_sensitive {
            r#"
            SELECT id, exchange_code, full_name, short_name, industry_code, market
            FROM stocks
            WHERE short_name LIKE $1 ESCAPE '\' OR full_name LIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2
            "#
        } else {
            r#"
            SELECT id, exchange_code, full_name, short_name, industry_code, market
            FROM stocks
            WHERE short_name ILIKE $1 ESCAPE '\' OR full_name ILIKE $1 ESCAPE '\'
            ORDER BY id
            LIMIT $2
            "#
        };

        let rows: Vec<StockRow> = sqlx::query_as(query)
            .bind(&pattern)
            .bind(limit as i64)
            .fetch_all(self.db.pool())
            .await?;

        rows.into_iter().map(Stock::try_from).collect()
    }

    async fn count_stocks(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stocks")
            .fetch_one(self.db.pool())
            .await?;
        Ok(count.max(0) as usize)
    }

    #[instrument(skip(self, prices), fields(count = prices.len()))]
    async fn upsert_prices(&self, prices: &[StockPrice]) -> StoreResult<usize> {
        if prices.is_empty() {
            return Ok(0);
        }

        let mut upserted = 0;

        for chunk in prices.chunks(INSERT_CHUNK) {
            let stock_ids: Vec<&str> = chunk.iter().map(|p| p.stock_id.as_str()).collect();
            let codes: Vec<&str> = chunk.iter().map(|p| p.code.as_str()).collect();
            let names: Vec<Option<&str>> = chunk.iter().map(|p| p.name.as_deref()).collect();
            let last_prices: Vec<Option<Decimal>> = chunk.iter().map(|p| p.last_price).collect();
            let opens: Vec<Option<Decimal>> = chunk.iter().map(|p| p.open).collect();
            let highs: Vec<Option<Decimal>> = chunk.iter().map(|p| p.high).collect();
            let lows: Vec<Option<Decimal>> = chunk.iter().map(|p| p.low).collect();
            let prev_closes: Vec<Option<Decimal>> = chunk.iter().map(|p| p.prev_close).collect();
            let volumes: Vec<Option<i64>> = chunk.iter().map(|p| p.volume).collect();
            let traded_ats: Vec<Option<DateTime<Utc>>> =
                chunk.iter().map(|p| p.traded_at).collect();

            let result = sqlx::query(
                r#"
                INSERT INTO stock_prices
                    (stock_id, code, name, last_price, open, high, low, prev_close, volume, traded_at, updated_at)
                SELECT DISTINCT ON (stock_id)
                    stock_id, code, name, last_price, open, high, low, prev_close, volume, traded_at, NOW()
                FROM UNNEST(
                    $1::text[], $2::text[], $3::text[],
                    $4::numeric[], $5::numeric[], $6::numeric[], $7::numeric[], $8::numeric[],
                    $9::int8[], $10::timestamptz[]
                ) WITH ORDINALITY AS t(stock_id, code, name, last_price, open, high, low, prev_close, volume, traded_at, ord)
                ORDER BY stock_id, ord DESC
                ON CONFLICT (stock_id) DO UPDATE SET
                    code = EXCLUDED.code,
                    name = EXCLUDED.name,
                    last_price = COALESCE(EXCLUDED.last_price, stock_prices.last_price),
                    open = EXCLUDED.open,
                    high = EXCLUDED.high,
                    low = EXCLUDED.low,
                    prev_close = EXCLUDED.prev_close,
                    volume = EXCLUDED.volume,
                    traded_at = EXCLUDED.traded_at,
                    updated_at = NOW()
                "#,
            )
            .bind(&stock_ids)
            .bind(&codes)
            .bind(&names)
            .bind(&last_prices)
            .bind(&opens)
            .bind(&highs)
            .bind(&lows)
            .bind(&prev_closes)
            .bind(&volumes)
            .bind(&traded_ats)
            .execute(self.db.pool())
            .await?;

            upserted += result.rows_affected() as usize;
        }

        debug!(upserted, "시세 저장 완료");
        Ok(upserted)
    }

    async fn get_price(&self, stock_id: &str) -> StoreResult<Option<StockPrice>> {
        let row: Option<PriceRow> = sqlx::query_as(
            r#"
            SELECT stock_id, code, name, last_price, open, high, low, prev_close, volume, traded_at
            FROM stock_prices
            WHERE stock_id = $1
            "#,
        )
        .bind(stock_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(StockPrice::from))
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.db.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_positions_continue_across_chunks() {
        assert_eq!(chunk_positions(0, 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(
            chunk_positions(INSERT_CHUNK, 2).unwrap(),
            vec![INSERT_CHUNK as i64, INSERT_CHUNK as i64 + 1]
        );
        assert!(chunk_positions(0, 0).unwrap().is_empty());
        assert!(chunk_positions(i64::MAX as usize + 1, 1).is_err());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("台泥"), "台泥");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c\\d"), "c\\\\d");
    }
}
