//! 한 번의 동기화 사이클이 만들어내는 전체 데이터셋.

use std::collections::HashMap;

use super::{Industry, Market, Stock};

/// 업종과 종목의 완성된 교체 집합.
///
/// 동기화 중에는 저장소 밖에서 조립되고, 완성된 뒤 저장소에 원자적으로 반영됩니다.
/// 삽입 순서가 곧 목록 순서입니다.
///
/// 중복 처리:
/// - 같은 `(market, code)` 업종은 첫 위치를 유지하고 이름만 갱신
/// - 같은 `id` 종목은 첫 위치를 유지하고 나중 레코드로 교체
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    industries: Vec<Industry>,
    stocks: Vec<Stock>,
    industry_index: HashMap<(Market, String), usize>,
    stock_index: HashMap<String, usize>,
}

impl Dataset {
    /// 빈 데이터셋을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 업종 목록과 종목 목록으로 데이터셋을 생성합니다.
    pub fn from_parts(industries: Vec<Industry>, stocks: Vec<Stock>) -> Self {
        let mut dataset = Self::new();
        industries
            .into_iter()
            .for_each(|industry| dataset.push_industry(industry));
        stocks.into_iter().for_each(|stock| dataset.push_stock(stock));
        dataset
    }

    /// 업종을 추가합니다.
    pub fn push_industry(&mut self, industry: Industry) {
        let key = (industry.market, industry.code.clone());
        match self.industry_index.get(&key) {
            Some(&pos) => self.industries[pos] = industry,
            None => {
                self.industry_index.insert(key, self.industries.len());
                self.industries.push(industry);
            }
        }
    }

    /// 종목을 추가합니다.
    pub fn push_stock(&mut self, stock: Stock) {
        match self.stock_index.get(&stock.id) {
            Some(&pos) => self.stocks[pos] = stock,
            None => {
                self.stock_index.insert(stock.id.clone(), self.stocks.len());
                self.stocks.push(stock);
            }
        }
    }

    /// 해당 시장의 업종을 모두 교체합니다. 다른 시장은 유지됩니다.
    pub fn replace_industries(&mut self, market: Market, industries: Vec<Industry>) {
        let kept: Vec<Industry> = self
            .industries
            .drain(..)
            .filter(|industry| industry.market != market)
            .collect();
        let stocks = std::mem::take(&mut self.stocks);

        *self = Self::from_parts(kept, stocks);
        industries
            .into_iter()
            .map(|industry| Industry { market, ..industry })
            .for_each(|industry| self.push_industry(industry));
    }

    /// 종목을 모두 교체합니다.
    pub fn replace_stocks(&mut self, stocks: Vec<Stock>) {
        self.stocks.clear();
        self.stock_index.clear();
        stocks.into_iter().for_each(|stock| self.push_stock(stock));
    }

    /// 전체 업종 (목록 순서).
    pub fn all_industries(&self) -> &[Industry] {
        &self.industries
    }

    /// 특정 시장의 업종 (목록 순서).
    pub fn industries(&self, market: Market) -> impl Iterator<Item = &Industry> + '_ {
        self.industries
            .iter()
            .filter(move |industry| industry.market == market)
    }

    /// 전체 종목 (목록 순서).
    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    /// 특정 시장/업종의 종목 (목록 순서).
    pub fn stocks_in<'a>(
        &'a self,
        market: Market,
        industry_code: &'a str,
    ) -> impl Iterator<Item = &'a Stock> + 'a {
        self.stocks
            .iter()
            .filter(move |s| s.market == market && s.industry_code == industry_code)
    }

    /// ID로 종목을 조회합니다.
    pub fn stock(&self, id: &str) -> Option<&Stock> {
        self.stock_index.get(id).map(|&pos| &self.stocks[pos])
    }

    /// 종목 수.
    pub fn stock_count(&self) -> usize {
        self.stocks.len()
    }

    /// 업종 수.
    pub fn industry_count(&self) -> usize {
        self.industries.len()
    }

    /// 업종과 종목이 모두 비어 있으면 `true`.
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty() && self.stocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(id: &str, industry: &str, name: &str) -> Stock {
        Stock {
            id: id.to_string(),
            exchange_code: "tse".to_string(),
            full_name: format!("{} Corp", name),
            short_name: name.to_string(),
            industry_code: industry.to_string(),
            market: Market::Tse,
        }
    }

    #[test]
    fn test_duplicate_stock_keeps_first_position() {
        let mut dataset = Dataset::new();
        dataset.push_stock(stock("1101.tw", "01", "A"));
        dataset.push_stock(stock("1102.tw", "01", "B"));
        dataset.push_stock(stock("1101.tw", "02", "A2"));

        assert_eq!(dataset.stock_count(), 2);
        assert_eq!(dataset.stocks()[0].short_name, "A2");
        assert_eq!(dataset.stocks()[0].industry_code, "02");
        assert_eq!(dataset.stock("1102.tw").unwrap().short_name, "B");
    }

    #[test]
    fn test_industry_code_unique_per_market() {
        let mut dataset = Dataset::new();
        dataset.push_industry(Industry::new(Market::Tse, "01", "水泥"));
        dataset.push_industry(Industry::new(Market::Otc, "01", "水泥"));
        dataset.push_industry(Industry::new(Market::Tse, "01", "水泥工業"));

        assert_eq!(dataset.industry_count(), 2);
        let tse: Vec<_> = dataset.industries(Market::Tse).collect();
        assert_eq!(tse.len(), 1);
        assert_eq!(tse[0].name, "水泥工業");
    }

    #[test]
    fn test_replace_industries_keeps_other_market() {
        let mut dataset = Dataset::from_parts(
            vec![
                Industry::new(Market::Tse, "01", "水泥"),
                Industry::new(Market::Otc, "02", "食品"),
            ],
            vec![stock("1101.tw", "01", "A")],
        );

        dataset.replace_industries(Market::Tse, vec![Industry::new(Market::Tse, "03", "塑膠")]);

        let tse: Vec<_> = dataset.industries(Market::Tse).map(|i| i.code.as_str()).collect();
        let otc: Vec<_> = dataset.industries(Market::Otc).map(|i| i.code.as_str()).collect();
        assert_eq!(tse, vec!["03"]);
        assert_eq!(otc, vec!["02"]);
        assert_eq!(dataset.stock_count(), 1);
    }

    #[test]
    fn test_stocks_in_filters_market_and_industry() {
        let mut otc = stock("6488.tw", "01", "C");
        otc.market = Market::Otc;
        let dataset = Dataset::from_parts(
            vec![],
            vec![stock("1101.tw", "01", "A"), stock("1216.tw", "02", "B"), otc],
        );

        let ids: Vec<_> = dataset
            .stocks_in(Market::Tse, "01")
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1101.tw"]);
    }
}
