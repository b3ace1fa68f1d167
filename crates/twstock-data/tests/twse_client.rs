//! TWSE MIS 클라이언트 통합 테스트 (mockito).

use mockito::{Matcher, Server};
use rust_decimal_macros::dec;
use twstock_core::{Market, Stock};
use twstock_data::{FetchError, MarketDataGateway, TwseClient};

fn stock(id: &str, market: Market) -> Stock {
    Stock {
        id: id.to_string(),
        exchange_code: market.as_str().to_string(),
        full_name: String::new(),
        short_name: String::new(),
        industry_code: "01".to_string(),
        market,
    }
}

#[tokio::test]
async fn test_fetch_industries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/stock/api/getIndustry.jsp")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"tse":[{"code":"01","name":"水泥工業"},{"code":"02","name":"食品工業"}],
                "otc":[{"code":"02","name":"食品工業"}],"rtcode":"0000"}"#,
        )
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let listing = client.fetch_industries().await.unwrap();

    mock.assert_async().await;
    assert_eq!(listing.tse.len(), 2);
    assert_eq!(listing.otc.len(), 1);
    assert_eq!(listing.tse[0].code, "01");
    assert_eq!(listing.tse[0].name, "水泥工業");
}

#[tokio::test]
async fn test_fetch_stocks_for_industry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/stock/api/getCategory.jsp")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ex".into(), "tse".into()),
            Matcher::UrlEncoded("i".into(), "01".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"msgArray":[
                {"ch":"1101.tw","ex":"tse","nf":"台灣水泥股份有限公司","n":"台泥","key":"x"},
                {"ch":"1101B.tw","ex":"tse","nf":"台泥特","n":"台泥乙特"},
                {"ex":"tse","n":"無代號"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let records = client
        .fetch_stocks_for_industry(Market::Tse, "01")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].id.as_deref(), Some("1101.tw"));
    assert_eq!(records[0].short_name.as_deref(), Some("台泥"));
    assert_eq!(records[2].id, None);
}

#[tokio::test]
async fn test_missing_msg_array_is_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stock/api/getCategory.jsp")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"rtmessage":"OK"}"#)
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let records = client
        .fetch_stocks_for_industry(Market::Otc, "99")
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stock/api/getIndustry.jsp")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let err = client.fetch_industries().await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }), "{err:?}");
    assert!(err.url().contains("/stock/api/getIndustry.jsp"));
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/stock/api/getCategory.jsp")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let err = client
        .fetch_stocks_for_industry(Market::Tse, "01")
        .await
        .unwrap_err();

    match err {
        FetchError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.contains("ex=tse"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_request_error() {
    let client = TwseClient::with_base_url("http://127.0.0.1:1").unwrap();
    let err = client.fetch_industries().await.unwrap_err();

    assert!(matches!(err, FetchError::Request { .. }), "{err:?}");
}

#[tokio::test]
async fn test_fetch_prices_joins_channels() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/stock/api/getStockInfo.jsp")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ex_ch".into(), "tse_1101.tw|otc_6488.tw".into()),
            Matcher::UrlEncoded("json".into(), "1".into()),
            Matcher::UrlEncoded("delay".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"{"msgArray":[
                {"c":"1101","ch":"1101.tw","n":"台泥","z":"33.5000","y":"33.0000","v":"1,234","tlong":"1700000000000"},
                {"c":"6488","ch":"6488.tw","n":"環球晶","z":"-","y":"450.0000"}
            ],"rtcode":"0000"}"#,
        )
        .create_async()
        .await;

    let client = TwseClient::with_base_url(server.url()).unwrap();
    let prices = client
        .fetch_prices(&[stock("1101.tw", Market::Tse), stock("6488.tw", Market::Otc)])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].last_price, Some(dec!(33.5)));
    assert_eq!(prices[0].change(), Some(dec!(0.5)));
    assert_eq!(prices[0].volume, Some(1234));
    assert_eq!(prices[1].last_price, None);
}

#[tokio::test]
async fn test_fetch_prices_empty_input_skips_request() {
    let server = Server::new_async().await;
    let client = TwseClient::with_base_url(server.url()).unwrap();

    assert!(client.fetch_prices(&[]).await.unwrap().is_empty());
}
