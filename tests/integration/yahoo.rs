//! Integration tests for the Yahoo chart provider against a mocked API

use serde_json::json;
use tickerwatch::config::HistoryWindow;
use tickerwatch::services::market_data::{MarketDataError, MarketDataProvider};
use tickerwatch::services::yahoo::YahooChartProvider;
use tokio_test::assert_err;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_chart(server: &MockServer, symbol: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v8/finance/chart/{}", symbol)))
        .and(query_param("range", "1mo"))
        .and(query_param("interval", "1h"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn history_is_parsed_sorted_and_cleaned() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "ZGLD.TO",
        200,
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "ZGLD.TO", "currency": "CAD", "gmtoffset": -18000 },
                    "timestamp": [1709568000, 1709560800, 1709564400, 1709568000],
                    "indicators": {
                        "quote": [{
                            "open":   [3.0, 1.0, null, 3.5],
                            "high":   [3.2, 1.2, 2.2, 3.7],
                            "low":    [2.9, 0.9, 1.9, 3.4],
                            "close":  [3.1, 1.1, 2.1, 3.6],
                            "volume": [100, 200, 300, 400]
                        }]
                    }
                }],
                "error": null
            }
        }),
    )
    .await;

    let provider = YahooChartProvider::new(server.uri());
    let series = provider
        .get_history("ZGLD.TO", &HistoryWindow::default())
        .await
        .expect("history");

    assert_eq!(series.symbol, "ZGLD.TO");
    // the null row is dropped and the later duplicate wins
    assert_eq!(series.closes(), vec![1.1, 3.6]);
    assert_eq!(series.points()[0].timestamp.timestamp(), 1709560800);
    assert_eq!(series.session_offset().local_minus_utc(), -18000);
}

#[tokio::test]
async fn missing_result_yields_empty_series() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "NEW",
        200,
        json!({ "chart": { "result": [{ "indicators": { "quote": [{}] } }], "error": null } }),
    )
    .await;

    let provider = YahooChartProvider::new(server.uri());
    let series = provider
        .get_history("NEW", &HistoryWindow::default())
        .await
        .expect("history");
    assert!(series.is_empty());
}

#[tokio::test]
async fn chart_error_is_reported_as_upstream() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "ZZZ",
        404,
        json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }),
    )
    .await;

    let provider = YahooChartProvider::new(server.uri());
    let err = provider
        .get_history("ZZZ", &HistoryWindow::default())
        .await
        .unwrap_err();

    match err {
        MarketDataError::Upstream { symbol, message } => {
            assert_eq!(symbol, "ZZZ");
            assert!(message.contains("Not Found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_error_page_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = YahooChartProvider::new(server.uri());
    let err = provider
        .get_history("AAPL", &HistoryWindow::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MarketDataError::Upstream { ref message, .. } if message.contains("500")));
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = YahooChartProvider::new(server.uri());
    let err = assert_err!(provider.get_history("AAPL", &HistoryWindow::default()).await);
    assert!(matches!(err, MarketDataError::Decode { .. }));
}
