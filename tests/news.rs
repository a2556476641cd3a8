#![allow(clippy::unwrap_used, reason = "tests can panic on unwrap")]

use gloria_client_sdk::{Client, Config};
use httpmock::MockServer;

fn client(server: &MockServer) -> Client {
    Client::new(
        Config::builder()
            .api_key("test-token")
            .base_url(server.base_url())
            .topics(vec!["crypto".to_owned(), "macro".to_owned()])
            .build(),
    )
    .unwrap()
}

mod fetch_news {
    use gloria_client_sdk::error::{Kind, Status};
    use gloria_client_sdk::news::types::NewsRequest;
    use gloria_client_sdk::{Client, Config};
    use httpmock::{Method::GET, MockServer};
    use reqwest::StatusCode;
    use serde_json::json;

    use super::client;

    #[tokio::test]
    async fn fetch_news_should_apply_configured_defaults() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/news")
                .query_param("token", "test-token")
                .query_param("feed_categories", "crypto,macro")
                .query_param("page", "1")
                .query_param("limit", "40");
            then.status(StatusCode::OK).json_body(json!([
                {
                    "timestamp": 1_753_314_064,
                    "signal": "Bitcoin reclaims $120k",
                    "feed_category": "crypto",
                    "sources": ["https://example.com/btc"]
                },
                {
                    "timestamp": 1_753_310_000,
                    "signal": "Fed holds rates"
                }
            ]));
        });

        let items = client.fetch_news(&NewsRequest::default()).await?;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].signal, "Bitcoin reclaims $120k");
        assert_eq!(items[0].feed_category.as_deref(), Some("crypto"));
        assert_eq!(items[0].extra["sources"], json!(["https://example.com/btc"]));
        assert_eq!(items[1].timestamp, 1_753_310_000);
        assert_eq!(items[1].feed_category, None);
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_news_should_pass_explicit_parameters() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/news")
                .query_param("token", "test-token")
                .query_param("feed_categories", "tech")
                .query_param("page", "3")
                .query_param("limit", "5")
                .query_param("from_date", "2025-07-01")
                .query_param("to_date", "2025-07-31");
            then.status(StatusCode::OK).json_body(json!([]));
        });

        let request = NewsRequest::builder()
            .page(3)
            .limit(5)
            .from_date("2025-07-01")
            .to_date("2025-07-31")
            .topics(vec!["tech".to_owned()])
            .build();
        let items = client.fetch_news(&request).await?;

        assert!(items.is_empty());
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_news_should_keep_base_url_path_prefix() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = Client::new(
            Config::builder()
                .api_key("test-token")
                .base_url(format!("{}/api", server.base_url()))
                .topics(vec!["crypto".to_owned()])
                .build(),
        )?;

        let news = server.mock(|when, then| {
            when.method(GET).path("/api/news");
            then.status(StatusCode::OK).json_body(json!([]));
        });
        let recaps = server.mock(|when, then| {
            when.method(GET)
                .path("/api/recaps")
                .query_param("feed_category", "crypto");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        client.fetch_news(&NewsRequest::default()).await?;
        client.fetch_recap(None, None).await?;

        news.assert();
        recaps.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_news_should_surface_http_status() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET).path("/news");
            then.status(StatusCode::UNAUTHORIZED)
                .body(r#"{"detail": "invalid token"}"#);
        });

        let err = client
            .fetch_news(&NewsRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Status);
        let status = err.downcast_ref::<Status>().unwrap();
        assert_eq!(status.status_code, StatusCode::UNAUTHORIZED);
        assert_eq!(status.path, "/news");
        assert!(status.message.contains("invalid token"));
        assert!(!err.to_string().contains("test-token"));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_news_should_reject_items_without_signal() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET).path("/news");
            then.status(StatusCode::OK)
                .json_body(json!([{"timestamp": 1_753_314_064}]));
        });

        client
            .fetch_news(&NewsRequest::default())
            .await
            .unwrap_err();
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_news_should_validate_before_sending() {
        let server = MockServer::start();
        let client = client(&server);

        let err = client
            .fetch_news(&NewsRequest::builder().page(0).build())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);

        let err = client
            .fetch_news(&NewsRequest::builder().topics(Vec::new()).build())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Validation);
    }
}

mod recaps {
    use gloria_client_sdk::error::{Kind, Status};
    use httpmock::{Method::GET, MockServer};
    use reqwest::StatusCode;
    use serde_json::json;

    use super::client;

    #[tokio::test]
    async fn fetch_recap_should_default_to_first_topic() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recaps")
                .query_param("token", "test-token")
                .query_param("feed_category", "crypto")
                .query_param("timeframe", "12h");
            then.status(StatusCode::OK).json_body(json!({
                "feed_category": "crypto",
                "recap": "Quiet session with ETF inflows",
                "item_count": 14
            }));
        });

        let recap = client.fetch_recap(None, None).await?;

        assert_eq!(
            recap.get("recap"),
            Some(&json!("Quiet session with ETF inflows"))
        );
        assert_eq!(recap.get("item_count"), Some(&json!(14)));
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_recap_should_pass_category_and_timeframe() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recaps")
                .query_param("feed_category", "rwa")
                .query_param("timeframe", "24h");
            then.status(StatusCode::OK).json_body(json!({}));
        });

        let recap = client.fetch_recap(Some("rwa"), Some("24h")).await?;

        assert!(recap.fields.is_empty());
        mock.assert();

        Ok(())
    }

    #[tokio::test]
    async fn fetch_all_recaps_should_isolate_failures() -> anyhow::Result<()> {
        let server = MockServer::start();
        let client = client(&server);

        let crypto = server.mock(|when, then| {
            when.method(GET)
                .path("/recaps")
                .query_param("feed_category", "crypto")
                .query_param("timeframe", "1h");
            then.status(StatusCode::OK)
                .json_body(json!({"recap": "crypto summary"}));
        });
        let macro_ = server.mock(|when, then| {
            when.method(GET)
                .path("/recaps")
                .query_param("feed_category", "macro")
                .query_param("timeframe", "1h");
            then.status(StatusCode::INTERNAL_SERVER_ERROR)
                .body("boom");
        });

        let recaps = client.fetch_all_recaps(Some("1h")).await;

        assert_eq!(recaps.len(), 2);
        let recap = recaps["crypto"].as_ref().unwrap();
        assert_eq!(recap.get("recap"), Some(&json!("crypto summary")));

        let err = recaps["macro"].as_ref().unwrap_err();
        assert_eq!(err.kind(), Kind::Status);
        assert_eq!(
            err.downcast_ref::<Status>().unwrap().status_code,
            StatusCode::INTERNAL_SERVER_ERROR
        );

        crypto.assert();
        macro_.assert();

        Ok(())
    }
}
