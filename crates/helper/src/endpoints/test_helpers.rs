//! # エンドポイントテスト用共通ヘルパー
//!
//! モックTSAサーバーとテスト用共有状態。

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use tas_crypto::ArtifactDigest;

use crate::config::{HelperConfig, HelperState};

/// 起動したモックTSAと、受信した内容の記録。
pub struct MockTsa {
    pub url: String,
    received: Arc<Mutex<Vec<serde_json::Value>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

impl MockTsa {
    /// 受信したTSAリクエストのJSON
    pub fn received(&self) -> Vec<serde_json::Value> {
        self.received.lock().unwrap().clone()
    }

    /// 受信したリクエストのContent-Type
    pub fn content_types(&self) -> Vec<String> {
        self.content_types.lock().unwrap().clone()
    }
}

/// 指定ステータスとボディを返すモックTSAを起動する。
pub async fn start_mock_tsa(status: StatusCode, reply: Vec<u8>) -> MockTsa {
    let received = Arc::new(Mutex::new(Vec::new()));
    let content_types = Arc::new(Mutex::new(Vec::new()));

    let app = {
        let received = received.clone();
        let content_types = content_types.clone();
        axum::Router::new().route(
            "/api/v1/timestamp",
            axum::routing::post(move |headers: HeaderMap, body: Bytes| {
                let received = received.clone();
                let content_types = content_types.clone();
                let reply = reply.clone();
                async move {
                    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
                        content_types
                            .lock()
                            .unwrap()
                            .push(ct.to_str().unwrap().to_string());
                    }
                    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
                    received.lock().unwrap().push(value);
                    (status, reply)
                }
            }),
        )
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    MockTsa {
        url: format!("http://127.0.0.1:{port}/api/v1/timestamp"),
        received,
        content_types,
    }
}

/// 何もリッスンしていないポートを返す。
pub async fn closed_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// テスト用の共有状態を構築する。
pub fn test_state(tsa_url: &str) -> Arc<HelperState> {
    test_state_with_digest(tsa_url, ArtifactDigest::generate().unwrap())
}

/// ダイジェストを指定してテスト用の共有状態を構築する。
pub fn test_state_with_digest(tsa_url: &str, digest: ArtifactDigest) -> Arc<HelperState> {
    let config = HelperConfig::from_lookup(|key| match key {
        "TSA_URL" => Some(tsa_url.to_string()),
        "TSA_TIMEOUT_SECS" => Some("10".to_string()),
        _ => None,
    })
    .unwrap();
    Arc::new(HelperState::new(&config, digest).unwrap())
}
