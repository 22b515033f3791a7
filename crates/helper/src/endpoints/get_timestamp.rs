//! # POST /get-timestamp
//!
//! 呼び出し元が生成した署名をTSAへ中継し、タイムスタンプ応答を
//! `application/timestamp-reply` としてそのまま返す。

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::response::{IntoResponse, Response};
use tas_types::TIMESTAMP_REPLY_CONTENT_TYPE;

use crate::config::HelperState;
use crate::error::HelperError;
use crate::tsa::forward_to_tsa;

/// POST /get-timestamp — TSAへのタイムスタンプ要求の中継。
///
/// POST以外はボディを読まずに405を返し、TSAへの通信も行わない。
/// ボディはサイズ上限なしで全て読み込む。
pub async fn handle_get_timestamp(
    State(state): State<Arc<HelperState>>,
    request: Request,
) -> Result<Response, HelperError> {
    if *request.method() != Method::POST {
        return Err(HelperError::MethodNotAllowed(request.method().to_string()));
    }

    let signature = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(|e| HelperError::BodyRead(e.to_string()))?;

    let timestamp_reply = forward_to_tsa(&state.http_client, &state.tsa_url, &signature).await?;

    Ok((
        [(header::CONTENT_TYPE, TIMESTAMP_REPLY_CONTENT_TYPE)],
        timestamp_reply,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, Bytes};
    use axum::http::StatusCode;

    use crate::endpoints::test_helpers::{closed_port, start_mock_tsa, test_state};

    fn request(method: Method, body: &'static [u8]) -> Request {
        axum::http::Request::builder()
            .method(method)
            .uri("/get-timestamp")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    /// TSAが201で返したボディをそのまま中継する
    #[tokio::test]
    async fn test_timestamp_passthrough_on_created() {
        let reply = vec![0x30, 0x82, 0x01, 0x00, 0xde, 0xad, 0xbe, 0xef];
        let mock = start_mock_tsa(StatusCode::CREATED, reply.clone()).await;
        let state = test_state(&mock.url);

        let response = handle_get_timestamp(State(state), request(Method::POST, b"signature-bytes"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            TIMESTAMP_REPLY_CONTENT_TYPE
        );
        assert_eq!(body_bytes(response).await, reply);
    }

    /// TSAへ送られたartifactHashがbase64(SHA-256(body))と一致する
    #[tokio::test]
    async fn test_tsa_receives_sha256_of_body() {
        let mock = start_mock_tsa(StatusCode::OK, b"token".to_vec()).await;
        let state = test_state(&mock.url);

        handle_get_timestamp(State(state), request(Method::POST, b"signature-bytes"))
            .await
            .unwrap();

        let received = mock.received();
        assert_eq!(received.len(), 1);
        let sent = &received[0];
        assert_eq!(
            sent["artifactHash"],
            "5/CCX3pz9ne2qrutMoAKxJ0E27UqC6DqAZNDS8Aewdw="
        );
        assert_eq!(sent["certificates"], true);
        assert_eq!(sent["hashAlgorithm"], "sha256");
        assert!(sent["nonce"].as_i64().unwrap() >= 0);
        assert_eq!(mock.content_types(), vec!["application/json".to_string()]);
    }

    /// TSAのエラーステータスは502としてボディ付きで返す
    #[tokio::test]
    async fn test_tsa_error_status_is_bad_gateway() {
        let mock = start_mock_tsa(StatusCode::INTERNAL_SERVER_ERROR, b"bad".to_vec()).await;
        let state = test_state(&mock.url);

        let err = handle_get_timestamp(State(state), request(Method::POST, b"sig"))
            .await
            .unwrap_err();

        assert!(matches!(err, HelperError::TsaStatus { status: 500, .. }));
        assert!(err.to_string().contains("bad"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(String::from_utf8(body_bytes(response).await)
            .unwrap()
            .contains("bad"));
    }

    /// 200/201以外の成功系ステータスも失敗扱い
    #[tokio::test]
    async fn test_tsa_accepted_is_not_success() {
        let mock = start_mock_tsa(StatusCode::ACCEPTED, b"pending".to_vec()).await;
        let state = test_state(&mock.url);

        let err = handle_get_timestamp(State(state), request(Method::POST, b"sig"))
            .await
            .unwrap_err();
        assert!(matches!(err, HelperError::TsaStatus { status: 202, .. }));
    }

    /// POST以外は405で、TSAへは送信しない
    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let mock = start_mock_tsa(StatusCode::OK, b"token".to_vec()).await;
        let state = test_state(&mock.url);

        let err = handle_get_timestamp(State(state), request(Method::GET, b""))
            .await
            .unwrap_err();

        assert!(matches!(err, HelperError::MethodNotAllowed(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
        assert!(mock.received().is_empty());
    }

    /// 大きな署名ボディも切り詰めずに全体をハッシュする
    #[tokio::test]
    async fn test_large_body_is_read_whole() {
        let mock = start_mock_tsa(StatusCode::OK, b"token".to_vec()).await;
        let state = test_state(&mock.url);
        let body = vec![0u8; 16 * 1024 * 1024 + 1];
        let expected_hash = tas_crypto::sha256_base64(&body);

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/get-timestamp")
            .body(Body::from(body))
            .unwrap();
        let response = handle_get_timestamp(State(state), request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let received = mock.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["artifactHash"], expected_hash.as_str());
    }

    /// ボディの読み取り途中で失敗した場合は500で、TSAへは送信しない
    #[tokio::test]
    async fn test_body_read_failure_is_internal_error() {
        let mock = start_mock_tsa(StatusCode::OK, b"token".to_vec()).await;
        let state = test_state(&mock.url);

        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"partial-")),
            Err(std::io::Error::other("connection reset")),
        ];
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/get-timestamp")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap();

        let err = handle_get_timestamp(State(state), request)
            .await
            .unwrap_err();

        assert!(matches!(err, HelperError::BodyRead(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(mock.received().is_empty());
    }

    /// TSAに接続できない場合は500
    #[tokio::test]
    async fn test_tsa_unreachable_is_internal_error() {
        let port = closed_port().await;
        let state = test_state(&format!("http://127.0.0.1:{port}/timestamp"));

        let err = handle_get_timestamp(State(state), request(Method::POST, b"sig"))
            .await
            .unwrap_err();

        assert!(matches!(err, HelperError::TsaNetwork(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
