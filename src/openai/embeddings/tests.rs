use super::*;
use crate::RagError;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server_uri: &str) -> EmbeddingClient {
    let config = OpenAiConfig {
        base_url: server_uri.to_string(),
        ..OpenAiConfig::default()
    };
    EmbeddingClient::new(&config, "test-key".to_string()).expect("client should build")
}

#[tokio::test(flavor = "multi_thread")]
async fn batch_is_one_request_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "text-embedding-3-large",
            "input": ["Cats are mammals.", "Dogs are mammals."]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"index": 0, "embedding": [1.0, 0.0]},
                {"index": 1, "embedding": [0.0, 1.0]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let vectors = client
        .embed_batch(&[
            "Cats are mammals.".to_string(),
            "Dogs are mammals.".to_string(),
        ])
        .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn vectors_are_ordered_by_index_not_response_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0]},
                {"index": 0, "embedding": [1.0, 0.0]}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let vectors = client
        .embed_batch(&["a".to_string(), "b".to_string()])
        .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_input_makes_no_request() {
    let server = MockServer::start().await;

    let client = test_client(&server.uri());
    let vectors = client.embed_batch(&[]).expect("empty batch should succeed");

    assert!(vectors.is_empty());
    let requests = server
        .received_requests()
        .await
        .expect("requests should be recorded");
    assert!(requests.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn count_mismatch_is_a_permanent_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0]}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .embed_batch(&["a".to_string(), "b".to_string()])
        .expect_err("mismatched count should fail");

    assert!(!error.is_transient());
    assert!(matches!(error, RagError::Upstream(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limiting_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let error = client
        .embed_batch(&["a".to_string()])
        .expect_err("rate limited call should fail");

    assert!(error.is_transient());
}

#[tokio::test(flavor = "multi_thread")]
async fn embed_one_returns_a_single_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(serde_json::json!({
            "input": ["What are mammals?"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"index": 0, "embedding": [0.5, 0.5]}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let vector = client
        .embed_one("What are mammals?")
        .expect("embedding should succeed");

    assert_eq!(vector, vec![0.5, 0.5]);
}
