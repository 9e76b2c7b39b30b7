use super::*;
use crate::config::{OpenAiConfig, QdrantConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_pipeline(server_uri: &str, dimension: u32) -> QueryPipeline {
    let openai = OpenAiConfig {
        base_url: server_uri.to_string(),
        ..OpenAiConfig::default()
    };
    let qdrant = QdrantConfig {
        url: server_uri.to_string(),
        dimension,
        ..QdrantConfig::default()
    };

    let embeddings =
        EmbeddingClient::new(&openai, "test-key".to_string()).expect("client should build");
    let completion =
        CompletionClient::new(&openai, "test-key".to_string()).expect("client should build");
    let store = QdrantStore::connect(&qdrant).expect("connect should succeed");
    QueryPipeline::new(embeddings, completion, store)
}

async fn mount_existing_collection(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/collections/rag_collection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"status": "green"}
        })))
        .mount(server)
        .await;
}

#[test]
fn prompt_lists_context_in_rank_order_and_quotes_the_question() {
    let context = vec!["Cats are mammals.".to_string(), "Dogs are mammals.".to_string()];
    let prompt = build_prompt(&context, "What are mammals?");

    assert!(prompt.contains(" - Cats are mammals.\n - Dogs are mammals."));
    assert!(prompt.contains("Question: What are mammals?"));
}

#[test]
fn prompt_with_no_context_has_a_bare_context_block() {
    let prompt = build_prompt(&[], "What are mammals?");

    assert!(prompt.contains("Context:\n\n"));
    assert!(prompt.contains("Question: What are mammals?"));
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_question_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    mount_existing_collection(&server).await;

    let pipeline = test_pipeline(&server.uri(), 2);
    let result = pipeline.answer("   \n", DEFAULT_TOP_K);

    assert!(matches!(result, Err(RagError::EmptyQuestion)));

    // Only the store's existence probe from connect.
    let requests = server
        .received_requests()
        .await
        .expect("requests should be recorded");
    assert_eq!(requests.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn answers_from_retrieved_context() {
    let server = MockServer::start().await;
    mount_existing_collection(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(serde_json::json!({
            "input": ["What are mammals?"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0]}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/rag_collection/points/query"))
        .and(body_partial_json(serde_json::json!({"limit": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"points": [
                {"id": "a", "score": 0.9, "payload": {"source": "animals.pdf", "text": "Cats are mammals."}},
                {"id": "b", "score": 0.8, "payload": {"source": "animals.pdf", "text": "Dogs are mammals."}}
            ]}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "  Cats and dogs.\n"}}]
        })))
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&server.uri(), 2);
    let outcome = pipeline
        .answer("What are mammals?", 2)
        .expect("answer should succeed");

    assert_eq!(outcome.answer, "Cats and dogs.");
    assert_eq!(outcome.sources, vec!["animals.pdf"]);
    assert_eq!(outcome.num_contexts, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_corpus_still_asks_the_model() {
    let server = MockServer::start().await;
    mount_existing_collection(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0]}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/rag_collection/points/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {"points": []}
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "I don't know."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&server.uri(), 2);
    let outcome = pipeline
        .answer("What are mammals?", DEFAULT_TOP_K)
        .expect("answer should succeed");

    assert_eq!(outcome.answer, "I don't know.");
    assert!(outcome.sources.is_empty());
    assert_eq!(outcome.num_contexts, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_failure_aborts_without_a_fabricated_answer() {
    let server = MockServer::start().await;
    mount_existing_collection(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"index": 0, "embedding": [1.0, 0.0]}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/rag_collection/points/query"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pipeline = test_pipeline(&server.uri(), 2);
    let result = pipeline.answer("What are mammals?", DEFAULT_TOP_K);

    assert!(matches!(result, Err(RagError::CollectionUnavailable(_))));

    // The completion endpoint was never reached.
    let requests = server
        .received_requests()
        .await
        .expect("requests should be recorded");
    assert!(
        requests
            .iter()
            .all(|r| r.url.path() != "/v1/chat/completions")
    );
}
