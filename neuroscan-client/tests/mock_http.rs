//! HTTP contract tests for the backing-service clients.
//!
//! Each test stands up a [`wiremock`] server emulating Ollama, the model server
//! or Neo4j and checks the request shape and response handling.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neuroscan_client::neo4j::GraphNode;
use neuroscan_client::{ChatMessage, ClientError, GraphEdge, ModelServerClient, Neo4jClient, OllamaClient};

// ── Ollama ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn ollama_chat_returns_assistant_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "mistral:latest",
            "stream": false,
            "options": { "temperature": 0.1 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral:latest",
            "message": { "role": "assistant", "content": "Diagnosis: Tumor detected" },
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "mistral:latest", 0.1);
    let reply = client
        .chat(&[ChatMessage::system("You are a radiologist"), ChatMessage::user("Interpret")])
        .await
        .unwrap();

    assert_eq!(reply, "Diagnosis: Tumor detected");
}

#[tokio::test]
async fn ollama_chat_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "model 'mistral:latest' not found" })),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "mistral:latest", 0.1);
    let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("model 'mistral:latest' not found"));
}

#[tokio::test]
async fn ollama_chat_without_message_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "mistral:latest", 0.1);
    let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)));
}

#[tokio::test]
async fn ollama_availability_requires_installed_model() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "llama3:8b" }, { "name": "mistral:latest" }]
        })))
        .mount(&server)
        .await;

    let installed = OllamaClient::new(server.uri(), "mistral:latest", 0.1);
    let missing = OllamaClient::new(server.uri(), "phi3:mini", 0.1);

    assert!(installed.is_available().await);
    assert!(!missing.is_available().await);
}

// ── Model server ───────────────────────────────────────────────────────

#[tokio::test]
async fn model_status_reports_available_version() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models/best_model_VGG19"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_version_status": [{
                "version": "1",
                "state": "AVAILABLE",
                "status": { "error_code": "OK", "error_message": "" }
            }]
        })))
        .mount(&server)
        .await;

    let client = ModelServerClient::new(server.uri(), "best_model_VGG19");
    assert!(client.model_status().await.unwrap().is_available());
}

#[tokio::test]
async fn predict_posts_instances_and_reads_predictions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/best_model_VGG19:predict"))
        .and(body_partial_json(json!({ "instances": [[0.5, 0.25]] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "predictions": [[0.87]] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ModelServerClient::new(server.uri(), "best_model_VGG19");
    let predictions = client.predict(&[vec![0.5f32, 0.25]]).await.unwrap();

    assert_eq!(predictions, vec![vec![0.87]]);
}

#[tokio::test]
async fn predict_rejects_mismatched_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/models/m:predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "predictions": [] })))
        .mount(&server)
        .await;

    let client = ModelServerClient::new(server.uri(), "m");
    let err = client.predict(&[vec![0.0f32]]).await.unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)));
}

// ── Neo4j ──────────────────────────────────────────────────────────────

fn neo4j(server: &MockServer) -> Neo4jClient {
    Neo4jClient::new(server.uri(), "neo4j", "neo4j", "secret")
}

#[tokio::test]
async fn neo4j_treatments_use_basic_auth_and_text_parameter() {
    let server = MockServer::start().await;

    // base64("neo4j:secret")
    Mock::given(method("POST"))
        .and(path("/db/neo4j/tx/commit"))
        .and(header("Authorization", "Basic bmVvNGo6c2VjcmV0"))
        .and(body_partial_json(json!({
            "statements": [{ "parameters": { "text": "Diagnosis: Glioblastoma" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "columns": ["t.name"],
                "data": [{ "row": ["Surgery + Radiotherapy"], "meta": [null] }]
            }],
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let treatments = neo4j(&server)
        .treatments_matching("Diagnosis: Glioblastoma")
        .await
        .unwrap();

    assert_eq!(treatments, vec!["Surgery + Radiotherapy".to_string()]);
}

#[tokio::test]
async fn neo4j_errors_in_ok_response_are_query_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/neo4j/tx/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [],
            "errors": [{
                "code": "Neo.ClientError.Security.Unauthorized",
                "message": "The client is unauthorized due to authentication failure."
            }]
        })))
        .mount(&server)
        .await;

    let err = neo4j(&server).ping().await.unwrap_err();

    match err {
        ClientError::QueryFailed(msg) => assert!(msg.contains("Unauthorized")),
        other => panic!("expected QueryFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn neo4j_edges_are_parsed_from_rows() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/neo4j/tx/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "columns": ["a", "an", "r", "b", "bn"],
                "data": [
                    { "row": ["Tumor", "Glioblastoma", "DETECTED_BY", "Analysis", "MRI VGG19"] },
                    { "row": ["Tumor", "Glioblastoma", "TREATED_BY", "Treatment", "Surgery + Radiotherapy"] }
                ]
            }],
            "errors": []
        })))
        .mount(&server)
        .await;

    let edges = neo4j(&server).edges().await.unwrap();

    assert_eq!(edges.len(), 2);
    assert_eq!(
        edges[1],
        GraphEdge {
            source: GraphNode::new("Tumor", "Glioblastoma"),
            relation: "TREATED_BY".to_string(),
            target: GraphNode::new("Treatment", "Surgery + Radiotherapy"),
        }
    );
}

#[tokio::test]
async fn neo4j_merge_sends_one_statement_per_edge() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/neo4j/tx/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "columns": [], "data": [] }, { "columns": [], "data": [] }],
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let edges = vec![
        GraphEdge {
            source: GraphNode::new("Tumor", "Glioblastoma"),
            relation: "DETECTED_BY".to_string(),
            target: GraphNode::new("Analysis", "MRI VGG19"),
        },
        GraphEdge {
            source: GraphNode::new("Tumor", "Glioblastoma"),
            relation: "TREATED_BY".to_string(),
            target: GraphNode::new("Treatment", "Surgery + Radiotherapy"),
        },
    ];

    neo4j(&server).merge_edges(&edges).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["statements"].as_array().unwrap().len(), 2);
}
