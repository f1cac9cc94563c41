mod common;

use std::sync::Arc;
use std::time::Duration;

use common::one_shot_server;
use gapfinder::config::EmbedderSettings;
use gapfinder::embedding::{shared, shared_embedder, Embedder, HashingEmbedder, HttpEmbedder};
use gapfinder::AnalysisError;

#[tokio::test]
async fn test_http_embedder_reorders_by_index() {
    let (base, server) = one_shot_server(
        "200 OK",
        r#"{"data": [{"embedding": [0.0, 1.0], "index": 1}, {"embedding": [1.0, 0.0], "index": 0}]}"#,
    )
    .await;

    let embedder = HttpEmbedder::new(&base, "embed-test", Some("token"), None, Duration::from_secs(5))
        .unwrap()
        .with_batch_size(8);
    let texts = vec!["first text".to_string(), "second text".to_string()];
    let vectors = embedder.embed(&texts).await.unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(embedder.model_id(), "embed-test");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /embeddings"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer token"));
    assert!(request.contains("\"model\":\"embed-test\""));
}

#[tokio::test]
async fn test_http_embedder_count_mismatch_is_dependency_error() {
    let (base, _server) = one_shot_server("200 OK", r#"{"data": [{"embedding": [1.0, 0.0], "index": 0}]}"#).await;

    let embedder = HttpEmbedder::new(&base, "embed-test", None, None, Duration::from_secs(5)).unwrap();
    let texts = vec!["first text".to_string(), "second text".to_string()];
    let err = embedder.embed(&texts).await.unwrap_err();

    assert!(matches!(err, AnalysisError::Dependency(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_http_embedder_client_error_is_not_retried() {
    let (base, _server) = one_shot_server("400 Bad Request", r#"{"error": "bad model"}"#).await;

    let embedder = HttpEmbedder::new(&base, "embed-test", None, None, Duration::from_secs(5)).unwrap();
    let err = embedder.embed(&["some text here".to_string()]).await.unwrap_err();

    match err {
        AnalysisError::Dependency(msg) => assert!(msg.contains("400"), "{}", msg),
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_hashing_embedder_is_deterministic() {
    let embedder = HashingEmbedder::new(128).unwrap();
    let texts = vec![
        "The ferryman refused to take silver for the crossing.".to_string(),
        "The ferryman refused to take silver for the crossing.".to_string(),
        "Snow buried the mountain pass for a whole month.".to_string(),
    ];

    let vectors = embedder.embed(&texts).await.unwrap();
    assert_eq!(vectors.len(), 3);
    assert!(vectors.iter().all(|v| v.len() == 128));
    assert_eq!(vectors[0], vectors[1]);
    assert_ne!(vectors[0], vectors[2]);
    assert!(HashingEmbedder::new(4).is_err());
}

#[tokio::test]
async fn test_shared_embedder_initializes_once() {
    assert!(shared::loaded().is_none());

    let first = shared_embedder(&EmbedderSettings::Hashing { dimensions: 64 }, Duration::from_secs(5))
        .await
        .unwrap();
    // Later settings are ignored once the instance exists
    let second = shared_embedder(&EmbedderSettings::Hashing { dimensions: 256 }, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.model_id(), "hashing-64");
    assert!(shared::loaded().is_some());
}
