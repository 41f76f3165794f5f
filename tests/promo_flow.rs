//! Promo script flow against a stub backend.

use jinglemaker::backend::{GenerationBackend, ModelRequest, ModelResponse, StubBackend};
use jinglemaker::flows::promo_script::{self, generate, generate_json, GenerationRequest};
use jinglemaker::{Error, ServiceErrorKind};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_morning_show_example() {
    let stub = StubBackend::with_output(json!({"script": "Wake up with the hottest morning show!"}));

    let result = generate(&stub, GenerationRequest::new("radio, upbeat, morning show"))
        .await
        .unwrap();

    assert_eq!(result.script, "Wake up with the hottest morning show!");
    let prompt = stub.last_prompt().unwrap();
    assert!(prompt.contains("Keywords: radio, upbeat, morning show"));
}

#[tokio::test]
async fn test_prompt_contains_exact_keywords() {
    let samples = [
        "jazz",
        "  leading and trailing  ",
        "café, naïve, 東京",
        "{{not a placeholder}}",
        "line one\nline two",
        "<b>bold</b> & \"quoted\"",
    ];
    for keywords in samples {
        let stub = StubBackend::with_output(json!({"script": "ok"}));
        generate(&stub, GenerationRequest::new(keywords)).await.unwrap();
        let prompt = stub.last_prompt().unwrap();
        assert!(prompt.contains(keywords), "prompt lost keywords {keywords:?}");
    }
}

#[tokio::test]
async fn test_request_declares_output_schema() {
    let stub = StubBackend::with_output(json!({"script": "ok"}));
    generate(&stub, GenerationRequest::new("podcast")).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let schema = requests[0].output_schema.as_ref().unwrap();
    assert_eq!(schema["properties"]["script"]["type"], "string");
    assert_eq!(schema["required"], json!(["script"]));
}

#[tokio::test]
async fn test_script_returned_unchanged() {
    let script = "  Tune in to 99.1 FM!\n\nYour station, your sound.  ";
    let stub = StubBackend::with_output(json!({ "script": script }));
    let result = generate(&stub, GenerationRequest::new("fm")).await.unwrap();
    assert_eq!(result.script, script);
}

#[tokio::test]
async fn test_text_reply_in_code_fence() {
    let stub = StubBackend::with_text("```json\n{\"script\": \"Drop the beat!\"}\n```");
    let result = generate(&stub, GenerationRequest::new("party, dj")).await.unwrap();
    assert_eq!(result.script, "Drop the beat!");
}

#[tokio::test]
async fn test_missing_output_is_service_error() {
    let stub = StubBackend::empty();
    let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
    assert_eq!(err.service_kind(), Some(ServiceErrorKind::EmptyOutput));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn test_unparseable_text_is_service_error() {
    let stub = StubBackend::with_text("Sorry, I can't write that.");
    let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
    assert_eq!(err.service_kind(), Some(ServiceErrorKind::EmptyOutput));
}

#[tokio::test]
async fn test_null_output_is_not_an_empty_script() {
    let stub = StubBackend::with_output(serde_json::Value::Null);
    let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
    assert!(err.is_validation(), "expected validation error, got {err}");
    assert_eq!(
        err.context().and_then(|c| c.field_path.as_deref()),
        Some("output")
    );
}

#[tokio::test]
async fn test_matching_object_found_among_several_in_prose() {
    let stub = StubBackend::with_text(r#"Here: {"a":1} and {"script":"x"}"#);
    let result = generate(&stub, GenerationRequest::new("radio")).await.unwrap();
    assert_eq!(result.script, "x");
}

#[tokio::test]
async fn test_no_matching_object_in_prose_is_validation_error() {
    let stub = StubBackend::with_text(r#"Here: {"a":1} and {"b":2}"#);
    let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_wrong_output_shape_is_validation_error() {
    for output in [
        json!({"script": 42}),
        json!({"text": "hello"}),
        json!(["hello"]),
        json!("hello"),
    ] {
        let stub = StubBackend::with_output(output.clone());
        let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
        match err {
            Error::Validation { ref context, ref errors, .. } => {
                assert_eq!(context.field_path.as_deref(), Some("output"), "{output}");
                assert!(!errors.is_empty());
            }
            other => panic!("expected validation error for {output}, got {other}"),
        }
    }
}

#[tokio::test]
async fn test_non_string_input_is_rejected_before_backend_call() {
    let stub = StubBackend::with_output(json!({"script": "never"}));
    for input in [json!({"keywords": 5}), json!({}), json!({"keywords": null}), json!("radio")] {
        let err = generate_json(&stub, input.clone()).await.unwrap_err();
        assert!(err.is_validation(), "expected validation error for {input}");
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("input")
        );
    }
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn test_raw_json_input_accepted() {
    let stub = StubBackend::with_output(json!({"script": "Hello Miami!"}));
    let result = generate_json(&stub, json!({"keywords": "miami, podcast"}))
        .await
        .unwrap();
    assert_eq!(result.script, "Hello Miami!");
}

#[tokio::test]
async fn test_empty_keywords_accepted() {
    let stub = StubBackend::with_output(json!({"script": "Something generic"}));
    let result = generate(&stub, GenerationRequest::new("")).await.unwrap();
    assert_eq!(result.script, "Something generic");
    assert!(stub.last_prompt().unwrap().contains("Keywords: \n"));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_empty_keywords_warn_on_both_entry_points() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let stub = StubBackend::with_output(json!({"script": "Something generic"}));
    generate(&stub, GenerationRequest::new("  ")).await.unwrap();
    assert_eq!(logs.text().matches("empty keyword list").count(), 1);

    generate_json(&stub, json!({"keywords": ""})).await.unwrap();
    assert_eq!(logs.text().matches("empty keyword list").count(), 2);

    generate_json(&stub, json!({"keywords": "jazz"})).await.unwrap();
    assert_eq!(logs.text().matches("empty keyword list").count(), 2);
}

#[tokio::test]
async fn test_backend_failure_propagates_unchanged() {
    let stub = StubBackend::failing(ServiceErrorKind::Transport, "connection reset");
    let err = generate(&stub, GenerationRequest::new("radio")).await.unwrap_err();
    match err {
        Error::Service { kind, message, .. } => {
            assert_eq!(kind, ServiceErrorKind::Transport);
            assert_eq!(message, "connection reset");
        }
        other => panic!("expected service error, got {other}"),
    }
}

#[tokio::test]
async fn test_structural_shape_only_across_calls() {
    let stub = StubBackend::with_output(json!({"script": "Take one"}))
        .then_output(json!({"script": "Take two"}));
    let request = GenerationRequest::new("same, keywords");

    let first = generate(&stub, request.clone()).await.unwrap();
    let second = generate(&stub, request).await.unwrap();
    assert!(!first.script.is_empty());
    assert!(!second.script.is_empty());
}

/// Backend that reports text without JSON but a finish reason, as a filtered reply would.
#[derive(Debug)]
struct FilteredBackend;

#[async_trait::async_trait]
impl GenerationBackend for FilteredBackend {
    fn name(&self) -> &str {
        "filtered"
    }

    async fn generate(&self, _request: ModelRequest) -> jinglemaker::Result<ModelResponse> {
        Ok(ModelResponse {
            finish_reason: Some("content_filter".into()),
            ..ModelResponse::empty()
        })
    }
}

#[tokio::test]
async fn test_custom_backend_through_trait_object() {
    let backend: Box<dyn GenerationBackend> = Box::new(FilteredBackend);
    let err = promo_script::generate(backend.as_ref(), GenerationRequest::new("radio"))
        .await
        .unwrap_err();
    assert_eq!(err.service_kind(), Some(ServiceErrorKind::EmptyOutput));
}
