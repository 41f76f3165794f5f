//! Canned-reply backend for tests and offline runs.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{Error, ServiceErrorKind};

use super::{GenerationBackend, ModelRequest, ModelResponse};

#[derive(Debug)]
enum Reply {
    Response(ModelResponse),
    Failure(ServiceErrorKind, String),
}

/// Replies from a queue; the last reply repeats once the queue drains.
/// Every request is recorded for inspection.
#[derive(Debug)]
pub struct StubBackend {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl StubBackend {
    fn with_reply(reply: Reply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([reply])),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `output` as the structured reply.
    pub fn with_output(output: Value) -> Self {
        Self::with_reply(Reply::Response(ModelResponse::from_output(output)))
    }

    /// Always answer with raw model text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Response(ModelResponse::from_text(text)))
    }

    /// Always answer, but with nothing usable.
    pub fn empty() -> Self {
        Self::with_reply(Reply::Response(ModelResponse::empty()))
    }

    /// Always fail with a service error of `kind`.
    pub fn failing(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Failure(kind, message.into()))
    }

    /// Queue another structured reply after the current ones.
    pub fn then_output(self, output: Value) -> Self {
        self.lock_replies()
            .push_back(Reply::Response(ModelResponse::from_output(output)));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests().last().map(|r| r.prompt.clone())
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Reply>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_reply(&self) -> crate::Result<ModelResponse> {
        let mut replies = self.lock_replies();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            None
        };
        let current = reply.as_ref().or_else(|| replies.front());
        match current {
            Some(Reply::Response(resp)) => Ok(resp.clone()),
            Some(Reply::Failure(kind, message)) => Err(Error::service(*kind, message.clone())),
            None => Ok(ModelResponse::empty()),
        }
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, request: ModelRequest) -> crate::Result<ModelResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);
        self.next_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_requests_and_repeats_last_reply() {
        let stub = StubBackend::with_output(json!({"n": 1})).then_output(json!({"n": 2}));

        let first = stub.generate(ModelRequest::text("a")).await.unwrap();
        let second = stub.generate(ModelRequest::text("b")).await.unwrap();
        let third = stub.generate(ModelRequest::text("c")).await.unwrap();

        assert_eq!(first.output, Some(json!({"n": 1})));
        assert_eq!(second.output, Some(json!({"n": 2})));
        assert_eq!(third.output, Some(json!({"n": 2})));
        assert_eq!(stub.requests().len(), 3);
        assert_eq!(stub.last_prompt().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_failing_stub() {
        let stub = StubBackend::failing(ServiceErrorKind::Timeout, "slow");
        let err = stub.generate(ModelRequest::text("a")).await.unwrap_err();
        assert_eq!(err.service_kind(), Some(ServiceErrorKind::Timeout));
    }
}
