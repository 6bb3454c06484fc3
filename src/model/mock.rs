//! Mock model clients for testing
//!
//! These never touch the network. Replies are scripted up front and every
//! request is recorded so tests can assert on what would have been sent.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::client::{CompletionRequest, ModelClient, Transcriber};
use super::registry::ModelId;
use crate::error::ModelClientError;
use crate::ingest::AudioClip;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, ModelClientError> + Send + Sync>;

/// Scripted text model
///
/// Queued replies are used first, in order. Once the queue is empty the
/// responder (if any) answers, otherwise the call fails with a model error.
#[derive(Default)]
pub struct MockModelClient {
    replies: Mutex<VecDeque<Result<String, ModelClientError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn with_error(self, error: ModelClientError) -> Self {
        self.push_error(error);
        self
    }

    /// Answer every unscripted request with `f`
    pub fn with_responder<F>(mut self, f: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, ModelClientError> + Send + Sync + 'static,
    {
        self.responder = Some(Box::new(f));
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: ModelClientError) {
        self.lock_replies().push_back(Err(error));
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<String, ModelClientError>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelClientError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(reply) = self.lock_replies().pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Err(ModelClientError::model("mock client has no scripted reply")),
        }
    }
}

/// Scripted speech-to-text
pub struct MockTranscriber {
    reply: Result<String, ModelClientError>,
    calls: Mutex<Vec<ModelId>>,
}

impl MockTranscriber {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            reply: Ok(transcript.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ModelClientError) -> Self {
        Self {
            reply: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Models used for each call so far
    pub fn calls(&self) -> Vec<ModelId> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _clip: &AudioClip, model: &ModelId) -> Result<String, ModelClientError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(model.clone());
        self.reply.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_replies_then_responder() {
        let client = MockModelClient::new()
            .with_reply("first")
            .with_error(ModelClientError::rate_limited("slow down", Some(2)))
            .with_responder(|req| Ok(format!("echo {}", req.model)));

        let req = CompletionRequest::new("p", ModelId::default());
        assert_eq!(client.complete(&req), Ok("first".to_string()));
        assert!(client.complete(&req).is_err());
        assert_eq!(client.complete(&req), Ok("echo gemini-2.5-flash".to_string()));
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn test_unscripted_call_is_model_error() {
        let client = MockModelClient::new();
        let err = client
            .complete(&CompletionRequest::new("p", ModelId::default()))
            .unwrap_err();
        assert!(matches!(err, ModelClientError::Model { .. }));
        assert_eq!(client.last_request().map(|r| r.prompt), Some("p".to_string()));
    }
}
