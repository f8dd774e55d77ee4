//! Scripted HTTP backend for exercising the engine without a network

use crate::error::{OpcError, Result};
use crate::transport::{HttpBackend, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued responses in order, then falls back to a fixed response.
///
/// Every request is recorded (including auth headers) for later inspection.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(Ok(HttpResponse::new(status, body.as_bytes().to_vec())));
        self
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value) -> Self {
        self.respond(status, &body.to_string())
    }

    /// Queue a connection-level failure
    pub fn fail(self, message: &str) -> Self {
        self.push(Err(OpcError::Transport(message.to_string())));
        self
    }

    /// Response returned once the script is exhausted
    pub fn always(mut self, status: u16, body: &str) -> Self {
        self.fallback = Some(HttpResponse::new(status, body.as_bytes().to_vec()));
        self
    }

    fn push(&self, entry: Result<HttpResponse>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl HttpBackend for ScriptedBackend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(entry) => entry,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| OpcError::Transport("script exhausted".to_string())),
        }
    }
}
