#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use campus_data::backend::{Backend, Query, Request};
use campus_data::{DataError, DataResult};
use serde_json::{json, Value};
use tokio::sync::Mutex;

type Responder = dyn Fn(&Request) -> DataResult<Value> + Send + Sync;
type Delay = dyn Fn(&Request) -> Duration + Send + Sync;

/// Fake backend that records every request and answers through a responder.
#[derive(Clone)]
pub struct RecordingBackend {
    responder: Arc<Responder>,
    delay: Arc<Delay>,
    calls: Arc<Mutex<Vec<Request>>>,
}

impl RecordingBackend {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> DataResult<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            delay: Arc::new(|_| Duration::ZERO),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer requests in order; once exhausted, answer with an empty list.
    pub fn with_responses(responses: Vec<DataResult<Value>>) -> Self {
        let queue = std::sync::Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!([])))
        })
    }

    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&Request) -> Duration + Send + Sync + 'static,
    {
        self.delay = Arc::new(delay);
        self
    }

    pub async fn calls(&self) -> Vec<Request> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Backend for RecordingBackend {
    async fn execute(&self, request: &Request) -> DataResult<Value> {
        self.calls.lock().await.push(request.clone());
        let wait = (self.delay)(request);
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        (self.responder)(request)
    }
}

pub fn backend_error(code: &str, message: &str) -> DataError {
    backend_error_with_status(400, code, message)
}

pub fn backend_error_with_status(status: u16, code: &str, message: &str) -> DataError {
    DataError::Backend {
        status,
        code: code.to_string(),
        message: message.to_string(),
        details: None,
        hint: None,
    }
}

/// Encoded value of a query-string parameter.
pub fn param(query: &Query, key: &str) -> Option<String> {
    query
        .to_params(true)
        .into_iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

pub fn select_query(request: &Request) -> &Query {
    match request {
        Request::Select(q) => q,
        other => panic!("expected select, got {other:?}"),
    }
}

pub fn delete_query(request: &Request) -> &Query {
    match request {
        Request::Delete(q) => q,
        other => panic!("expected delete, got {other:?}"),
    }
}
