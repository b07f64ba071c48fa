//! Scripted HTTP client for tests
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;

use crate::{
    error::{Error, Result},
    http_client::{HttpClient, JsonResponse},
};

#[derive(Debug, Clone)]
pub enum MockReply {
    Json(StatusCode, Value),
    TransportError,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        MockReply::Json(StatusCode::OK, body)
    }

    pub fn status(status: StatusCode) -> Self {
        MockReply::Json(status, Value::Null)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    replies: HashMap<String, VecDeque<MockReply>>,
    requests: Vec<(String, Instant)>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Default::default()
    }

    /// Queues a reply for the exact `url`, replies are consumed in order.
    pub fn push_reply(&self, url: &str, reply: MockReply) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .replies
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.requests.iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn request_times(&self) -> Vec<Instant> {
        let inner = self.inner.lock().unwrap();
        inner.requests.iter().map(|(_, at)| *at).collect()
    }
}

impl HttpClient for MockHttpClient {
    async fn get_json(&self, url: &Url, _referer: &str) -> Result<JsonResponse> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push((url.to_string(), Instant::now()));
        let reply = inner
            .replies
            .get_mut(url.as_str())
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("no mock reply left for {url}"));
        match reply {
            MockReply::Json(status, body) => Ok(JsonResponse::new(status, body)),
            MockReply::TransportError => Err(Error::Other("mock transport error".into())),
        }
    }
}
