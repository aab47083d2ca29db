// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stub Talk server recording every request it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("body should be JSON")
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    delay: Duration,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubTalk {
    pub base_url: String,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubTalk {
    /// Start a stub answering every request with `status`.
    pub async fn start(status: StatusCode) -> Self {
        Self::start_delayed(status, Duration::ZERO).await
    }

    /// Start a stub that holds every response back for `delay`.
    pub async fn start_delayed(status: StatusCode, delay: Duration) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            status,
            delay,
            received: received.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.received.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    state.received.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    state.status
}
