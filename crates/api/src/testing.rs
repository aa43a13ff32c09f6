//! In-memory fakes for exercising the client without a network.
//!
//! [`ScriptedTransport`] answers by exact request path and records every
//! request it sees; unscripted paths answer 404. [`RecordingSleeper`]
//! returns immediately and remembers each requested wait.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::transport::{FetchRequest, Sleeper, Transport, TransportError, TransportResponse};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    /// Status 200 with a raw, possibly invalid, body.
    Raw(String),
    NetworkError(String),
}

#[derive(Debug, Default)]
struct Route {
    /// Consumed front to back; the last reply repeats.
    replies: VecDeque<Reply>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `path` with 200 and `body`.
    pub fn json(self, path: impl Into<String>, body: Value) -> Self {
        self.sequence(path, vec![Reply::Json(body)])
    }

    /// Always answer `path` with `status` and an empty body.
    pub fn status(self, path: impl Into<String>, status: u16) -> Self {
        self.sequence(path, vec![Reply::Status(status)])
    }

    /// Answer `path` with `replies` in order, repeating the last one.
    pub fn sequence(self, path: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.routes.lock().expect("routes lock poisoned").insert(
            path.into(),
            Route {
                replies: replies.into(),
            },
        );
        self
    }

    /// Paths requested so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock poisoned").len()
    }

    /// Number of requests whose path satisfies `predicate`.
    pub fn count_where(&self, predicate: impl Fn(&str) -> bool) -> usize {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .iter()
            .filter(|request| predicate(&request.path))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &FetchRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("requests lock poisoned").push(request.clone());

        let reply = {
            let mut routes = self.routes.lock().expect("routes lock poisoned");
            match routes.get_mut(&request.path) {
                Some(route) if route.replies.len() > 1 => route.replies.pop_front(),
                Some(route) => route.replies.front().cloned(),
                None => None,
            }
        };

        match reply.unwrap_or(Reply::Status(404)) {
            Reply::Json(body) => Ok(TransportResponse {
                status: StatusCode::OK,
                body: body.to_string().into_bytes(),
            }),
            Reply::Raw(body) => Ok(TransportResponse {
                status: StatusCode::OK,
                body: body.into_bytes(),
            }),
            Reply::Status(code) => Ok(TransportResponse {
                status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                body: Vec::new(),
            }),
            Reply::NetworkError(message) => Err(TransportError(message)),
        }
    }
}

/// Records requested waits instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("waits lock poisoned").clone()
    }

    pub fn total(&self) -> Duration {
        self.waits().into_iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().expect("waits lock poisoned").push(duration);
    }
}
