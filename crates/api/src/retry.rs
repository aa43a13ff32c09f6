//! Classified retry with backoff.
//!
//! The policy ([`classify_status`], [`backoff`]) is pure; [`RetryExecutor`]
//! runs the attempt loop on top of a [`Transport`] and a [`Sleeper`].
//!
//! | outcome                         | kind        | wait before next attempt |
//! |---------------------------------|-------------|--------------------------|
//! | 400 401 403 404 405 410         | permanent   | none, fail at once       |
//! | 429                             | rate limit  | `30 + 2^attempt` s       |
//! | 5xx, other errors, no response  | transient   | `2^(attempt + 1)` s      |
//!
//! Attempts are 0-indexed and nothing is waited after the last one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::transport::{FetchRequest, Sleeper, Transport, TransportError};

const PERMANENT_STATUSES: &[StatusCode] = &[
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
    StatusCode::FORBIDDEN,
    StatusCode::NOT_FOUND,
    StatusCode::METHOD_NOT_ALLOWED,
    StatusCode::GONE,
];

const RATE_LIMIT_BASE_SECS: u64 = 30;

/// Classification of a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Permanent,
    RateLimited,
    Transient,
}

/// What to do after a failed attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp,
}

/// Classify a response status; `None` means success.
pub fn classify_status(status: StatusCode) -> Option<FailureKind> {
    if status.is_success() {
        None
    } else if PERMANENT_STATUSES.contains(&status) {
        Some(FailureKind::Permanent)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(FailureKind::RateLimited)
    } else {
        Some(FailureKind::Transient)
    }
}

/// Decide whether attempt `attempt` (0-indexed) of `max_attempts` is retried
/// and how long to wait first.
pub fn backoff(kind: FailureKind, attempt: u32, max_attempts: u32) -> RetryDecision {
    if kind == FailureKind::Permanent || attempt.saturating_add(1) >= max_attempts {
        return RetryDecision::GiveUp;
    }
    let secs = match kind {
        FailureKind::RateLimited => RATE_LIMIT_BASE_SECS.saturating_add(2u64.saturating_pow(attempt)),
        FailureKind::Transient => 2u64.saturating_pow(attempt.saturating_add(1)),
        FailureKind::Permanent => unreachable!("permanent failures never retry"),
    };
    RetryDecision::Retry(Duration::from_secs(secs))
}

/// Runs requests through the retry policy.
///
/// Holds no state beyond its configuration; clones share the transport and
/// sleeper and may be used from many tasks at once.
#[derive(Clone)]
pub struct RetryExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    max_attempts: u32,
}

impl RetryExecutor {
    pub fn new(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>, max_attempts: u32) -> Self {
        Self {
            transport,
            sleeper,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Perform `request`, returning the body of the first successful attempt.
    pub async fn execute(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let mut attempt = 0;
        loop {
            let failure = match self.transport.send(request).await {
                Ok(response) => match classify_status(response.status) {
                    None => return Ok(response.body),
                    Some(kind) => AttemptFailure::Status(kind, response.status),
                },
                Err(error) => AttemptFailure::Transport(error),
            };

            match backoff(failure.kind(), attempt, self.max_attempts) {
                RetryDecision::Retry(wait) => {
                    warn!(
                        path = %request.path,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        wait_secs = wait.as_secs(),
                        failure = %failure,
                        "request failed; retrying"
                    );
                    self.sleeper.sleep(wait).await;
                    attempt += 1;
                }
                RetryDecision::GiveUp => return Err(failure.into_error(request, attempt + 1)),
            }
        }
    }
}

enum AttemptFailure {
    Status(FailureKind, StatusCode),
    Transport(TransportError),
}

impl AttemptFailure {
    fn kind(&self) -> FailureKind {
        match self {
            Self::Status(kind, _) => *kind,
            Self::Transport(_) => FailureKind::Transient,
        }
    }

    fn into_error(self, request: &FetchRequest, attempts: u32) -> FetchError {
        let path = request.path.clone();
        match self {
            Self::Status(FailureKind::Permanent, status) => {
                debug!(%path, %status, "permanent failure; not retrying");
                FetchError::Permanent { status, path }
            }
            Self::Status(FailureKind::RateLimited, _) => FetchError::RateLimitExhausted { path, attempts },
            other => FetchError::TransientExhausted {
                path,
                attempts,
                last_error: other.to_string(),
            },
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(_, status) => write!(f, "HTTP {status}"),
            Self::Transport(error) => write!(f, "{error}"),
        }
    }
}
