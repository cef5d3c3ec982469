//! Fixed-window request limiter keyed by client address.
//!
//! Every client gets a [`RateRecord`] holding a request count and the instant
//! its window opened. The window resets once `window` has passed since it
//! opened; inside the window the request that pushes the count past
//! `max_requests` is rejected with `429 Too Many Requests`.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

pub const REJECTION_MESSAGE: &str = "Too many requests, please try again later.";

// key used when the connection's peer address is not available
const UNKNOWN_CLIENT: &str = "unknown";

const RATELIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");
const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

// Rate limit entry - tracks requests per IP/key
#[derive(Debug, Clone, Copy)]
pub struct RateRecord {
    pub count: u32,
    pub window_start: Instant,
}

impl RateRecord {
    fn expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.window_start) >= window
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    // emit RateLimit-* headers on every response that passes the limiter
    pub standard_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            standard_headers: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Reject,
}

/// Outcome of one [`RateLimiter::check`] call, with the quota metadata that
/// ends up in the `RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub verdict: Verdict,
    pub limit: u32,
    pub remaining: u32,
    // time left until the client's window resets
    pub reset: Duration,
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        self.verdict == Verdict::Allow
    }

    pub fn reset_secs(&self) -> u64 {
        ceil_secs(self.reset)
    }
}

pub struct RateLimiter {
    entries: DashMap<String, RateRecord>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Counts one request from `key` made at `now` and decides whether it may
    /// go through. Never fails: an unknown key simply opens a new window.
    pub fn check(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.config.window;

        // the entry guard holds the shard lock, so the read-modify-write
        // below is atomic per key
        let record = match self.entries.entry(key.to_string()) {
            Entry::Vacant(slot) => *slot.insert(RateRecord {
                count: 1,
                window_start: now,
            }),
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                if record.expired(now, window) {
                    record.count = 1;
                    record.window_start = now;
                } else {
                    record.count = record.count.saturating_add(1);
                }
                *record
            }
        };

        self.decide(&record, now)
    }

    fn decide(&self, record: &RateRecord, now: Instant) -> RateLimitDecision {
        let max = self.config.max_requests;
        // the first request of a window always goes through
        let verdict = if record.count == 1 || record.count <= max {
            Verdict::Allow
        } else {
            Verdict::Reject
        };

        RateLimitDecision {
            verdict,
            limit: max,
            remaining: max.saturating_sub(record.count),
            reset: (record.window_start + self.config.window).saturating_duration_since(now),
        }
    }

    /// Drops every record whose window has already expired and returns how
    /// many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let window = self.config.window;
        let before = self.entries.len();
        self.entries.retain(|_, record| !record.expired(now, window));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // RateLimit-* headers (draft-6 layout), no legacy X-RateLimit-* ones
    fn write_headers(&self, headers: &mut HeaderMap, decision: &RateLimitDecision) {
        let policy = format!("{};w={}", decision.limit, ceil_secs(self.config.window));
        if let Ok(value) = HeaderValue::from_str(&policy) {
            headers.insert(RATELIMIT_POLICY, value);
        }
        headers.insert(RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
        headers.insert(RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
        headers.insert(RATELIMIT_RESET, HeaderValue::from(decision.reset_secs()));
    }

    fn rejection(&self, decision: &RateLimitDecision) -> Response {
        let mut response = (StatusCode::TOO_MANY_REQUESTS, REJECTION_MESSAGE).into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        if self.config.standard_headers {
            self.write_headers(headers, decision);
        }
        response
    }
}

// whole seconds, rounded up so clients never retry early
fn ceil_secs(d: Duration) -> u64 {
    if d.subsec_nanos() > 0 {
        d.as_secs() + 1
    } else {
        d.as_secs()
    }
}

// Client identifier is the peer IP of the connection
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = limiter.check(&key, Instant::now());

    if !decision.is_allowed() {
        warn!(
            client = %key,
            limit = decision.limit,
            reset_secs = decision.reset_secs(),
            "rate limit exceeded"
        );
        return limiter.rejection(&decision);
    }

    let mut response = next.run(request).await;
    if limiter.config.standard_headers {
        limiter.write_headers(response.headers_mut(), &decision);
    }
    response
}
