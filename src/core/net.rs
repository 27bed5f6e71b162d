// src/core/net.rs
//
// BGG XML API2 client. BGG answers 202 while it builds a response and 429
// when throttling, so every call goes through a RetryPolicy.

use std::time::Duration;

use reqwest::{Client, StatusCode, header};

use crate::config::consts::{API_BASE, REQUEST_TIMEOUT, THING_MAX_RETRIES, THING_RETRY_WAIT, USER_AGENT};
use crate::error::{Error, Result};

/// What a single attempt came back with, as far as retrying is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Queued,
    RateLimited,
    Status(u16),
    Network,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, first one included.
    pub attempts: u32,
    /// Pause before the first attempt.
    pub first_delay: Option<Duration>,
    pub queued_wait: Duration,
    pub limited_wait: Duration,
    /// Longer 429 wait once more than `.0` consecutive 429s were seen.
    pub limited_escalation: Option<(u32, Duration)>,
    pub error_wait: Duration,
    /// Multiplier applied per wait already taken (2 = exponential, 1 = fixed).
    pub factor: u32,
    /// Retry non-200/401 statuses instead of failing at once.
    pub retry_status: bool,
}

impl RetryPolicy {
    /// Single attempt; the hot list is cheap to ask for again.
    pub fn once() -> Self {
        Self {
            attempts: 1,
            first_delay: None,
            queued_wait: Duration::ZERO,
            limited_wait: Duration::ZERO,
            limited_escalation: None,
            error_wait: Duration::ZERO,
            factor: 1,
            retry_status: false,
        }
    }

    /// `thing` batches: doubling waits, statuses retried.
    pub fn thing() -> Self {
        Self {
            attempts: THING_MAX_RETRIES + 1,
            first_delay: None,
            queued_wait: THING_RETRY_WAIT,
            limited_wait: THING_RETRY_WAIT,
            limited_escalation: None,
            error_wait: THING_RETRY_WAIT,
            factor: 2,
            retry_status: true,
        }
    }

    /// Collections get queued server-side; poll every 3 s after a 2 s lead-in.
    pub fn collection() -> Self {
        Self {
            attempts: 10,
            first_delay: Some(Duration::from_secs(2)),
            queued_wait: Duration::from_secs(3),
            limited_wait: Duration::from_secs(3),
            limited_escalation: None,
            error_wait: Duration::from_secs(3),
            factor: 1,
            retry_status: false,
        }
    }

    pub fn guild() -> Self {
        Self {
            attempts: 5,
            first_delay: None,
            queued_wait: Duration::from_secs(5),
            limited_wait: Duration::from_secs(10),
            limited_escalation: None,
            error_wait: Duration::from_secs(5),
            factor: 1,
            retry_status: true,
        }
    }

    pub fn user_ratings() -> Self {
        Self {
            attempts: 5,
            first_delay: None,
            queued_wait: Duration::from_secs(5),
            limited_wait: Duration::from_secs(20),
            limited_escalation: Some((3, Duration::from_secs(30))),
            error_wait: Duration::from_secs(3),
            factor: 1,
            retry_status: false,
        }
    }

    /// Wait before the next attempt. `waited` is the number of waits taken so
    /// far, `consecutive_429` the rate-limit streak including this one.
    pub fn wait_for(&self, outcome: Outcome, waited: u32, consecutive_429: u32) -> Duration {
        let base = match outcome {
            Outcome::Queued => self.queued_wait,
            Outcome::RateLimited => match self.limited_escalation {
                Some((over, long)) if consecutive_429 > over => long,
                _ => self.limited_wait,
            },
            Outcome::Status(_) | Outcome::Network => self.error_wait,
        };
        base.saturating_mul(self.factor.saturating_pow(waited))
    }

    pub fn is_retryable(&self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Status(401) => false,
            Outcome::Status(_) => self.retry_status,
            _ => true,
        }
    }
}

/// Lets a caller track 429s across calls (the ratings job slows down on them).
pub trait RateLimitHook {
    /// Returns the consecutive 429 count, this one included.
    fn on_rate_limited(&mut self) -> u32;
    fn on_success(&mut self);
}

/// Per-call streak counter used when nobody else is watching.
#[derive(Default)]
pub struct Streak(u32);

impl RateLimitHook for Streak {
    fn on_rate_limited(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
    fn on_success(&mut self) {
        self.0 = 0;
    }
}

#[derive(Clone)]
pub struct BggClient {
    http: Client,
    base: String,
    token: Option<String>,
}

impl BggClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base(API_BASE, token)
    }

    pub fn with_base(base: &str, token: Option<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/xml"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .build()?;

        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self { http, base, token })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn require_token(&self) -> Result<()> {
        if self.has_token() { Ok(()) } else { Err(Error::MissingToken) }
    }

    pub async fn get_xml(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        policy: &RetryPolicy,
    ) -> Result<String> {
        self.get_xml_with(endpoint, query, policy, &mut Streak::default()).await
    }

    pub async fn get_xml_with(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        policy: &RetryPolicy,
        hook: &mut (dyn RateLimitHook + Send),
    ) -> Result<String> {
        let url = format!("{}{}", self.base, endpoint);

        if let Some(d) = policy.first_delay {
            tokio::time::sleep(d).await;
        }

        let mut waited = 0u32;
        let mut last = Outcome::Network;
        let mut last_err: Option<Error> = None;

        for attempt in 1..=policy.attempts.max(1) {
            let mut req = self.http.get(&url).query(query);
            if let Some(t) = &self.token {
                req = req.bearer_auth(t);
            }
            logd!("GET {url} {:?} (attempt {attempt})", query);

            let mut streak = 0;
            let outcome = match req.send().await {
                Ok(resp) => match resp.status() {
                    StatusCode::OK => {
                        hook.on_success();
                        return Ok(resp.text().await?);
                    }
                    StatusCode::ACCEPTED => Outcome::Queued,
                    StatusCode::TOO_MANY_REQUESTS => {
                        streak = hook.on_rate_limited();
                        Outcome::RateLimited
                    }
                    StatusCode::UNAUTHORIZED => return Err(Error::Unauthorized),
                    status => {
                        let body = resp.text().await.unwrap_or_default();
                        let snippet: String = body.chars().take(100).collect();
                        let err = Error::Http { status: status.as_u16(), snippet };
                        if !policy.retry_status {
                            return Err(err);
                        }
                        last_err = Some(err);
                        Outcome::Status(status.as_u16())
                    }
                },
                Err(e) => {
                    let outcome = Outcome::Network;
                    last_err = Some(if e.is_timeout() { Error::Timeout } else { Error::Request(e) });
                    outcome
                }
            };
            last = outcome;

            if attempt < policy.attempts && policy.is_retryable(outcome) {
                let wait = policy.wait_for(outcome, waited, streak);
                logw!("{endpoint}: {outcome:?}, retrying in {}s", wait.as_secs_f32());
                tokio::time::sleep(wait).await;
                waited += 1;
            }
        }

        Err(match (last, last_err) {
            (Outcome::Queued, _) => Error::StillQueued,
            (Outcome::Network, Some(e)) => e,
            _ => Error::RetriesExhausted(endpoint.to_string()),
        })
    }
}
