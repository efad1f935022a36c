//! `FetchClient`: blocking HTTP GET with retry, backoff and error
//! classification into the fetch exit codes.

use std::io::Read;
use std::thread;
use std::time::Duration;

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

pub(super) const MAX_RETRIES: u32 = 3;
const TIMEOUT_SECS: u64 = 30;
const MAX_BODY_BYTES: u64 = 50 * 1024 * 1024; // 50 MB
/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 60;
/// Browser-like agent; some hosts answer 403 to unknown clients.
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 mdmerge/",
    env!("CARGO_PKG_VERSION")
);

// ── Fetched ─────────────────────────────────────────────────────────

/// A downloaded body plus what the server said it was.
#[derive(Debug)]
pub struct Fetched {
    pub url: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

// ── FetchClient ─────────────────────────────────────────────────────

pub struct FetchClient {
    http: reqwest::blocking::Client,
    backoff: Duration,
    max_body: u64,
}

impl FetchClient {
    pub fn new() -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self {
            http,
            backoff: Duration::from_secs(1),
            max_body: MAX_BODY_BYTES,
        })
    }

    /// First retry delay; doubles on every attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Largest response body accepted, in bytes.
    pub fn with_max_body(mut self, max_body: u64) -> Self {
        self.max_body = max_body;
        self
    }

    /// GET `url` with retry + exponential backoff.
    ///
    /// Network errors, 429 and 5xx are retried; other 4xx fail immediately.
    pub fn get(&self, url: &str) -> Result<Fetched, CliError> {
        let mut backoff = self.backoff;

        for attempt in 0..=MAX_RETRIES {
            match self.http.get(url).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Other 4xx (not 429): fail immediately
                    if (400..500).contains(&status) && status != 429 {
                        let hint = (status == 401 || status == 403 || status == 404).then(|| {
                            "check that the link is shared publicly, or download the file and pass the local path"
                                .to_string()
                        });
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!("GET {url} failed: HTTP {status}"),
                            hint,
                        });
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            let (code, what) = if status == 429 {
                                (exit_codes::EXIT_FETCH_RATE_LIMIT, "rate limited")
                            } else {
                                (exit_codes::EXIT_FETCH_UPSTREAM, "upstream error")
                            };
                            return Err(CliError {
                                code,
                                message: format!(
                                    "GET {url}: {what} after {} attempts (HTTP {status})",
                                    MAX_RETRIES + 1,
                                ),
                                hint: None,
                            });
                        }

                        // Respect Retry-After header for 429
                        let wait = if status == 429 {
                            resp.headers()
                                .get(reqwest::header::RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.trim().parse::<u64>().ok())
                                .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
                                .unwrap_or(backoff)
                        } else {
                            backoff
                        };

                        tracing::warn!(
                            "retry {}/{} in {:?} (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status
                        );
                        thread::sleep(wait);
                        backoff *= 2;
                        continue;
                    }

                    return self.read_body(url, resp);
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "GET {url}: network error after {} attempts: {e}",
                                MAX_RETRIES + 1
                            ),
                            hint: None,
                        });
                    }

                    tracing::warn!(
                        "retry {}/{} in {:?} ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff,
                        e
                    );
                    thread::sleep(backoff);
                    backoff *= 2;
                }
            }
        }

        Err(CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("GET {url}: retries exhausted"),
            hint: None,
        })
    }

    fn read_body(&self, url: &str, resp: reqwest::blocking::Response) -> Result<Fetched, CliError> {
        let too_large = || CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!(
                "GET {url}: response exceeds {} MB",
                self.max_body / (1024 * 1024)
            ),
            hint: Some("download the file and pass the local path".to_string()),
        };

        if resp.content_length().is_some_and(|len| len > self.max_body) {
            return Err(too_large());
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        resp.take(self.max_body + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: format!("failed to read response body from {url}: {e}"),
                hint: None,
            })?;
        if bytes.len() as u64 > self.max_body {
            return Err(too_large());
        }

        tracing::debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(Fetched {
            url: url.to_string(),
            bytes,
            content_type,
        })
    }
}

// ── Tests ───────────────────────────────────────────────────────────
