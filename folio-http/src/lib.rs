//! Minimal HTTP client with safe logging and form posts.
//!
//! - Request options: headers, timeout, absolute URLs
//! - `application/x-www-form-urlencoded` request bodies, JSON answers
//! - Redacts secret form fields (`access_key`, `token`, ...) and never logs them
//! - One request per call; failures are handed back to the caller as-is
//! - Optional *raw* request/response logging via `FOLIO_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), folio_http::HttpError> {
//! let client = folio_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .post_form(
//!         "submit",
//!         &[("name", "Ada"), ("access_key", "secret")],
//!         folio_http::RequestOpts::default(),
//!     )
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: structured `tracing` events are emitted for request start,
//! response headers, body snippets (truncated), final errors, and
//! (optionally) raw request/response lines (target `http.raw`).

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "FOLIO_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)
const SNIPPET_MAX: usize = 500;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "access_key"
            | "access_token"
            | "authorization"
            | "auth"
            | "key"
            | "api_key"
            | "token"
            | "secret"
            | "client_secret"
            | "bearer"
    )
}

/// Render a best-effort curl command for repro/debug. `body` must already be redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&str>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(body) = body {
        let mut s = body.to_string();
        if s.len() > RAW_MAX_BODY {
            truncate_at_boundary(&mut s, RAW_MAX_BODY);
            s.push('…');
        }
        parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") || is_secret_key(&key) {
                val = "<redacted>".into();
            }
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    /// Non-2xx answer. `body` is the full response text so callers can look
    /// for their own error shape in it.
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
        body: String,
    },
}

// ==============================
// Request Options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use folio_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// Encoded form body plus the text we are allowed to log for it.
struct Payload {
    bytes: Vec<u8>,
    loggable: String,
}

impl Payload {
    fn form(fields: &[(&str, &str)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().copied())
            .finish();
        let loggable = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter().map(|(k, v)| {
                if is_secret_key(k) {
                    (*k, "<redacted>")
                } else {
                    (*k, *v)
                }
            }))
            .finish();
        Self {
            bytes: encoded.into_bytes(),
            loggable,
        }
    }
}

// ==============================
// Client
// ==============================

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    /// Per-request timeout; `None` leaves the transport's own behaviour in charge.
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use folio_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(15)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Some(Duration::from_secs(15)),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = Some(dur);
        self
    }

    /// Drop the per-request timeout entirely.
    ///
    /// ```no_run
    /// use folio_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::new("https://api.example.com")?.without_timeout();
    /// assert!(client.default_timeout.is_none());
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn without_timeout(mut self) -> Self {
        self.default_timeout = None;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// POST `application/x-www-form-urlencoded` fields and decode a JSON response.
    ///
    /// Secret-looking field names are redacted from every log line.
    pub async fn post_form<T>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Payload::form(fields), opts)
            .await
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json<T>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
        opts: RequestOpts,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self.resolve(path, opts.allow_absolute)?;
        let timeout = opts.timeout.or(self.default_timeout);
        let req_id = format!("r{}", Uuid::new_v4().simple());

        // ----- Build request -----
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(payload.bytes);

        if let Some(timeout) = timeout {
            rb = rb.timeout(timeout);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        // ----- Safe request logging (pre-send) -----
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.map(|t| t.as_millis() as u64),
            content_type=FORM_CONTENT_TYPE,
            "http.request.start"
        );

        if raw_enabled() {
            let merged = opts.headers.clone().unwrap_or_default();
            let curl = make_curl(&method, &url, &merged, Some(&payload.loggable));
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = err.to_string();
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let mut text = String::from_utf8_lossy(&bytes).into_owned();
            let truncated = text.len() > RAW_MAX_BODY;
            if truncated {
                truncate_at_boundary(&mut text, RAW_MAX_BODY);
            }
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        let snippet = snip_body(&bytes);
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snippet,
            "http.response.body_snippet"
        );

        // ----- Success path -----
        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    req_id=%req_id,
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        let request_id = req_hdr_id.to_string();
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

// ==============================
// Helpers
// ==============================

/// Pull a human message out of `{"message":..}`, `{"detail":..}`, `{"error":..}`
/// or `{"error":{"message":..}}`, falling back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Nested {
        error: NestedDetail,
    }
    #[derive(Deserialize)]
    struct NestedDetail {
        message: String,
    }

    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Nested>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        for candidate in [m.message, m.detail, m.error] {
            if !candidate.is_empty() {
                return candidate;
            }
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > SNIPPET_MAX {
        truncate_at_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
