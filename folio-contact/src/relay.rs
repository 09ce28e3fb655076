//! Delivery of contact submissions to a third-party form relay.

use async_trait::async_trait;
use folio_http::{HttpClient, HttpError, RequestOpts};
use serde::Deserialize;
use std::time::Duration;

use crate::ContactFields;

/// What the relay said about a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl RelayResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// The request never produced a usable answer (network error, or a body
    /// that is not a relay verdict).
    #[error("relay transport failed: {0}")]
    Transport(#[from] HttpError),

    #[error("relay access key is missing")]
    MissingAccessKey,
}

/// Something that can carry a filled-in contact form somewhere.
#[async_trait]
pub trait FormRelay: Send + Sync {
    /// Deliver one submission. Exactly one outbound request per call.
    async fn deliver(&self, fields: &ContactFields) -> Result<RelayResponse, RelayError>;
}

/// Web3Forms-style relay: form-encoded POST with a static `access_key` field,
/// answered by `{"success": bool, "message": "..."}`.
#[derive(Clone)]
pub struct Web3FormsRelay {
    http: HttpClient,
    endpoint: String,
    access_key: String,
}

impl std::fmt::Debug for Web3FormsRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3FormsRelay")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

impl Web3FormsRelay {
    /// Relay without a per-request timeout.
    pub fn new(endpoint: &str, access_key: impl Into<String>) -> Result<Self, RelayError> {
        let access_key = access_key.into().trim().to_string();
        if access_key.is_empty() {
            return Err(RelayError::MissingAccessKey);
        }
        let http = HttpClient::new(endpoint)?.without_timeout();
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            access_key,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = match timeout {
            Some(t) => self.http.with_timeout(t),
            None => self.http.without_timeout(),
        };
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FormRelay for Web3FormsRelay {
    async fn deliver(&self, fields: &ContactFields) -> Result<RelayResponse, RelayError> {
        let [name, email, subject, message] = fields.pairs();
        let body = [
            name,
            email,
            subject,
            message,
            ("access_key", self.access_key.as_str()),
        ];

        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        let err = match self
            .http
            .post_form::<RelayResponse>(&self.endpoint, &body, opts)
            .await
        {
            Ok(resp) => return Ok(resp),
            Err(e) => e,
        };

        // A non-2xx answer still counts as a verdict when it has the relay's
        // shape, and it is never an acceptance.
        if let HttpError::Api { status, body, .. } = &err {
            if let Ok(verdict) = serde_json::from_str::<RelayResponse>(body) {
                tracing::debug!(%status, message = ?verdict.message, "contact.relay.rejected");
                return Ok(RelayResponse {
                    success: false,
                    message: verdict.message,
                });
            }
        }
        Err(RelayError::Transport(err))
    }
}
