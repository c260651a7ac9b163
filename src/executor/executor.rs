//! Request executor implementation

use super::types::{ExecuteOptions, ExecutorConfig, MutationIntent};
use crate::auth::Signer;
use crate::decode::{JsonDecoder, ResponseDecoder, ResponseEnvelope};
use crate::error::{Error, Result};
use crate::http::{Transport, TransportRequest};
use crate::params::RequestSpec;
use crate::session::SessionState;
use crate::types::{AssertMode, JsonValue, Method};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const BAD_TOKEN: &str = "badtoken";
const ASSERT_USER_FAILED: &str = "assertuserfailed";
const ASSERT_BOT_FAILED: &str = "assertbotfailed";
const SERVICE_UNAVAILABLE: u16 = 503;

/// Token kind assumed for a caller-supplied `token` parameter
const DEFAULT_TOKEN_KIND: &str = "csrf";

/// Number of full runs allowed when the correlation echo does not match
const CORRELATION_ROUNDS: u32 = 2;

/// Executes logical API requests with retry, recovery and correlation checks
pub struct RequestExecutor {
    api_url: String,
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn ResponseDecoder>,
    session: Option<Arc<dyn SessionState>>,
    signer: Option<Arc<dyn Signer>>,
    config: ExecutorConfig,
}

impl RequestExecutor {
    /// Create an executor for an API endpoint
    pub fn new(api_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_url: api_url.into(),
            transport,
            decoder: Arc::new(JsonDecoder),
            session: None,
            signer: None,
            config: ExecutorConfig::default(),
        }
    }

    /// Attach the session used for tokens and re-login
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionState>) -> Self {
        self.session = Some(session);
        self
    }

    /// Sign every request
    #[must_use]
    pub fn with_signer(mut self, signer: Option<Arc<dyn Signer>>) -> Self {
        self.signer = signer;
        self
    }

    /// Use a different response decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn ResponseDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Set executor configuration
    #[must_use]
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the attached session
    pub fn session(&self) -> Option<&Arc<dyn SessionState>> {
        self.session.as_ref()
    }

    /// Endpoint URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Shortcut for a read-only GET
    pub async fn get(&self, spec: RequestSpec) -> Result<ResponseEnvelope> {
        self.execute(spec, &ExecuteOptions::get()).await
    }

    /// Execute one logical request
    ///
    /// A response whose correlation echo does not match is discarded and
    /// the whole request is run once more; a second mismatch is fatal.
    pub async fn execute(
        &self,
        spec: RequestSpec,
        options: &ExecuteOptions,
    ) -> Result<ResponseEnvelope> {
        let mut mismatch = (String::new(), String::new());

        for round in 1..=CORRELATION_ROUNDS {
            let request_id = new_request_id();
            let envelope = self.run_attempts(spec.clone(), options, &request_id).await?;

            match envelope.request_id() {
                Some(echoed) if echoed == request_id => return finish(envelope, options),
                echoed => {
                    let received = echoed.unwrap_or_default();
                    warn!(
                        round,
                        sent = %request_id,
                        received = %received,
                        "request id mismatch"
                    );
                    mismatch = (request_id, received);
                }
            }
        }

        let (sent, received) = mismatch;
        Err(Error::CorrelationMismatch { sent, received })
    }

    /// The attempt loop of one run
    ///
    /// Token loads and re-logins happen at the top of an attempt, so a
    /// transient failure there costs one attempt like any other.
    async fn run_attempts(
        &self,
        mut spec: RequestSpec,
        options: &ExecuteOptions,
        request_id: &str,
    ) -> Result<ResponseEnvelope> {
        spec.set("requestid", request_id);
        spec.set("format", self.decoder.format());
        if let Some(assert) = options.assert.param_value() {
            spec.set("assert", assert);
        }

        // A caller-supplied token with no kind is refreshed as a csrf token.
        let token_kind = options
            .token_kind
            .clone()
            .or_else(|| spec.contains("token").then(|| DEFAULT_TOKEN_KIND.to_string()));
        let mut token_state = if options.token_kind.is_some() && !spec.contains("token") {
            TokenState::Missing
        } else {
            TokenState::Current
        };
        let mut relogin: Option<AssertMode> = None;
        let mut login_recovered = false;
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.config.backoff(attempt - 2);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            if let Some(kind) = relogin {
                let session = self
                    .session
                    .as_ref()
                    .ok_or(Error::AssertionFailed { kind })?;
                match session.reauthenticate().await {
                    Ok(()) => {
                        info!(attempt, assert = %kind, "logged in again");
                        relogin = None;
                        if token_kind.is_some() {
                            token_state = TokenState::Missing;
                        }
                    }
                    Err(e) if e.is_transient() => {
                        warn!(attempt, max_attempts, error = %e, "re-login failed, retrying");
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            if token_state != TokenState::Current {
                if let Some(kind) = &token_kind {
                    let stale = token_state == TokenState::Stale;
                    match self.session_token(kind, stale).await {
                        Ok(Some(token)) => spec.set("token", token),
                        Ok(None) if stale => return Err(Error::StaleActionToken),
                        Ok(None) => {}
                        Err(e) if e.is_transient() => {
                            warn!(
                                attempt,
                                max_attempts,
                                error = %e,
                                "token fetch failed, retrying"
                            );
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
                token_state = TokenState::Current;
            }

            let wire = spec.to_wire_pairs();
            let mut request = TransportRequest::new(options.method, &self.api_url);
            if let Some(signer) = &self.signer {
                request = request.header(
                    "Authorization",
                    signer.sign(options.method, &self.api_url, &wire)?,
                );
            }

            debug!(attempt, max_attempts, method = %options.method, "sending request");
            let response = match self.transport.send(request.with_params(wire)).await {
                Ok(response) => response,
                Err(e) if e.is_transient() => {
                    warn!(attempt, max_attempts, error = %e, "transport failure, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if response.status == SERVICE_UNAVAILABLE && options.method == Method::POST {
                if let Some(intent) = &options.mutation {
                    if self.mutation_landed(intent).await {
                        info!(title = %intent.title, "503 on mutation, but it already landed");
                        return Ok(synthesized_success(&spec, request_id));
                    }
                }
                warn!(attempt, max_attempts, "HTTP 503, retrying");
                continue;
            }

            let envelope = match self.decoder.decode(&response.body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(attempt, status = response.status, error = %e, "unserialization failed");
                    continue;
                }
            };

            if let Some(error) = envelope.error() {
                match error.code.as_str() {
                    BAD_TOKEN => {
                        if self.session.is_none() || token_kind.is_none() {
                            return Err(Error::StaleActionToken);
                        }
                        warn!(attempt, "stale action token, refreshing");
                        token_state = TokenState::Stale;
                        continue;
                    }
                    ASSERT_BOT_FAILED if options.assert.is_required() => {
                        if !self.config.bot_assert_fallback
                            || login_recovered
                            || self.session.is_none()
                        {
                            return Err(Error::AssertionFailed {
                                kind: AssertMode::Bot,
                            });
                        }
                        warn!("bot assertion failed, treating as logged out");
                        relogin = Some(AssertMode::Bot);
                        login_recovered = true;
                        continue;
                    }
                    ASSERT_USER_FAILED if options.assert.is_required() => {
                        if login_recovered || self.session.is_none() {
                            return Err(Error::AssertionFailed {
                                kind: AssertMode::User,
                            });
                        }
                        warn!("user assertion failed, logging in again");
                        relogin = Some(AssertMode::User);
                        login_recovered = true;
                        continue;
                    }
                    _ => {}
                }
            }

            if !envelope.is_responsive() {
                warn!(attempt, max_attempts, "server unresponsive, retrying");
                continue;
            }

            return Ok(envelope);
        }

        Err(Error::TransportUnresponsive {
            attempts: max_attempts,
        })
    }

    /// Current token of `kind`, refreshing the session's cache first when `refresh` is set
    async fn session_token(&self, kind: &str, refresh: bool) -> Result<Option<String>> {
        let Some(session) = &self.session else {
            return Ok(None);
        };
        if refresh {
            session.refresh_tokens().await?;
        }
        session.token(kind).await
    }

    /// Side read: does the latest revision of the target already carry our change?
    async fn mutation_landed(&self, intent: &MutationIntent) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let Some(username) = session.username().await else {
            return false;
        };

        let wire = RequestSpec::new()
            .with("action", "query")
            .with("prop", "revisions")
            .with("titles", intent.title.as_str())
            .with("rvprop", "user|comment|timestamp")
            .with("rvlimit", "1")
            .with("format", self.decoder.format())
            .to_wire_pairs();

        let mut request = TransportRequest::new(Method::GET, &self.api_url);
        if let Some(signer) = &self.signer {
            match signer.sign(Method::GET, &self.api_url, &wire) {
                Ok(header) => request = request.header("Authorization", header),
                Err(e) => {
                    warn!(error = %e, "could not sign history read");
                    return false;
                }
            }
        }

        let envelope = match self.transport.send(request.with_params(wire)).await {
            Ok(response) => match self.decoder.decode(&response.body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(error = %e, "history read undecodable");
                    return false;
                }
            },
            Err(e) => {
                warn!(error = %e, "history read failed");
                return false;
            }
        };

        latest_revision(&envelope).is_some_and(|revision| {
            revision_matches(
                revision,
                &username,
                &intent.summary,
                Utc::now(),
                self.config.mutation_window,
            )
        })
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("api_url", &self.api_url)
            .field("config", &self.config)
            .field("has_session", &self.session.is_some())
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

/// Whether the spec's `token` needs loading before the next send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenState {
    Current,
    Missing,
    Stale,
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn finish(envelope: ResponseEnvelope, options: &ExecuteOptions) -> Result<ResponseEnvelope> {
    if options.check_errors {
        if let Some(error) = envelope.error() {
            return Err(Error::remote(error.code, error.info));
        }
    }
    Ok(envelope)
}

/// Success envelope standing in for a mutation that landed despite a 503
fn synthesized_success(spec: &RequestSpec, request_id: &str) -> ResponseEnvelope {
    let action = spec.get_str("action").unwrap_or("edit").to_string();
    let mut envelope = ResponseEnvelope::default();
    envelope.insert(action, json!({"result": "Success", "assumed": true}));
    envelope.insert("requestid", JsonValue::String(request_id.to_string()));
    envelope
}

/// First revision of the first page in a `prop=revisions` response
fn latest_revision(envelope: &ResponseEnvelope) -> Option<&JsonValue> {
    let pages = envelope.get("query")?.get("pages")?;
    let page = match pages {
        JsonValue::Object(map) => map.values().next()?,
        JsonValue::Array(list) => list.first()?,
        _ => return None,
    };
    page.get("revisions")?.as_array()?.first()
}

/// Same user, same summary, timestamp within `window` of `now`
pub(crate) fn revision_matches(
    revision: &JsonValue,
    username: &str,
    summary: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let user = revision.get("user").and_then(JsonValue::as_str);
    let comment = revision.get("comment").and_then(JsonValue::as_str);
    if user != Some(username) || comment != Some(summary) {
        return false;
    }

    let Some(timestamp) = revision
        .get("timestamp")
        .and_then(JsonValue::as_str)
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
    else {
        return false;
    };

    let age = now.signed_duration_since(timestamp.with_timezone(&Utc));
    let window = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
    age.abs() <= window
}
