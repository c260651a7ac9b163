//! Session backed by the API's own login and token endpoints

use super::types::{ActionTokens, Credentials, SessionState, TOKEN_KINDS};
use crate::auth::Signer;
use crate::decode::{JsonDecoder, ResponseDecoder, ResponseEnvelope};
use crate::error::{Error, Result};
use crate::http::{Transport, TransportRequest};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct SessionData {
    tokens: ActionTokens,
    username: Option<String>,
    logged_in: bool,
}

/// Login session talking to the API endpoint directly
///
/// Calls made here are single-shot: a failure surfaces immediately and the
/// executor's retry loop decides what to do with it.
pub struct WikiSession {
    api_url: String,
    transport: Arc<dyn Transport>,
    decoder: Arc<dyn ResponseDecoder>,
    signer: Option<Arc<dyn Signer>>,
    credentials: Option<Credentials>,
    data: Arc<RwLock<SessionData>>,
}

impl WikiSession {
    /// Create an anonymous session
    pub fn new(api_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            api_url: api_url.into(),
            transport,
            decoder: Arc::new(JsonDecoder),
            signer: None,
            credentials: None,
            data: Arc::new(RwLock::new(SessionData::default())),
        }
    }

    /// Use password credentials for login
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sign every session call
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

    /// Whether login is possible at all
    pub fn can_login(&self) -> bool {
        self.credentials.is_some() || self.signer.is_some()
    }

    /// Log in and mark the session as authenticated
    ///
    /// Password credentials use the two-step login-token flow. Signed
    /// sessions have no login step, so identity is confirmed via userinfo.
    pub async fn login(&self) -> Result<()> {
        if let Some(credentials) = &self.credentials {
            return self.password_login(credentials).await;
        }
        if self.signer.is_some() {
            return self.confirm_signed_identity().await;
        }
        Err(Error::auth("no credentials or request signing configured"))
    }

    async fn password_login(&self, credentials: &Credentials) -> Result<()> {
        let response = self
            .call(
                Method::GET,
                &[("action", "query"), ("meta", "tokens"), ("type", "login")],
            )
            .await?;
        let login_token = response
            .get("query")
            .and_then(|q| q.get("tokens"))
            .and_then(|t| t.get("logintoken"))
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::auth("failed to get login token"))?
            .to_string();

        let response = self
            .call(
                Method::POST,
                &[
                    ("action", "login"),
                    ("lgname", credentials.username.as_str()),
                    ("lgpassword", credentials.password.as_str()),
                    ("lgtoken", login_token.as_str()),
                ],
            )
            .await?;

        let login = response
            .get("login")
            .ok_or_else(|| Error::auth("missing login payload in response"))?;
        let result = login.get("result").and_then(JsonValue::as_str);
        if result != Some("Success") {
            let reason = login
                .get("reason")
                .and_then(JsonValue::as_str)
                .or(result)
                .unwrap_or("unknown error");
            return Err(Error::auth(format!("login failed: {reason}")));
        }

        let username = login
            .get("lgusername")
            .and_then(JsonValue::as_str)
            .unwrap_or(credentials.username.as_str())
            .to_string();

        info!(user = %username, "logged in");
        let mut data = self.data.write().await;
        data.username = Some(username);
        data.logged_in = true;
        data.tokens.clear();
        Ok(())
    }

    async fn confirm_signed_identity(&self) -> Result<()> {
        let response = self
            .call(Method::GET, &[("action", "query"), ("meta", "userinfo")])
            .await?;
        let userinfo = response
            .get("query")
            .and_then(|q| q.get("userinfo"))
            .ok_or_else(|| Error::auth("missing userinfo in response"))?;
        if userinfo.get("anon").is_some() {
            return Err(Error::auth("signed requests were treated as anonymous"));
        }
        let username = userinfo
            .get("name")
            .and_then(JsonValue::as_str)
            .map(String::from);

        info!(user = ?username, "signed session confirmed");
        let mut data = self.data.write().await;
        data.username = username;
        data.logged_in = true;
        data.tokens.clear();
        Ok(())
    }

    /// One signed, decoded call; remote errors are surfaced
    async fn call(&self, method: Method, params: &[(&str, &str)]) -> Result<ResponseEnvelope> {
        let mut wire: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        wire.push(("format".to_string(), self.decoder.format().to_string()));

        let mut request = TransportRequest::new(method, &self.api_url);
        if let Some(signer) = &self.signer {
            request = request.header("Authorization", signer.sign(method, &self.api_url, &wire)?);
        }
        let response = self.transport.send(request.with_params(wire)).await?;
        if !response.is_success() {
            return Err(Error::http_status(response.status, response.text_lossy()));
        }

        let envelope = self.decoder.decode(&response.body)?;
        if let Some(error) = envelope.error() {
            return Err(Error::remote(error.code, error.info));
        }
        Ok(envelope)
    }
}

#[async_trait]
impl SessionState for WikiSession {
    async fn token(&self, kind: &str) -> Result<Option<String>> {
        {
            let data = self.data.read().await;
            if let Some(token) = data.tokens.get(kind) {
                return Ok(Some(token.to_string()));
            }
        }

        self.refresh_tokens().await?;
        let data = self.data.read().await;
        Ok(data.tokens.get(kind).map(String::from))
    }

    async fn refresh_tokens(&self) -> Result<()> {
        let response = self
            .call(
                Method::GET,
                &[("action", "query"), ("meta", "tokens"), ("type", TOKEN_KINDS)],
            )
            .await?;
        let tokens = ActionTokens::from_response(&response.into_value());
        debug!("refreshed action tokens");

        let mut data = self.data.write().await;
        data.tokens = tokens;
        Ok(())
    }

    async fn reauthenticate(&self) -> Result<()> {
        {
            let mut data = self.data.write().await;
            data.logged_in = false;
        }
        self.login().await?;
        self.refresh_tokens().await
    }

    async fn is_logged_in(&self) -> bool {
        self.data.read().await.logged_in
    }

    async fn username(&self) -> Option<String> {
        self.data.read().await.username.clone()
    }
}

impl std::fmt::Debug for WikiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiSession")
            .field("api_url", &self.api_url)
            .field("credentials", &self.credentials)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}
