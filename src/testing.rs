//! In-memory doubles shared by unit tests

use crate::error::{Error, Result};
use crate::http::{Transport, TransportRequest, TransportResponse};
use crate::session::SessionState;
use crate::types::JsonValue;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// One scripted reply
pub(crate) type Responder = Box<dyn FnOnce(&TransportRequest) -> Result<TransportResponse> + Send>;

/// Transport that replays a fixed script and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Responder>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a responder
    pub(crate) fn push(&self, responder: Responder) -> &Self {
        self.script.lock().unwrap().push_back(responder);
        self
    }

    /// Queue a 200 reply that echoes the sent `requestid` into `body`
    pub(crate) fn echo(&self, body: JsonValue) -> &Self {
        self.push(echo(body))
    }

    /// Queue a raw reply
    pub(crate) fn raw(&self, status: u16, body: &'static str) -> &Self {
        self.push(Box::new(move |_| Ok(TransportResponse::new(status, body))))
    }

    /// Queue a transport failure
    pub(crate) fn fail(&self, error: Error) -> &Self {
        self.push(Box::new(move |_| Err(error)))
    }

    /// Every request seen so far
    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests seen so far
    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Number of unconsumed responders
    pub(crate) fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(responder) => responder(&request),
            None => Err(Error::Other("script exhausted".to_string())),
        }
    }
}

/// Responder returning `body` with the request's correlation id and a node name
pub(crate) fn echo(body: JsonValue) -> Responder {
    Box::new(move |request| {
        let mut body = body;
        if let Some(map) = body.as_object_mut() {
            if let Some(id) = request.param("requestid") {
                map.insert("requestid".to_string(), JsonValue::String(id.to_string()));
            }
            map.entry("servedby").or_insert_with(|| "mw-test".into());
        }
        Ok(TransportResponse::new(
            200,
            serde_json::to_vec(&body).unwrap(),
        ))
    })
}

/// Session double with deterministic tokens
///
/// Tokens look like `<kind>-<generation>`; every refresh or re-login bumps
/// the generation.
pub(crate) struct FakeSession {
    username: Option<String>,
    generation: AtomicU32,
    refreshes: AtomicU32,
    logins: AtomicU32,
}

impl FakeSession {
    pub(crate) fn new(username: Option<&str>) -> Self {
        Self {
            username: username.map(str::to_string),
            generation: AtomicU32::new(1),
            refreshes: AtomicU32::new(0),
            logins: AtomicU32::new(0),
        }
    }

    pub(crate) fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub(crate) fn logins(&self) -> u32 {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionState for FakeSession {
    async fn token(&self, kind: &str) -> Result<Option<String>> {
        Ok(Some(format!(
            "{kind}-{}",
            self.generation.load(Ordering::SeqCst)
        )))
    }

    async fn refresh_tokens(&self) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn reauthenticate(&self) -> Result<()> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    async fn username(&self) -> Option<String> {
        self.username.clone()
    }
}
