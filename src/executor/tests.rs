//! Tests for the executor module

use super::executor::revision_matches;
use super::*;
use crate::auth::BearerSigner;
use crate::error::Error;
use crate::params::RequestSpec;
use crate::session::{Credentials, SessionState, WikiSession};
use crate::testing::{FakeSession, ScriptedTransport};
use crate::types::{AssertMode, BackoffType, Method};
use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const API: &str = "https://wiki.example.org/w/api.php";

fn executor(transport: &Arc<ScriptedTransport>) -> RequestExecutor {
    RequestExecutor::new(API, transport.clone())
}

fn with_session(transport: &Arc<ScriptedTransport>, session: &Arc<FakeSession>) -> RequestExecutor {
    executor(transport).with_session(session.clone())
}

fn query_spec() -> RequestSpec {
    RequestSpec::new()
        .with("action", "query")
        .with("meta", "siteinfo")
}

fn edit_spec() -> RequestSpec {
    RequestSpec::new()
        .with("action", "edit")
        .with("title", "Sandbox")
        .with("text", "hello")
        .with("summary", "tidy")
}

fn timestamp_ago(seconds: i64) -> String {
    (Utc::now() - ChronoDuration::seconds(seconds)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_default_config() {
    let config = ExecutorConfig::default();
    assert_eq!(config.max_attempts, 20);
    assert_eq!(config.mutation_window, Duration::from_secs(120));
    assert!(!config.bot_assert_fallback);
    assert_eq!(config.backoff(5), Duration::ZERO);
}

#[test]
fn test_backoff_strategies() {
    let mut config = ExecutorConfig {
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(500),
        ..ExecutorConfig::default()
    };

    assert_eq!(config.backoff(3), Duration::from_millis(100));

    config.backoff_type = BackoffType::Linear;
    assert_eq!(config.backoff(0), Duration::from_millis(100));
    assert_eq!(config.backoff(2), Duration::from_millis(300));
    assert_eq!(config.backoff(9), Duration::from_millis(500));

    config.backoff_type = BackoffType::Exponential;
    assert_eq!(config.backoff(0), Duration::from_millis(100));
    assert_eq!(config.backoff(2), Duration::from_millis(400));
    assert_eq!(config.backoff(3), Duration::from_millis(500));
}

#[test]
fn test_execute_options() {
    let options = ExecuteOptions::post()
        .with_assert(AssertMode::Bot)
        .with_token("csrf");
    assert_eq!(options.method, Method::POST);
    assert!(options.check_errors);
    assert!(options.is_mutating());
    assert!(!ExecuteOptions::get().is_mutating());

    let options = options.with_mutation(MutationIntent::new("Sandbox", "tidy"));
    assert_eq!(options.mutation, Some(MutationIntent::new("Sandbox", "tidy")));
    assert!(!ExecuteOptions::get().allow_errors().check_errors);
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[tokio::test]
async fn test_attaches_correlation_and_format() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"batchcomplete": "", "query": {}}));

    let envelope = executor(&transport).get(query_spec()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.method, Method::GET);
    assert_eq!(sent.url, API);
    assert_eq!(sent.param("format"), Some("json"));
    assert_eq!(sent.param("action"), Some("query"));
    assert_eq!(sent.param("assert"), None);
    assert!(sent.headers.is_empty());

    let id = sent.param("requestid").unwrap();
    assert_eq!(id.len(), 32);
    assert_eq!(envelope.request_id().as_deref(), Some(id));
}

#[tokio::test]
async fn test_fresh_correlation_id_per_call() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({})).echo(json!({}));

    let exec = executor(&transport);
    exec.get(query_spec()).await.unwrap();
    exec.get(query_spec()).await.unwrap();

    let requests = transport.requests();
    assert_ne!(
        requests[0].param("requestid"),
        requests[1].param("requestid")
    );
}

#[tokio::test]
async fn test_assert_param_attached() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({}));

    executor(&transport)
        .execute(query_spec(), &ExecuteOptions::get().with_assert(AssertMode::Bot))
        .await
        .unwrap();

    assert_eq!(transport.requests()[0].param("assert"), Some("bot"));
}

#[tokio::test]
async fn test_token_filled_from_session() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    with_session(&transport, &session)
        .execute(edit_spec(), &ExecuteOptions::post().with_token("csrf"))
        .await
        .unwrap();

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.param("token"), Some("csrf-1"));
}

#[tokio::test]
async fn test_signer_header_attached() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({}));

    executor(&transport)
        .with_signer(Some(Arc::new(BearerSigner::new("owner-token"))))
        .get(query_spec())
        .await
        .unwrap();

    assert_eq!(
        transport.requests()[0].headers,
        vec![(
            "Authorization".to_string(),
            "Bearer owner-token".to_string()
        )]
    );
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_unserialization_failure_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(200, "<html>Fatal error</html>")
        .echo(json!({"query": {}}));

    let envelope = executor(&transport).get(query_spec()).await.unwrap();

    assert!(envelope.get("query").is_some());
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_transient_transport_failure_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .fail(Error::Timeout { timeout_ms: 30_000 })
        .fail(Error::http_status(502, "Bad Gateway"))
        .echo(json!({}));

    executor(&transport).get(query_spec()).await.unwrap();
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_non_transient_transport_failure_surfaces() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.fail(Error::config("no route")).echo(json!({}));

    let err = executor(&transport).get(query_spec()).await.unwrap_err();

    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_unresponsive_envelope_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.raw(200, "{}").echo(json!({"query": {}}));

    executor(&transport).get(query_spec()).await.unwrap();
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_attempts_exhausted() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.raw(200, "{}").raw(200, "not json").raw(503, "");

    let err = executor(&transport)
        .with_config(ExecutorConfig {
            max_attempts: 3,
            ..ExecutorConfig::default()
        })
        .get(query_spec())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransportUnresponsive { attempts: 3 }));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_get_503_retried_without_side_read() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.raw(503, "Service Unavailable").echo(json!({}));

    executor(&transport).get(query_spec()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.param("prop").is_none()));
}

// ============================================================================
// Correlation Tests
// ============================================================================

#[tokio::test]
async fn test_correlation_mismatch_reinvoked_once() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(200, r#"{"requestid":"stale","servedby":"mw1"}"#)
        .echo(json!({"query": {}}));

    let envelope = executor(&transport).get(query_spec()).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(
        requests[0].param("requestid"),
        requests[1].param("requestid")
    );
    assert_eq!(
        envelope.request_id().as_deref(),
        requests[1].param("requestid")
    );
}

#[tokio::test]
async fn test_second_correlation_mismatch_is_fatal() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(200, r#"{"requestid":"stale","servedby":"mw1"}"#)
        .raw(200, r#"{"requestid":"stale","servedby":"mw1"}"#)
        .echo(json!({}));

    let err = executor(&transport).get(query_spec()).await.unwrap_err();

    match err {
        Error::CorrelationMismatch { received, .. } => assert_eq!(received, "stale"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test]
async fn test_missing_echo_counts_as_mismatch() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(200, r#"{"servedby":"mw1"}"#)
        .raw(200, r#"{"servedby":"mw1"}"#);

    let err = executor(&transport).get(query_spec()).await.unwrap_err();
    assert!(matches!(err, Error::CorrelationMismatch { .. }));
}

// ============================================================================
// Token and Assertion Recovery Tests
// ============================================================================

#[tokio::test]
async fn test_badtoken_refreshed_and_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}))
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let envelope = with_session(&transport, &session)
        .execute(edit_spec(), &ExecuteOptions::post().with_token("csrf"))
        .await
        .unwrap();

    assert_eq!(envelope.get("edit"), Some(&json!({"result": "Success"})));
    assert_eq!(session.refreshes(), 1);

    let requests = transport.requests();
    assert_eq!(requests[0].param("token"), Some("csrf-1"));
    assert_eq!(requests[1].param("token"), Some("csrf-2"));
    assert_eq!(requests[0].param("text"), requests[1].param("text"));
    assert_eq!(
        requests[0].param("requestid"),
        requests[1].param("requestid")
    );
}

#[tokio::test]
async fn test_badtoken_without_session() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"error": {"code": "badtoken", "info": "Invalid token"}}));

    let err = executor(&transport)
        .execute(edit_spec(), &ExecuteOptions::post())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StaleActionToken));
}

#[tokio::test]
async fn test_badtoken_replaces_caller_supplied_token() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}))
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    with_session(&transport, &session)
        .execute(edit_spec().with("token", "stale"), &ExecuteOptions::post())
        .await
        .unwrap();

    assert_eq!(session.refreshes(), 1);
    let requests = transport.requests();
    assert_eq!(requests[0].param("token"), Some("stale"));
    assert_eq!(requests[1].param("token"), Some("csrf-2"));
}

#[tokio::test]
async fn test_badtoken_without_token_to_replace() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "badtoken", "info": "Invalid token"}}))
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let err = with_session(&transport, &session)
        .execute(edit_spec(), &ExecuteOptions::post())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::StaleActionToken));
    assert_eq!(session.refreshes(), 0);
    assert_eq!(transport.calls(), 1);
}

const TOKENS_BODY: &str = r#"{"query": {"tokens": {"csrftoken": "c1"}}}"#;
const FRESH_TOKENS_BODY: &str = r#"{"query": {"tokens": {"csrftoken": "c2"}}}"#;

#[tokio::test]
async fn test_timeout_during_token_refresh_is_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(200, TOKENS_BODY)
        .echo(json!({"error": {"code": "badtoken", "info": "Invalid CSRF token."}}))
        .fail(Error::Timeout { timeout_ms: 1 })
        .raw(200, FRESH_TOKENS_BODY)
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(WikiSession::new(API, transport.clone()));

    let envelope = executor(&transport)
        .with_session(session)
        .execute(edit_spec(), &ExecuteOptions::post().with_token("csrf"))
        .await
        .unwrap();

    assert_eq!(envelope.get("edit"), Some(&json!({"result": "Success"})));
    assert_eq!(transport.calls(), 5);
    let requests = transport.requests();
    assert_eq!(requests[1].param("token"), Some("c1"));
    assert_eq!(requests[4].param("token"), Some("c2"));
}

#[tokio::test]
async fn test_timeout_during_initial_token_fetch_is_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .fail(Error::Timeout { timeout_ms: 1 })
        .raw(200, TOKENS_BODY)
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(WikiSession::new(API, transport.clone()));

    executor(&transport)
        .with_session(session)
        .execute(edit_spec(), &ExecuteOptions::post().with_token("csrf"))
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(transport.requests()[2].param("token"), Some("c1"));
}

#[tokio::test]
async fn test_timeout_during_relogin_is_retried() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "assertuserfailed", "info": "You are no longer logged in"}}))
        .fail(Error::Timeout { timeout_ms: 1 })
        .raw(200, r#"{"query": {"tokens": {"logintoken": "lt"}}}"#)
        .raw(200, r#"{"login": {"result": "Success", "lgusername": "ExampleBot"}}"#)
        .raw(200, TOKENS_BODY)
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(
        WikiSession::new(API, transport.clone())
            .with_credentials(Some(Credentials::new("ExampleBot", "pw"))),
    );

    executor(&transport)
        .with_session(session.clone())
        .execute(
            edit_spec(),
            &ExecuteOptions::post().with_assert(AssertMode::User),
        )
        .await
        .unwrap();

    assert!(session.is_logged_in().await);
    assert_eq!(transport.calls(), 6);
    assert_eq!(transport.requests()[5].param("assert"), Some("user"));
}

#[tokio::test]
async fn test_non_transient_relogin_failure_surfaces() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "assertuserfailed", "info": ""}}))
        .raw(200, r#"{"query": {"tokens": {"logintoken": "lt"}}}"#)
        .raw(200, r#"{"login": {"result": "Failed", "reason": "Wrong password"}}"#);
    let session = Arc::new(
        WikiSession::new(API, transport.clone())
            .with_credentials(Some(Credentials::new("ExampleBot", "bad"))),
    );

    let err = executor(&transport)
        .with_session(session)
        .execute(
            edit_spec(),
            &ExecuteOptions::post().with_assert(AssertMode::User),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn test_user_assertion_recovered_by_relogin() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "assertuserfailed", "info": "You are no longer logged in"}}))
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let options = ExecuteOptions::post()
        .with_assert(AssertMode::User)
        .with_token("csrf");
    with_session(&transport, &session)
        .execute(edit_spec(), &options)
        .await
        .unwrap();

    assert_eq!(session.logins(), 1);
    let requests = transport.requests();
    assert_eq!(requests[1].param("assert"), Some("user"));
    assert_eq!(requests[1].param("token"), Some("csrf-2"));
}

#[tokio::test]
async fn test_user_assertion_failing_twice_surfaces() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "assertuserfailed", "info": ""}}))
        .echo(json!({"error": {"code": "assertuserfailed", "info": ""}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let err = with_session(&transport, &session)
        .execute(
            edit_spec(),
            &ExecuteOptions::post().with_assert(AssertMode::User),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AssertionFailed {
            kind: AssertMode::User
        }
    ));
    assert_eq!(session.logins(), 1);
}

#[tokio::test]
async fn test_bot_assertion_surfaces_without_fallback() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"error": {"code": "assertbotfailed", "info": "not a bot"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let err = with_session(&transport, &session)
        .execute(
            edit_spec(),
            &ExecuteOptions::post().with_assert(AssertMode::Bot),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::AssertionFailed {
            kind: AssertMode::Bot
        }
    ));
    assert_eq!(session.logins(), 0);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_bot_assertion_fallback_relogs_in() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .echo(json!({"error": {"code": "assertbotfailed", "info": "not a bot"}}))
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    with_session(&transport, &session)
        .with_config(ExecutorConfig {
            bot_assert_fallback: true,
            ..ExecutorConfig::default()
        })
        .execute(
            edit_spec(),
            &ExecuteOptions::post().with_assert(AssertMode::Bot),
        )
        .await
        .unwrap();

    assert_eq!(session.logins(), 1);
    assert_eq!(transport.calls(), 2);
}

// ============================================================================
// Remote Error Tests
// ============================================================================

#[tokio::test]
async fn test_remote_error_surfaced() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"error": {"code": "permissiondenied", "info": "No."}}));

    let err = executor(&transport).get(query_spec()).await.unwrap_err();

    assert_eq!(err.remote_code(), Some("permissiondenied"));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_remote_error_returned_when_unchecked() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"error": {"code": "permissiondenied", "info": "No."}}));

    let envelope = executor(&transport)
        .execute(query_spec(), &ExecuteOptions::get().allow_errors())
        .await
        .unwrap();

    assert_eq!(envelope.error_code().as_deref(), Some("permissiondenied"));
}

#[tokio::test]
async fn test_assertion_error_without_assert_is_remote() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.echo(json!({"error": {"code": "assertuserfailed", "info": ""}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let err = with_session(&transport, &session)
        .get(query_spec())
        .await
        .unwrap_err();

    assert_eq!(err.remote_code(), Some("assertuserfailed"));
    assert_eq!(session.logins(), 0);
}

// ============================================================================
// 503 Disambiguation Tests
// ============================================================================

fn mutation_options() -> ExecuteOptions {
    ExecuteOptions::post()
        .with_token("csrf")
        .with_mutation(MutationIntent::new("Sandbox", "tidy"))
}

#[tokio::test]
async fn test_503_on_landed_mutation_synthesizes_success() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.raw(503, "Service Unavailable").echo(json!({
        "query": {"pages": {"42": {
            "pageid": 42,
            "title": "Sandbox",
            "revisions": [{"user": "ExampleBot", "comment": "tidy", "timestamp": timestamp_ago(30)}]
        }}}
    }));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let envelope = with_session(&transport, &session)
        .execute(edit_spec(), &mutation_options())
        .await
        .unwrap();

    assert_eq!(
        envelope.get("edit"),
        Some(&json!({"result": "Success", "assumed": true}))
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        envelope.request_id().as_deref(),
        requests[0].param("requestid")
    );

    let side_read = &requests[1];
    assert_eq!(side_read.method, Method::GET);
    assert_eq!(side_read.param("prop"), Some("revisions"));
    assert_eq!(side_read.param("titles"), Some("Sandbox"));
    assert_eq!(side_read.param("rvlimit"), Some("1"));
}

#[tokio::test]
async fn test_503_without_matching_revision_retries() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(503, "Service Unavailable")
        .echo(json!({
            "query": {"pages": {"42": {
                "revisions": [{"user": "ExampleBot", "comment": "something else", "timestamp": timestamp_ago(5)}]
            }}}
        }))
        .echo(json!({"edit": {"result": "Success", "newrevid": 7}}));
    let session = Arc::new(FakeSession::new(Some("ExampleBot")));

    let envelope = with_session(&transport, &session)
        .execute(edit_spec(), &mutation_options())
        .await
        .unwrap();

    assert_eq!(envelope.get("edit").unwrap()["newrevid"], json!(7));
    assert_eq!(transport.calls(), 3);
    assert_eq!(transport.requests()[2].param("action"), Some("edit"));
}

#[tokio::test]
async fn test_503_side_read_needs_known_user() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .raw(503, "Service Unavailable")
        .echo(json!({"edit": {"result": "Success"}}));
    let session = Arc::new(FakeSession::new(None));

    with_session(&transport, &session)
        .execute(edit_spec(), &mutation_options())
        .await
        .unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(transport.requests()[1].param("action"), Some("edit"));
}

// ============================================================================
// Revision Matching Tests
// ============================================================================

fn revision(user: &str, comment: &str, timestamp: &str) -> serde_json::Value {
    json!({"user": user, "comment": comment, "timestamp": timestamp})
}

#[test]
fn test_revision_matches() {
    let now = Utc::now();
    let window = Duration::from_secs(120);
    let recent = (now - ChronoDuration::seconds(60)).to_rfc3339();
    let stale = (now - ChronoDuration::seconds(121)).to_rfc3339();

    assert!(revision_matches(
        &revision("Bot", "tidy", &recent),
        "Bot",
        "tidy",
        now,
        window
    ));
    assert!(!revision_matches(
        &revision("Other", "tidy", &recent),
        "Bot",
        "tidy",
        now,
        window
    ));
    assert!(!revision_matches(
        &revision("Bot", "tidy up", &recent),
        "Bot",
        "tidy",
        now,
        window
    ));
    assert!(!revision_matches(
        &revision("Bot", "tidy", &stale),
        "Bot",
        "tidy",
        now,
        window
    ));
}

#[test]
fn test_revision_matches_tolerates_clock_skew() {
    let now = Utc::now();
    let ahead = (now + ChronoDuration::seconds(10)).to_rfc3339();

    assert!(revision_matches(
        &revision("Bot", "tidy", &ahead),
        "Bot",
        "tidy",
        now,
        Duration::from_secs(120)
    ));
}

#[test]
fn test_revision_matches_rejects_bad_timestamp() {
    let now = Utc::now();
    assert!(!revision_matches(
        &revision("Bot", "tidy", "yesterday"),
        "Bot",
        "tidy",
        now,
        Duration::from_secs(120)
    ));
    assert!(!revision_matches(
        &json!({"user": "Bot", "comment": "tidy"}),
        "Bot",
        "tidy",
        now,
        Duration::from_secs(120)
    ));
}
