//! Executor configuration and per-call options

use crate::types::{AssertMode, BackoffType, Method};
use std::time::Duration;

/// Default attempt cap for one logical request
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Default recency window for the 503 side read
pub const DEFAULT_MUTATION_WINDOW: Duration = Duration::from_secs(120);

/// Executor-wide behavior
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum attempts per logical request
    pub max_attempts: u32,
    /// Backoff strategy between attempts
    pub backoff_type: BackoffType,
    /// Delay before the first retry; zero disables sleeping
    pub initial_backoff: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
    /// Recover a failed bot assertion like a failed user assertion
    pub bot_assert_fallback: bool,
    /// How recent a matching revision must be to count as our mutation
    pub mutation_window: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_type: BackoffType::Constant,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::from_secs(60),
            bot_assert_fallback: false,
            mutation_window: DEFAULT_MUTATION_WINDOW,
        }
    }
}

impl ExecutorConfig {
    /// Delay before retry number `attempt` (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }
}

/// What a mutating call is about to change
///
/// Used to recognise our own edit in the resource history when the server
/// answers 503 and the outcome is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationIntent {
    /// Title of the page being changed
    pub title: String,
    /// Edit summary sent with the change
    pub summary: String,
}

impl MutationIntent {
    /// Create a new intent
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// Per-call options
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// HTTP verb
    pub method: Method,
    /// Session precondition to assert
    pub assert: AssertMode,
    /// Surface an `error` object as `Error::Remote`
    pub check_errors: bool,
    /// Action token kind substituted into the `token` parameter
    pub token_kind: Option<String>,
    /// Mutation description for 503 disambiguation
    pub mutation: Option<MutationIntent>,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            assert: AssertMode::None,
            check_errors: true,
            token_kind: None,
            mutation: None,
        }
    }
}

impl ExecuteOptions {
    /// Read-only GET call
    pub fn get() -> Self {
        Self::default()
    }

    /// POST call
    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    /// Set the assertion
    #[must_use]
    pub fn with_assert(mut self, assert: AssertMode) -> Self {
        self.assert = assert;
        self
    }

    /// Fill and refresh the `token` parameter from this token kind
    #[must_use]
    pub fn with_token(mut self, kind: impl Into<String>) -> Self {
        self.token_kind = Some(kind.into());
        self
    }

    /// Describe the mutation for 503 disambiguation
    #[must_use]
    pub fn with_mutation(mut self, intent: MutationIntent) -> Self {
        self.mutation = Some(intent);
        self
    }

    /// Return envelopes carrying an `error` object instead of failing
    #[must_use]
    pub fn allow_errors(mut self) -> Self {
        self.check_errors = false;
        self
    }

    /// Whether this call changes server state; every POST is treated as one
    pub fn is_mutating(&self) -> bool {
        self.method == Method::POST
    }
}
