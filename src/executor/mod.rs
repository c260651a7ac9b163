//! Request executor module
//!
//! Runs one logical API request to completion:
//!
//! - attaches a fresh correlation id and checks the server echoes it back
//! - retries transient transport and decoding failures up to a cap
//! - refreshes stale action tokens and re-logs in on assertion failures
//! - disambiguates HTTP 503 on mutations with a side read of the
//!   resource's latest revision before retrying
//!
//! Remote errors unrelated to the above are always surfaced to the caller.

mod executor;
mod types;

pub use executor::RequestExecutor;
pub use types::{
    ExecuteOptions, ExecutorConfig, MutationIntent, DEFAULT_MAX_ATTEMPTS, DEFAULT_MUTATION_WINDOW,
};

#[cfg(test)]
mod tests;
