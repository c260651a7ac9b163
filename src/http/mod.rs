//! HTTP transport module
//!
//! The physical layer underneath the request executor.
//!
//! # Features
//!
//! - **Transport trait**: one call in, status code and raw body out
//! - **Cookie-backed sessions**: login cookies survive between calls
//! - **Rate Limiting**: Token bucket rate limiter using governor
//!
//! Retry, decoding and error classification live in the executor, not here.

mod rate_limit;
mod transport;

pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{
    HttpTransport, HttpTransportConfig, Transport, TransportRequest, TransportResponse,
};
