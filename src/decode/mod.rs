//! Response decoder module
//!
//! Turns a raw response body into a `ResponseEnvelope`, the nested
//! string-keyed mapping the executor and fetcher inspect. A body that does
//! not decode to a mapping is a decode failure, which the executor treats
//! as transient.

mod decoders;
mod types;

pub use decoders::JsonDecoder;
pub use types::{RemoteErrorInfo, ResponseDecoder, ResponseEnvelope};
