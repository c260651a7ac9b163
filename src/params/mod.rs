//! Request parameter module
//!
//! `RequestSpec` is the ordered parameter set of one logical API request.
//! Values are either scalars or lists; lists go over the wire pipe-joined.
//!
//! The normalization helpers are kept separate from the types so each rule
//! can be tested on its own.

mod normalize;
mod types;

pub use normalize::{normalize_list_filter, strip_keys};
pub use types::{ParamValue, RequestSpec, LIST_SEPARATOR};
