//! Pagination module
//!
//! Turns one list-style query into a loop that follows server-supplied
//! continuation cursors.
//!
//! # Overview
//!
//! A `ListQuery` names the list module's parameter prefix (`rc` for
//! recent changes, `ap` for all pages, ...), an optional client-side cap
//! and the base request. `ListFetcher` synthesizes `<code>limit`, merges
//! the resume token, flattens each page's results and stops when the
//! server has no more data or the cap is reached. The final
//! `ContinuationToken` can be stored and passed back later to continue.

mod fetcher;
mod types;

pub use fetcher::ListFetcher;
pub use types::{
    cursor_keys, ContinuationToken, ListLimit, ListPage, ListQuery, CURSOR_SUFFIXES,
    PROTOCOL_MAX,
};
