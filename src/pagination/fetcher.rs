//! Continuation-following list fetcher

use super::types::{
    cursor_keys, ContinuationToken, ListLimit, ListPage, ListQuery, CONTINUE_MARKER,
};
use crate::decode::ResponseEnvelope;
use crate::error::Result;
use crate::executor::{ExecuteOptions, RequestExecutor};
use crate::params::{normalize_list_filter, strip_keys, RequestSpec};
use crate::types::{JsonObject, JsonValue};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

/// Top-level key holding list results
const RESULT_CONTAINER: &str = "query";

/// Current continuation block
const CONTINUE_BLOCK: &str = "continue";

/// Legacy continuation block, keyed by module name
const LEGACY_CONTINUE_BLOCK: &str = "query-continue";

/// Pages through list-style queries using a shared executor
#[derive(Debug, Clone)]
pub struct ListFetcher {
    executor: Arc<RequestExecutor>,
}

impl ListFetcher {
    /// Create a fetcher
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Fetch items until the server runs out or the limit is reached
    ///
    /// The returned resume token continues past the last returned item; it
    /// is empty once the server reports no more data.
    pub async fn fetch(&self, query: &ListQuery, resume: &ContinuationToken) -> Result<ListPage> {
        let mut pages = self.pages(query, resume)?;
        let mut result = ListPage::default();

        while let Some(page) = pages.try_next().await? {
            result.items.extend(page.items);
            result.resume = page.resume;
        }

        Ok(result)
    }

    /// Stream the fetch one server page at a time
    ///
    /// The query is validated before any round trip. Each page carries the
    /// resume token valid after it, so a consumer can stop early and save it.
    pub fn pages(
        &self,
        query: &ListQuery,
        resume: &ContinuationToken,
    ) -> Result<BoxStream<'static, Result<ListPage>>> {
        let plan = ListPlan::new(query, resume)?;
        let executor = Arc::clone(&self.executor);

        let stream = stream::try_unfold(Some(plan), move |plan| {
            let executor = Arc::clone(&executor);
            async move {
                let Some(mut plan) = plan else {
                    return Ok(None);
                };
                let page = plan.next_page(&executor).await?;
                let next = if plan.done { None } else { Some(plan) };
                Ok(Some((page, next)))
            }
        });

        Ok(stream.boxed())
    }
}

/// Evolving state of one fetch
#[derive(Debug)]
struct ListPlan {
    code: String,
    limit: ListLimit,
    head_title: Option<String>,
    base: RequestSpec,
    resume: ContinuationToken,
    fetched: usize,
    done: bool,
}

impl ListPlan {
    fn new(query: &ListQuery, resume: &ContinuationToken) -> Result<Self> {
        query.validate()?;

        // Server-only cursors enter through the resume token; `start` and
        // `from` double as caller filters and are left alone.
        let mut base = query.params.clone();
        strip_keys(
            &mut base,
            [
                format!("{}continue", query.code),
                format!("{}offset", query.code),
                CONTINUE_MARKER.to_string(),
            ],
        );
        normalize_list_filter(&mut base, &format!("{}namespace", query.code));

        Ok(Self {
            code: query.code.clone(),
            limit: query.limit,
            head_title: query.head_title.clone(),
            base,
            resume: resume.clone(),
            fetched: 0,
            done: false,
        })
    }

    async fn next_page(&mut self, executor: &RequestExecutor) -> Result<ListPage> {
        let mut spec = self.base.clone();
        spec.set(format!("{}limit", self.code), self.limit.page_size(self.fetched));
        spec.merge(self.resume.iter());

        let envelope = executor.execute(spec, &ExecuteOptions::get()).await?;

        let Some(container) = envelope.get(RESULT_CONTAINER) else {
            debug!(code = %self.code, "no result container, treating as end of data");
            self.resume.clear();
            self.done = true;
            return Ok(ListPage::default());
        };

        let mut items = flatten(container, self.head_title.as_deref());
        self.resume = next_cursor(&envelope, &self.code);
        self.fetched += items.len();

        if let Some(cap) = self.limit.cap() {
            if self.fetched >= cap {
                let excess = self.fetched - cap;
                items.truncate(items.len() - excess);
                self.fetched = cap;
                self.done = true;
            }
        }
        if self.resume.is_empty() || self.limit == ListLimit::ProtocolMax {
            self.done = true;
        }

        debug!(
            code = %self.code,
            page_items = items.len(),
            fetched = self.fetched,
            more = !self.resume.is_empty(),
            "fetched list page"
        );

        Ok(ListPage {
            items,
            resume: self.resume.clone(),
        })
    }
}

/// Flatten a result container into items
///
/// The container maps module names to item collections. With a head title,
/// items carrying that key are replaced by its value (lists are spliced in)
/// and items lacking it are dropped.
pub(crate) fn flatten(container: &JsonValue, head_title: Option<&str>) -> Vec<JsonValue> {
    let mut items = Vec::new();

    for collection in values_of(container) {
        for item in values_of(collection) {
            match head_title {
                None => items.push(item.clone()),
                Some(key) => match item.get(key) {
                    Some(JsonValue::Array(inner)) => items.extend(inner.iter().cloned()),
                    Some(inner) => items.push(inner.clone()),
                    None => {}
                },
            }
        }
    }

    items
}

fn values_of(value: &JsonValue) -> Box<dyn Iterator<Item = &JsonValue> + '_> {
    match value {
        JsonValue::Object(map) => Box::new(map.values()),
        JsonValue::Array(list) => Box::new(list.iter()),
        _ => Box::new(std::iter::empty()),
    }
}

/// Pick the next cursor out of a response's continuation block
///
/// Both the current `continue` block and the legacy per-module
/// `query-continue` block are read. Only the highest-priority cursor for
/// `code` is kept, plus the bare `continue` marker when the server sent one.
pub(crate) fn next_cursor(envelope: &ResponseEnvelope, code: &str) -> ContinuationToken {
    let mut found = JsonObject::new();

    if let Some(JsonValue::Object(block)) = envelope.get(CONTINUE_BLOCK) {
        found.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(JsonValue::Object(legacy)) = envelope.get(LEGACY_CONTINUE_BLOCK) {
        for module in legacy.values().filter_map(JsonValue::as_object) {
            for (key, value) in module {
                found.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }

    let mut token = ContinuationToken::new();
    for key in cursor_keys(code) {
        if let Some(cursor) = found.get(&key).and_then(scalar) {
            token.insert(key, cursor);
            if let Some(marker) = found.get(CONTINUE_MARKER).and_then(scalar) {
                token.insert(CONTINUE_MARKER, marker);
            }
            break;
        }
    }

    token
}

fn scalar(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
