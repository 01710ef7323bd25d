//! Pagination following.
//!
//! A listing answers with a `value` array plus, while more data remains, an
//! `@odata.nextLink`. Delta listings end with an `@odata.deltaLink` instead.

use serde_json::Value;

use crate::error::SyncError;
use crate::http::{QueryTransport, RequestOptions};

const ITEMS_FIELD: &str = "value";
const NEXT_LINK_FIELD: &str = "@odata.nextLink";
const DELTA_LINK_FIELD: &str = "@odata.deltaLink";

/// One decoded response page.
#[derive(Debug, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_link: Option<String>,
    pub delta_link: Option<String>,
}

impl Page {
    /// Split a response body into items and links. A missing or null items
    /// field is an empty page; blank links count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Parse`] if the body is not an object or its items
    /// field is not an array.
    pub fn from_body(body: Value) -> Result<Self, SyncError> {
        let Value::Object(mut map) = body else {
            return Err(SyncError::Parse("page body is not a JSON object".to_string()));
        };
        let items = match map.remove(ITEMS_FIELD) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(SyncError::Parse(format!(
                    "page field '{ITEMS_FIELD}' is not an array"
                )));
            }
        };
        let link = |map: &serde_json::Map<String, Value>, key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            items,
            next_link: link(&map, NEXT_LINK_FIELD),
            delta_link: link(&map, DELTA_LINK_FIELD),
        })
    }
}

/// Everything one walk accumulated.
#[derive(Debug, Default, PartialEq)]
pub struct Batch {
    pub items: Vec<Value>,
    /// Set when the walk ended on a terminal delta page.
    pub delta_link: Option<String>,
    /// Number of requests issued.
    pub pages: usize,
}

/// Follows next-page links for a single query.
pub struct PageWalker<'a, T> {
    transport: &'a T,
    options: RequestOptions,
}

impl<'a, T: QueryTransport> PageWalker<'a, T> {
    pub const fn new(transport: &'a T, options: RequestOptions) -> Self {
        Self { transport, options }
    }

    /// Fetch `start_url` and every page after it.
    ///
    /// Stops when a page has no next link, or when it carries a delta link
    /// (the server's terminal delta state). There is no page limit. The
    /// first failed request aborts the walk and nothing gathered so far is
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates any transport or parse error.
    pub async fn walk(&self, start_url: &str) -> Result<Batch, SyncError> {
        let mut batch = Batch::default();
        let mut url = start_url.to_string();
        loop {
            let page = Page::from_body(self.transport.get_json(&url, &self.options).await?)?;
            batch.pages += 1;
            tracing::debug!(page = batch.pages, objects = page.items.len(), "fetched page");
            batch.items.extend(page.items);

            if let Some(delta_link) = page.delta_link {
                batch.delta_link = Some(delta_link);
                return Ok(batch);
            }
            match page.next_link {
                Some(next) => url = next,
                None => return Ok(batch),
            }
        }
    }
}
