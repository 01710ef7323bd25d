//! Delta cycle: resume from a persisted cursor or fall back to a full walk.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SyncError;
use crate::http::{QueryTransport, RequestOptions};
use crate::page::PageWalker;

/// The server-issued resume token for one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaCursor {
    pub delta_link: String,
    /// Full-sync url the cursor descends from. A cursor recorded for another
    /// query (a changed `$select`, another cloud) is not reused.
    pub base_url: String,
    pub issued_at: DateTime<Utc>,
}

impl DeltaCursor {
    #[must_use]
    pub fn new(delta_link: impl Into<String>, base_url: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            delta_link: delta_link.into(),
            base_url: base_url.into(),
            issued_at,
        }
    }

    /// Whether the cursor is older than `max_age` at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now.signed_duration_since(self.issued_at);
        chrono::Duration::from_std(max_age).is_ok_and(|max| age >= max)
    }
}

/// Why a full walk was chosen over resuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncReason {
    NoCursor,
    EmptyBase,
    Expired,
    BaseUrlChanged,
}

/// Decide whether `cursor` can be resumed from.
///
/// # Errors
///
/// Returns the reason a full resync is needed.
pub fn usable_cursor<'c>(
    cursor: Option<&'c DeltaCursor>,
    base_url: &str,
    has_base: bool,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Result<&'c DeltaCursor, ResyncReason> {
    let cursor = cursor.ok_or(ResyncReason::NoCursor)?;
    if !has_base {
        return Err(ResyncReason::EmptyBase);
    }
    if cursor.base_url != base_url {
        return Err(ResyncReason::BaseUrlChanged);
    }
    if cursor.is_expired(now, max_age) {
        return Err(ResyncReason::Expired);
    }
    Ok(cursor)
}

/// Output of one cycle: the raw delta records and the cursor to persist.
#[derive(Debug)]
pub struct DeltaOutcome {
    pub records: Vec<Value>,
    pub cursor: DeltaCursor,
    /// `true` when the base url was walked instead of a delta link.
    pub full: bool,
}

pub struct DeltaCycle<'a, T> {
    transport: &'a T,
    cursor_max_age: Duration,
}

impl<'a, T: QueryTransport> DeltaCycle<'a, T> {
    pub const fn new(transport: &'a T, cursor_max_age: Duration) -> Self {
        Self {
            transport,
            cursor_max_age,
        }
    }

    /// Fetch everything changed since `cursor`, or the whole collection.
    ///
    /// An initial sync against an empty base asks for minimal payloads. The
    /// returned cursor is stamped with `now`.
    ///
    /// # Errors
    ///
    /// Propagates walk failures. Returns [`SyncError::MissingCursor`] if the
    /// walk finished without the server issuing a delta link.
    pub async fn sync(
        &self,
        base_url: &str,
        cursor: Option<&DeltaCursor>,
        has_base: bool,
        now: DateTime<Utc>,
    ) -> Result<DeltaOutcome, SyncError> {
        let (start_url, options, full) =
            match usable_cursor(cursor, base_url, has_base, now, self.cursor_max_age) {
                Ok(cursor) => (cursor.delta_link.as_str(), RequestOptions::default(), false),
                Err(reason) => {
                    tracing::debug!(?reason, base_url, "full delta resync");
                    let options = if has_base {
                        RequestOptions::default()
                    } else {
                        RequestOptions::minimal()
                    };
                    (base_url, options, true)
                }
            };

        let batch = PageWalker::new(self.transport, options).walk(start_url).await?;
        let delta_link = batch.delta_link.ok_or_else(|| SyncError::MissingCursor {
            url: start_url.to_string(),
        })?;

        Ok(DeltaOutcome {
            records: batch.items,
            cursor: DeltaCursor::new(delta_link, base_url, now),
            full,
        })
    }
}
