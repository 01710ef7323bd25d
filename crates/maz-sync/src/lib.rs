//! # maz-sync
//!
//! Keeps a local, gzip-compressed mirror of directory and authorization
//! collections in step with the upstream APIs.
//!
//! - [`PageWalker`] follows `@odata.nextLink` pagination.
//! - [`DeltaCycle`] resumes from a persisted [`DeltaCursor`] or falls back to
//!   a full walk.
//! - [`reconcile`] merges a delta batch into a snapshot.
//! - [`aggregate_scoped_objects`] queries every authorization scope and keeps
//!   the first copy of each object.
//! - [`CacheStore`] ties these together behind TTL-driven refresh and serves
//!   the cache when the network is down.
//! - [`ObjectMatcher`] filters snapshots by case-insensitive substring.

mod cache;
mod connectivity;
mod credentials;
mod delta;
mod error;
mod files;
mod http;
mod matcher;
mod page;
mod query;
mod reconcile;
mod scope;

pub use cache::{CacheStore, needs_refresh};
pub use connectivity::{AssumeReachable, Connectivity, TcpProbe};
pub use credentials::{CredentialProvider, StaticCredentials};
pub use delta::{DeltaCursor, DeltaCycle, DeltaOutcome, ResyncReason, usable_cursor};
pub use error::SyncError;
pub use files::{SnapshotFiles, StoredSnapshot};
pub use http::{HttpTransport, QueryTransport, RequestOptions, check_response, parse_body};
pub use matcher::{ObjectMatcher, ReferenceResolver};
pub use page::{Batch, Page, PageWalker};
pub use query::LocalCount;
pub use reconcile::reconcile;
pub use scope::{LEGACY_ACCOUNT_NAME, ScopedObject, aggregate_scoped_objects, build_scope_list};
