//! # maz-core
//!
//! Core types shared across the maz crates:
//! - [`RemoteObject`], the untyped attribute bag mirrored from the service
//! - [`EntityType`], the catalogue of synchronized collections and how each is fetched
//! - [`ScopeNode`] and [`ScopeList`] for the authorization hierarchy
//! - Cross-cutting error types

pub mod entity;
pub mod errors;
pub mod object;
pub mod scope;

pub use entity::{ApiSurface, Endpoints, EntityType, SyncMode, TtlClass};
pub use errors::CoreError;
pub use object::{EntitySnapshot, RemoteObject};
pub use scope::{ScopeKind, ScopeList, ScopeNode};
