//! Core types and shared functionality for canroute.
//!
//! This crate provides:
//! - Canister principal codec (textual form with CRC validation)
//! - Resolution value types
//! - TTL host store with SQLite and in-memory backends
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod principal;
pub mod resolution;
pub mod store;

pub use config::AppConfig;
pub use error::ResolveError;
pub use principal::{Principal, PrincipalError};
pub use resolution::{CanisterLocation, Resolution};
pub use store::{HostRecord, HostStore, MemoryStore, SqliteStore};
