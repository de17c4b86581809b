//! Aspect Store: namespace-addressed model repository
//!
//! Stores SAMM aspect models as turtle files at `<root>/<namespace>/<version>/<name>.ttl`,
//! resolves identifiers between colon tokens, URNs and paths, keeps a cached namespace
//! listing per storage root, and guards edits with an in-memory lock table.

pub mod concurrency;
pub mod config;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod scanner;
pub mod sdk;
pub mod service;
pub mod store;
pub mod tooling;
pub mod types;
