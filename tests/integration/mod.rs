//! Integration tests for the aspect model store

mod namespace_listing;
mod service_workflows;
mod store_roundtrip;
mod support;
