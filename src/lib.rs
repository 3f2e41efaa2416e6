//! Job board dashboard client library
//!
//! Fetches the job seeker and employer dashboards from the job board backend,
//! caches them with a TTL, shares concurrent requests, and keeps a view's
//! dashboard state up to date. Exposed as a library for the CLI and for
//! integration tests.

pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod events;
pub mod hook;
pub mod logging;
pub mod notify;
