//! portico HTTP server.
//!
//! Hosts the session controller and the directory lookup service behind an
//! axum router.

pub mod app;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod store;
