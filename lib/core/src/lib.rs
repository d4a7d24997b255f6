//! Core types shared by the portico crates.
//!
//! This crate provides the identifiers used to track who is signed in and
//! which session a request belongs to, plus the error handling foundation.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, RequestId, SessionKey, Uid};
