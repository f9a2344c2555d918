//! Storage content API client.
//!
//! Async HTTP client using `reqwest` with Bearer token authentication,
//! covering the single-shot upload and the three upload-session calls.

pub mod client;

pub use client::{Client, Error};
