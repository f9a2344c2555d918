//! Wire protocol types for the storage content API.
//!
//! Every content call is an HTTP `POST` whose JSON argument travels in the
//! [`API_ARG_HEADER`] header while the request body carries raw file bytes.

pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{API_ARG_HEADER, DEFAULT_CONTENT_URL, Endpoint};
pub use envelope::{ApiErrorBody, encode_api_arg};
pub use messages::{
    UploadSessionAppendArg, UploadSessionFinishArg, UploadSessionStartArg,
    UploadSessionStartResult,
};
pub use types::{CommitInfo, FileMetadata, UploadSessionCursor, WriteMode};
