/// Default host for content (upload/download) endpoints.
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com";

/// Header carrying the JSON call argument on content endpoints.
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Content-upload endpoint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Single-shot upload of a whole file.
    Upload,
    /// Opens an upload session with the first chunk.
    SessionStart,
    /// Appends a chunk at the cursor offset.
    SessionAppend,
    /// Sends the final chunk and commits the session.
    SessionFinish,
}

impl Endpoint {
    /// Returns the route relative to the content host.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Upload => "/2/files/upload",
            Endpoint::SessionStart => "/2/files/upload_session/start",
            Endpoint::SessionAppend => "/2/files/upload_session/append_v2",
            Endpoint::SessionFinish => "/2/files/upload_session/finish",
        }
    }

    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Upload => "upload",
            Endpoint::SessionStart => "upload_session/start",
            Endpoint::SessionAppend => "upload_session/append",
            Endpoint::SessionFinish => "upload_session/finish",
        }
    }
}
