use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// What to do when the destination path already holds a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum WriteMode {
    /// Never overwrite; conflicts fail (or autorename).
    Add,
    /// Always replace the existing file.
    #[default]
    Overwrite,
    /// Replace only if the current revision matches.
    Update { update: String },
}

/// Describes the object a finished upload commits to.
///
/// Shared verbatim by the single-shot and chunked upload paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub path: String,
    pub mode: WriteMode,
    pub autorename: bool,
    /// Client-side modification time, UTC with whole-second precision.
    #[serde(with = "client_timestamp")]
    pub client_modified: DateTime<Utc>,
    pub mute: bool,
}

impl CommitInfo {
    /// Builds an unconditional-overwrite commit for `path`.
    ///
    /// Sub-second precision is dropped from `modified`; the API rejects it.
    pub fn overwrite(path: impl Into<String>, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::Overwrite,
            autorename: false,
            client_modified: modified.trunc_subsecs(0),
            mute: false,
        }
    }
}

/// Position inside an upload session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSessionCursor {
    pub session_id: String,
    /// Bytes already acknowledged by the remote side.
    pub offset: u64,
}

/// Descriptor of a committed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rev: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl FileMetadata {
    /// Returns the display path, falling back to the lower-cased path or name.
    pub fn display_path(&self) -> &str {
        self.path_display
            .as_deref()
            .or(self.path_lower.as_deref())
            .unwrap_or(&self.name)
    }
}

/// `%Y-%m-%dT%H:%M:%SZ` encoding for commit timestamps.
mod client_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        ts.format(FORMAT).to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
