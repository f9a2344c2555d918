use serde::{Deserialize, Serialize};

/// Error body returned by endpoint-specific failures (HTTP 409).
///
/// `error` is kept as raw JSON; its shape differs per endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error_summary: String,
    #[serde(default)]
    pub error: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Returns the `.tag` of the top-level error union, if any.
    pub fn tag(&self) -> Option<&str> {
        self.error.get(".tag").and_then(|t| t.as_str())
    }
}

/// Serializes a call argument for the API argument header.
///
/// HTTP header values must be ASCII, so every non-ASCII character (and DEL)
/// is written as a `\uXXXX` escape, using surrogate pairs above the BMP.
pub fn encode_api_arg<T: Serialize>(arg: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(arg)?;
    let mut out = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}
