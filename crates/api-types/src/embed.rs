use serde::{Deserialize, Serialize};

/// Body of `POST /api/validate-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Embeddability verdict for a candidate target URL.
///
/// Serialized with the camelCase field names the simulator frontend
/// consumes. Probe failures are carried in `error` with a 200 status so
/// the caller can always parse JSON without branching on transport status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedVerdict {
    /// Whether the target responded with a successful status.
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub can_embed: bool,
    /// Lowercased `X-Frame-Options` value, when the target sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_frame_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmbedVerdict {
    /// Verdict for a target that answered the probe.
    pub fn reached(status: u16, can_embed: bool, x_frame_options: Option<String>) -> Self {
        Self {
            valid: (200..300).contains(&status),
            status: Some(status),
            can_embed,
            x_frame_options,
            error: None,
        }
    }

    /// Verdict for a target the probe could not reach. Still a successful
    /// probe outcome, never an HTTP error.
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            status: None,
            can_embed: false,
            x_frame_options: None,
            error: Some(error.into()),
        }
    }
}
