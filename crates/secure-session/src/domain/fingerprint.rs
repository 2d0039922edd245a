//! # Device Fingerprint
//!
//! Environment signals that bind the handshake wrapping key to one device
//! and one calendar day.
//!
//! ## Canonical Form
//!
//! The fingerprint serializes to a JSON object with a fixed key order:
//!
//! ```text
//! {"userAgent","language","platform","timezone","screen",
//!  "canvas","webgl","fonts","timestamp"}
//! ```
//!
//! Peers hash exactly these bytes, so field order here is part of the wire
//! contract. Unavailable signals carry a sentinel string instead of failing.

use serde::{Deserialize, Serialize};

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Canvas rendering not available.
pub const CANVAS_UNAVAILABLE: &str = "canvas-unavailable";
/// Screen metrics unavailable.
pub const SCREEN_UNAVAILABLE: &str = "screen-unavailable";
/// No graphics context could be created.
pub const WEBGL_UNAVAILABLE: &str = "webgl-unavailable";
/// Graphics context exists but hides vendor/renderer.
pub const DEBUG_INFO_UNAVAILABLE: &str = "debug-info-unavailable";
/// Graphics probing raised an error.
pub const WEBGL_ERROR: &str = "webgl-error";
/// Font probing API missing.
pub const FONTS_API_UNAVAILABLE: &str = "fonts-api-unavailable";

/// Fonts probed for availability, in probe order.
pub const PROBE_FONTS: [&str; 5] = ["Arial", "Times New Roman", "Courier New", "Helvetica", "Georgia"];

/// Graphics renderer signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphicsSignal {
    /// Unmasked vendor and renderer strings.
    Renderer {
        /// GPU vendor
        vendor: String,
        /// GPU renderer
        renderer: String,
    },
    /// One of the sentinel strings.
    Sentinel(String),
}

impl GraphicsSignal {
    /// Sentinel for a missing graphics context.
    pub fn unavailable() -> Self {
        Self::Sentinel(WEBGL_UNAVAILABLE.to_string())
    }
}

/// Available-font signal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSignal {
    /// Fonts from [`PROBE_FONTS`] that were detected, in probe order.
    Available(Vec<String>),
    /// Font API sentinel.
    Sentinel(String),
}

impl FontSignal {
    /// Sentinel for a missing font API.
    pub fn unavailable() -> Self {
        Self::Sentinel(FONTS_API_UNAVAILABLE.to_string())
    }
}

/// Device fingerprint in canonical field order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFingerprint {
    /// User-agent string.
    pub user_agent: String,
    /// Locale tag, e.g. `en-US`.
    pub language: String,
    /// Platform name.
    pub platform: String,
    /// IANA timezone.
    pub timezone: String,
    /// `{width}x{height}x{colorDepth}`.
    pub screen: String,
    /// Canvas digest or [`CANVAS_UNAVAILABLE`].
    pub canvas: String,
    /// Graphics renderer descriptor.
    pub webgl: GraphicsSignal,
    /// Available fonts.
    pub fonts: FontSignal,
    /// Whole days since the Unix epoch.
    pub timestamp: u64,
}

impl DeviceFingerprint {
    /// Canonical JSON bytes that get hashed.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Day bucket for a Unix timestamp in milliseconds.
pub fn day_stamp(unix_millis: u64) -> u64 {
    unix_millis / MILLIS_PER_DAY
}

/// Screen descriptor in the canonical `WxHxD` form.
pub fn screen_descriptor(width: u32, height: u32, color_depth: u32) -> String {
    format!("{width}x{height}x{color_depth}")
}
