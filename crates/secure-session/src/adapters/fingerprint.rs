//! Fingerprint Provider Adapters
//!
//! - `HostFingerprintProvider`: signals from the process environment
//! - `StaticFingerprintProvider`: fixed fingerprint for tests and replays

use crate::adapters::time::SystemTimeSource;
use crate::domain::{
    day_stamp, screen_descriptor, DeviceFingerprint, FontSignal, GraphicsSignal,
    CANVAS_UNAVAILABLE, DEBUG_INFO_UNAVAILABLE, PROBE_FONTS, SCREEN_UNAVAILABLE,
};
use crate::ports::outbound::{FingerprintProvider, TimeSource};
use parking_lot::RwLock;
use std::env;
use std::sync::Arc;
use tracing::debug;

/// Optional signals a host can supply. Missing ones become sentinels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HostSignals {
    /// User agent override.
    pub user_agent: Option<String>,
    /// Screen `(width, height, color_depth)`.
    pub screen: Option<(u32, u32, u32)>,
    /// Canvas digest.
    pub canvas: Option<String>,
    /// Graphics `(vendor, renderer)`.
    pub graphics: Option<(String, String)>,
    /// Fonts known to be installed.
    pub fonts: Option<Vec<String>>,
}

/// Fingerprint from the host process environment.
pub struct HostFingerprintProvider {
    signals: HostSignals,
    time: Arc<dyn TimeSource>,
}

impl HostFingerprintProvider {
    /// Provider with no extra signals and the system clock.
    pub fn new() -> Self {
        Self::with_signals(HostSignals::default(), Arc::new(SystemTimeSource))
    }

    /// Provider with explicit signals and clock.
    pub fn with_signals(signals: HostSignals, time: Arc<dyn TimeSource>) -> Self {
        Self { signals, time }
    }

    fn language() -> String {
        env::var("LC_ALL")
            .or_else(|_| env::var("LANG"))
            .ok()
            .and_then(|raw| normalize_locale(&raw))
            .unwrap_or_else(|| "en-US".to_string())
    }

    fn timezone() -> String {
        env::var("TZ")
            .ok()
            .map(|tz| tz.trim_start_matches(':').to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| "UTC".to_string())
    }

    fn graphics(&self) -> GraphicsSignal {
        match &self.signals.graphics {
            Some((vendor, renderer)) => GraphicsSignal::Renderer {
                vendor: vendor.clone(),
                renderer: renderer.clone(),
            },
            None => GraphicsSignal::Sentinel(DEBUG_INFO_UNAVAILABLE.to_string()),
        }
    }

    fn fonts(&self) -> FontSignal {
        match &self.signals.fonts {
            Some(installed) => FontSignal::Available(
                PROBE_FONTS
                    .iter()
                    .filter(|probe| installed.iter().any(|f| f == *probe))
                    .map(|f| f.to_string())
                    .collect(),
            ),
            None => FontSignal::unavailable(),
        }
    }
}

impl Default for HostFingerprintProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintProvider for HostFingerprintProvider {
    fn collect(&self) -> DeviceFingerprint {
        let fingerprint = DeviceFingerprint {
            user_agent: self.signals.user_agent.clone().unwrap_or_else(|| {
                format!(
                    "secure-session/{} ({}; {})",
                    crate::VERSION,
                    env::consts::OS,
                    env::consts::ARCH
                )
            }),
            language: Self::language(),
            platform: format!("{} {}", env::consts::OS, env::consts::ARCH),
            timezone: Self::timezone(),
            screen: self
                .signals
                .screen
                .map(|(w, h, d)| screen_descriptor(w, h, d))
                .unwrap_or_else(|| SCREEN_UNAVAILABLE.to_string()),
            canvas: self
                .signals
                .canvas
                .clone()
                .unwrap_or_else(|| CANVAS_UNAVAILABLE.to_string()),
            webgl: self.graphics(),
            fonts: self.fonts(),
            timestamp: day_stamp(self.time.now_millis()),
        };
        debug!(
            day = fingerprint.timestamp,
            platform = %fingerprint.platform,
            "[secure-session] fingerprint collected"
        );
        fingerprint
    }
}

/// `en_US.UTF-8` -> `en-US`. `C` and `POSIX` have no language.
fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw.split(['.', '@']).next().unwrap_or("");
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

/// Fixed fingerprint; the day can be moved to exercise rotation.
#[derive(Clone, Debug)]
pub struct StaticFingerprintProvider {
    fingerprint: Arc<RwLock<DeviceFingerprint>>,
}

impl StaticFingerprintProvider {
    /// Provider returning `fingerprint`.
    pub fn new(fingerprint: DeviceFingerprint) -> Self {
        Self {
            fingerprint: Arc::new(RwLock::new(fingerprint)),
        }
    }

    /// Deterministic sample fingerprint on day `day`.
    pub fn sample(day: u64) -> Self {
        Self::new(DeviceFingerprint {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
            language: "en-US".to_string(),
            platform: "Linux x86_64".to_string(),
            timezone: "UTC".to_string(),
            screen: screen_descriptor(1920, 1080, 24),
            canvas: CANVAS_UNAVAILABLE.to_string(),
            webgl: GraphicsSignal::unavailable(),
            fonts: FontSignal::Available(vec!["Arial".to_string(), "Georgia".to_string()]),
            timestamp: day,
        })
    }

    /// Move to another day.
    pub fn set_day(&self, day: u64) {
        self.fingerprint.write().timestamp = day;
    }
}

impl FingerprintProvider for StaticFingerprintProvider {
    fn collect(&self) -> DeviceFingerprint {
        self.fingerprint.read().clone()
    }
}
