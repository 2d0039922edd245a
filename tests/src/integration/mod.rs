//! # Integration Tests
//!
//! Client and simulated device wired together through the transport port.
//!
//! - `handshake_flows`: both variants, retries, fingerprint agreement
//! - `channel_flows`: sealed traffic, counters, fallback, allow-list

pub mod channel_flows;
pub mod handshake_flows;

use crate::device::SimulatedDevice;
use secure_session::{
    SessionConfig, SessionManager, StaticFingerprintProvider, SystemTimeSource,
};
use std::sync::Arc;

/// Manager under test.
pub type Client = SessionManager<SimulatedDevice, StaticFingerprintProvider>;

/// Client and device that agree on the fingerprint of `day`.
pub fn paired(config: SessionConfig, day: u64) -> (Client, Arc<SimulatedDevice>) {
    paired_across_days(config, day, day)
}

/// Client collecting its fingerprint on `client_day`, device on `device_day`.
pub fn paired_across_days(
    config: SessionConfig,
    client_day: u64,
    device_day: u64,
) -> (Client, Arc<SimulatedDevice>) {
    let device = SimulatedDevice::new(&config, StaticFingerprintProvider::sample(device_day));
    let client = SessionManager::with_parts(
        config,
        device.clone(),
        Arc::new(StaticFingerprintProvider::sample(client_day)),
        Arc::new(SystemTimeSource),
    )
    .expect("valid test config");
    (client, device)
}
