//! Constants for NetworkManager D-Bus values and scan parameters.
//!
//! The NetworkManager codes correspond to the numeric values used by its
//! D-Bus API for device types, states and security flags.

/// NetworkManager device type constants.
pub mod device_type {
    pub const WIFI: u32 = 2;
}

/// NetworkManager device state constants
pub mod device_state {
    pub const UNAVAILABLE: u32 = 20;
    pub const DISCONNECTED: u32 = 30;
    pub const ACTIVATED: u32 = 100;
}

/// NetworkManager active connection state constants
pub mod active_state {
    pub const ACTIVATED: u32 = 2;
    pub const DEACTIVATED: u32 = 4;
}

/// NetworkManager active connection state reasons
pub mod active_reason {
    pub const USER_DISCONNECTED: u32 = 2;
    pub const DEVICE_DISCONNECTED: u32 = 3;
    pub const SERVICE_STOPPED: u32 = 4;
    pub const IP_CONFIG_INVALID: u32 = 5;
    pub const CONNECT_TIMEOUT: u32 = 6;
    pub const NO_SECRETS: u32 = 9;
    pub const LOGIN_FAILED: u32 = 10;
    pub const CONNECTION_REMOVED: u32 = 11;
    pub const DEVICE_REMOVED: u32 = 14;
}

/// WiFi security flag constants
pub mod security_flags {
    pub const PRIVACY: u32 = 0x1;
    pub const PSK: u32 = 0x0100;
    pub const EAP: u32 = 0x0200;
    pub const SAE: u32 = 0x0400;
}

/// WPA pre-shared key format limits.
pub mod psk {
    pub const MIN_LEN: usize = 8;
    pub const MAX_LEN: usize = 63;
    /// A raw 256-bit key written as hex digits.
    pub const HEX_LEN: usize = 64;
}

/// Subnet scan parameters.
pub mod scan {
    /// First probed host octet; `.0` is the network address.
    pub const FIRST_HOST: u8 = 1;
    /// Last probed host octet; `.255` is the broadcast address.
    pub const LAST_HOST: u8 = 254;
    pub const HOST_COUNT: usize = (LAST_HOST - FIRST_HOST + 1) as usize;
    /// Echo payload size in bytes.
    pub const PAYLOAD_LEN: usize = 32;
}

/// Timeout constants.
pub mod timeouts {
    use std::time::Duration;

    /// Per-probe timeout for host liveness checks.
    const PROBE_TIMEOUT_MS: u64 = 1000;

    /// Maximum time to wait for a connection to activate.
    const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// Maximum time to wait for a device to disconnect.
    const DISCONNECT_TIMEOUT_SECS: u64 = 10;

    /// Time to wait after requesting a Wi-Fi scan before reading results.
    const SCAN_WAIT_SECS: u64 = 2;

    /// Brief delay after state transitions to allow NetworkManager to stabilize.
    const STABILIZATION_DELAY_MS: u64 = 100;

    pub fn probe_timeout() -> Duration {
        Duration::from_millis(PROBE_TIMEOUT_MS)
    }

    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_TIMEOUT_SECS)
    }

    pub fn disconnect_timeout() -> Duration {
        Duration::from_secs(DISCONNECT_TIMEOUT_SECS)
    }

    pub fn scan_wait() -> Duration {
        Duration::from_secs(SCAN_WAIT_SECS)
    }

    pub fn stabilization_delay() -> Duration {
        Duration::from_millis(STABILIZATION_DELAY_MS)
    }
}

/// Signal strength thresholds for bar display
pub mod signal_strength {
    pub const BAR_1_MAX: u8 = 24;
    pub const BAR_2_MIN: u8 = BAR_1_MAX + 1;
    pub const BAR_2_MAX: u8 = 49;
    pub const BAR_3_MIN: u8 = BAR_2_MAX + 1;
    pub const BAR_3_MAX: u8 = 74;
}

/// WiFi frequency constants (MHz)
pub mod frequency {
    pub const BAND_2_4_START: u32 = 2412;
    pub const BAND_2_4_END: u32 = 2472;
    pub const BAND_2_4_CH14: u32 = 2484;
    pub const BAND_5_START: u32 = 5150;
    pub const BAND_5_END: u32 = 5925;
    pub const BAND_6_START: u32 = 5955;
    pub const BAND_6_END: u32 = 7115;
    pub const CHANNEL_SPACING: u32 = 5;
}
