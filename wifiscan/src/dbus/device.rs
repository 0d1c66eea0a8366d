//! NetworkManager Device proxy.

use zbus::{Result, proxy};

/// Proxy for the generic device interface.
///
/// The `StateChanged` signal is exposed as `receive_device_state_changed()`
/// so it does not clash with the change stream of the `state` property.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMDevice {
    /// Device type as a numeric code (2 = Wi-Fi).
    #[zbus(property)]
    fn device_type(&self) -> Result<u32>;

    /// Current device state (30 = disconnected, 100 = activated).
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    /// Asks the device to drop its active connection.
    fn disconnect(&self) -> Result<()>;

    #[zbus(signal, name = "StateChanged")]
    fn device_state_changed(&self, new_state: u32, old_state: u32, reason: u32);
}
