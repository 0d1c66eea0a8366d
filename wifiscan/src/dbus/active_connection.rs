//! NetworkManager Active Connection proxy.

use zbus::{Result, proxy};

/// Proxy for an active (activating or established) connection.
///
/// `StateChanged` carries the new state (2 = activated, 4 = deactivated)
/// and a reason code explaining failures.
#[proxy(
    interface = "org.freedesktop.NetworkManager.Connection.Active",
    default_service = "org.freedesktop.NetworkManager"
)]
pub trait NMActiveConnection {
    #[zbus(property)]
    fn state(&self) -> Result<u32>;

    #[zbus(signal, name = "StateChanged")]
    fn activation_state_changed(&self, state: u32, reason: u32);
}
