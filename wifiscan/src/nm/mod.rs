//! NetworkManager-backed [`WirelessAdapter`].
//!
//! Talks to NetworkManager over the system D-Bus. Stored profiles are
//! NetworkManager connection profiles keyed by SSID.

mod connection;
mod scan;
mod settings;
mod state_wait;

use async_trait::async_trait;
use log::debug;
use zbus::Connection;

use crate::Result;
use crate::api::adapters::WirelessAdapter;
use crate::api::models::{
    AccessPoint, ConnectionOutcome, ConnectionStatus, CredentialRequest, WifiError,
};
use crate::dbus::NMProxy;

/// Wireless adapter backed by NetworkManager.
///
/// ```no_run
/// use wifiscan::WirelessAdapter;
/// use wifiscan::nm::NmAdapter;
///
/// # async fn example() -> wifiscan::Result<()> {
/// let adapter = NmAdapter::new().await?;
/// if !adapter.has_wifi_device().await? {
///     eprintln!("no Wi-Fi adapter found");
/// }
/// println!("{}", adapter.status().await?);
/// # Ok(())
/// # }
/// ```
///
/// `NmAdapter` is `Clone`; clones share the same D-Bus connection.
#[derive(Debug, Clone)]
pub struct NmAdapter {
    conn: Connection,
}

impl NmAdapter {
    /// Connects to the system D-Bus.
    pub async fn new() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn })
    }

    /// Uses an existing D-Bus connection.
    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Whether NetworkManager manages at least one Wi-Fi device.
    pub async fn has_wifi_device(&self) -> Result<bool> {
        let nm = NMProxy::new(&self.conn).await?;
        Ok(!scan::wifi_devices(&self.conn, &nm).await?.is_empty())
    }
}

#[async_trait]
impl WirelessAdapter for NmAdapter {
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>> {
        scan::list_access_points(&self.conn).await
    }

    async fn disconnect(&self) -> Result<()> {
        connection::disconnect(&self.conn).await
    }

    async fn connect(
        &self,
        ap: &AccessPoint,
        creds: &CredentialRequest,
        overwrite_profile: bool,
    ) -> Result<ConnectionOutcome> {
        connection::connect(&self.conn, ap, creds, overwrite_profile).await
    }

    async fn profile_xml(&self, ap: &AccessPoint) -> Result<String> {
        let profile = settings::find_saved_profile(&self.conn, &ap.name)
            .await?
            .ok_or(WifiError::NoSavedConnection)?;
        debug!("Rendering profile {} for '{}'", profile.path.as_str(), ap.name);
        Ok(settings::profile_xml(&profile))
    }

    async fn delete_profile(&self, ap: &AccessPoint) -> Result<()> {
        settings::delete_profiles(&self.conn, &ap.name).await
    }

    async fn status(&self) -> Result<ConnectionStatus> {
        connection::status(&self.conn).await
    }
}
