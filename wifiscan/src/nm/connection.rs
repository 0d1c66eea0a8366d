use futures_timer::Delay;
use log::{debug, info, warn};
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{
    AccessPoint, ConnectionOutcome, ConnectionStatus, CredentialRequest, WifiError,
};
use crate::dbus::{NMAccessPointProxy, NMDeviceProxy, NMProxy, NMWirelessProxy};
use crate::nm::scan::{find_wifi_device, scan_and_resolve_ap, wifi_devices};
use crate::nm::settings::{SavedProfile, build_wifi_settings, delete_connection, find_saved_profile};
use crate::nm::state_wait::{
    is_disconnected, wait_for_connection_activation, wait_for_device_disconnect,
};
use crate::types::constants::timeouts;
use crate::util::utils::decode_ssid_or_empty;

/// Decision on whether to reuse a saved connection or create a fresh one.
#[derive(Debug, PartialEq, Eq)]
enum SavedDecision {
    /// Activate the saved connection at this path.
    UseSaved(OwnedObjectPath),
    /// Delete the saved connection (if any) and add one built from the
    /// negotiated credentials.
    RebuildFresh(Option<OwnedObjectPath>),
}

/// Connects to `ap`.
///
/// The flow:
/// 1. Look up the stored profile and decide whether to reuse it
/// 2. Find the Wi-Fi device and request a scan to resolve the access point
/// 3. Drop the current connection
/// 4. Activate the saved profile or add and activate a fresh one
/// 5. Wait for activation to succeed or fail
///
/// Activation failures and an access point that is out of range come back
/// as [`ConnectionOutcome::Failure`].
pub(crate) async fn connect(
    conn: &Connection,
    ap: &AccessPoint,
    creds: &CredentialRequest,
    overwrite_profile: bool,
) -> Result<ConnectionOutcome> {
    debug!(
        "Connecting to '{}' | security={} overwrite_profile={overwrite_profile}",
        ap.name, ap.security
    );

    let nm = NMProxy::new(conn).await?;

    let saved = find_saved_profile(conn, &ap.name).await?;
    let decision = match decide_saved_connection(saved, overwrite_profile, ap) {
        Ok(decision) => decision,
        Err(e) => return Ok(ConnectionOutcome::failure(e.to_string())),
    };

    let wifi_device = find_wifi_device(conn, &nm).await?;
    let wifi = NMWirelessProxy::builder(conn)
        .path(wifi_device.clone())?
        .build()
        .await?;

    if matches!(decision, SavedDecision::UseSaved(_))
        && current_ssid(conn, &wifi).await.as_deref() == Some(ap.name.as_str())
    {
        debug!("Already connected to '{}', skipping connect()", ap.name);
        return Ok(ConnectionOutcome::Success);
    }

    let specific_object = match scan_and_resolve_ap(conn, &wifi, &ap.name).await {
        Ok(path) => path,
        Err(WifiError::NotFound) => {
            return Ok(ConnectionOutcome::failure(format!(
                "network '{}' is not in range",
                ap.name
            )));
        }
        Err(e) => return Err(e),
    };

    ensure_disconnected(conn, &nm, &wifi_device).await?;

    let activated = match decision {
        SavedDecision::UseSaved(saved) => {
            debug!("Activating saved connection: {}", saved.as_str());
            nm.activate_connection(saved, wifi_device.clone(), specific_object)
                .await
        }
        SavedDecision::RebuildFresh(existing) => {
            if let Some(path) = existing {
                delete_connection(conn, path).await?;
            }
            let settings = build_wifi_settings(ap, creds);
            nm.add_and_activate_connection(settings, wifi_device.clone(), specific_object)
                .await
                .map(|(_, active)| active)
        }
    };

    let active_conn = match activated {
        Ok(path) => path,
        Err(e) => {
            warn!("Activation request for '{}' failed: {e}", ap.name);
            return Ok(ConnectionOutcome::failure(e.to_string()));
        }
    };

    let outcome = wait_for_connection_activation(conn, &active_conn).await?;
    if outcome.is_success() {
        info!("Connection to '{}' activated", ap.name);
    }
    Ok(outcome)
}

/// Disconnects every Wi-Fi device and waits for each to settle.
pub(crate) async fn disconnect(conn: &Connection) -> Result<()> {
    let nm = NMProxy::new(conn).await?;
    let devices = wifi_devices(conn, &nm).await?;
    if devices.is_empty() {
        return Err(WifiError::NoWifiDevice);
    }

    for dev_path in &devices {
        disconnect_wifi_and_wait(conn, dev_path).await?;
    }
    info!("Disconnected");
    Ok(())
}

/// Connected when any Wi-Fi device is associated with an access point.
pub(crate) async fn status(conn: &Connection) -> Result<ConnectionStatus> {
    let nm = NMProxy::new(conn).await?;
    for dev_path in wifi_devices(conn, &nm).await? {
        let wifi = NMWirelessProxy::builder(conn)
            .path(dev_path)?
            .build()
            .await?;
        if wifi.active_access_point().await?.as_str() != "/" {
            return Ok(ConnectionStatus::Connected);
        }
    }
    Ok(ConnectionStatus::NotConnected)
}

/// Disconnects a Wi-Fi device and waits for it to reach disconnected state.
async fn disconnect_wifi_and_wait(conn: &Connection, dev_path: &OwnedObjectPath) -> Result<()> {
    let dev = NMDeviceProxy::builder(conn)
        .path(dev_path.clone())?
        .build()
        .await?;

    if is_disconnected(dev.state().await?) {
        debug!("Device already disconnected");
        return Ok(());
    }

    debug!("Sending disconnect request");
    if let Err(e) = dev.disconnect().await {
        debug!("Disconnect request returned: {e}");
    }

    wait_for_device_disconnect(&dev).await?;
    Delay::new(timeouts::stabilization_delay()).await;
    Ok(())
}

/// Deactivates the current connection, if any, before a new activation.
async fn ensure_disconnected(
    conn: &Connection,
    nm: &NMProxy<'_>,
    wifi_device: &OwnedObjectPath,
) -> Result<()> {
    let wifi = NMWirelessProxy::builder(conn)
        .path(wifi_device.clone())?
        .build()
        .await?;

    if let Some(active) = current_ssid(conn, &wifi).await {
        debug!("Disconnecting from {active}");
        if let Ok(conns) = nm.active_connections().await {
            for conn_path in conns {
                let _ = nm.deactivate_connection(conn_path).await;
            }
        }
        disconnect_wifi_and_wait(conn, wifi_device).await?;
    }
    Ok(())
}

/// SSID of the access point `wifi` is associated with.
async fn current_ssid(conn: &Connection, wifi: &NMWirelessProxy<'_>) -> Option<String> {
    let active_ap = crate::try_log!(
        wifi.active_access_point().await,
        "Failed to read active access point"
    );
    if active_ap.as_str() == "/" {
        return None;
    }
    let ap_builder = crate::try_log!(
        NMAccessPointProxy::builder(conn).path(active_ap),
        "Failed to create access point proxy builder"
    );
    let ap = crate::try_log!(ap_builder.build().await, "Failed to build access point proxy");
    let ssid = crate::try_log!(ap.ssid().await, "Failed to read SSID");
    Some(decode_ssid_or_empty(&ssid).into_owned())
}

/// Decides whether to reuse a saved profile or build a fresh one.
///
/// - Reuse requested and a profile exists: activate it
/// - Overwrite requested: replace any profile with the new credentials
/// - Reuse requested without a profile: only open networks can proceed
fn decide_saved_connection(
    saved: Option<SavedProfile>,
    overwrite_profile: bool,
    ap: &AccessPoint,
) -> Result<SavedDecision> {
    match saved {
        Some(profile) if !overwrite_profile => Ok(SavedDecision::UseSaved(profile.path)),
        Some(profile) => Ok(SavedDecision::RebuildFresh(Some(profile.path))),
        None if !overwrite_profile && ap.requires_password() => {
            Err(WifiError::NoSavedConnection)
        }
        None => Ok(SavedDecision::RebuildFresh(None)),
    }
}
