//! Wi-Fi device lookup and access point enumeration.

use futures_timer::Delay;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{AccessPoint, SecurityKind, WifiError};
use crate::dbus::{NMAccessPointProxy, NMDeviceProxy, NMProxy, NMWirelessProxy};
use crate::nm::settings::list_saved_profiles;
use crate::types::constants::{device_type, security_flags, timeouts};
use crate::util::utils::{decode_ssid_or_empty, decode_ssid_or_hidden};

/// Returns the paths of every Wi-Fi device.
pub(crate) async fn wifi_devices(conn: &Connection, nm: &NMProxy<'_>) -> Result<Vec<OwnedObjectPath>> {
    let mut found = Vec::new();
    for dp in nm.get_devices().await? {
        let dev = NMDeviceProxy::builder(conn)
            .path(dp.clone())?
            .build()
            .await?;
        if dev.device_type().await? == device_type::WIFI {
            found.push(dp);
        }
    }
    Ok(found)
}

/// Finds the first Wi-Fi device on the system.
///
/// Returns `NoWifiDevice` if there is none.
pub(crate) async fn find_wifi_device(
    conn: &Connection,
    nm: &NMProxy<'_>,
) -> Result<OwnedObjectPath> {
    wifi_devices(conn, nm)
        .await?
        .into_iter()
        .next()
        .ok_or(WifiError::NoWifiDevice)
}

/// Maps NetworkManager capability flags to a security kind.
pub(crate) fn classify_security(flags: u32, wpa: u32, rsn: u32) -> SecurityKind {
    let key_mgmt = wpa | rsn;
    if key_mgmt & security_flags::EAP != 0 {
        SecurityKind::WpaEap
    } else if key_mgmt & (security_flags::PSK | security_flags::SAE) != 0 {
        SecurityKind::WpaPsk
    } else if flags & security_flags::PRIVACY != 0 {
        SecurityKind::Wep
    } else {
        SecurityKind::Open
    }
}

/// Lists the access points visible to every Wi-Fi device.
///
/// Access points broadcasting the same SSID (other bands, mesh nodes) are
/// collapsed into one entry with the strongest signal. Hidden networks are
/// left out since they cannot be joined by name.
pub(crate) async fn list_access_points(conn: &Connection) -> Result<Vec<AccessPoint>> {
    let nm = NMProxy::new(conn).await?;
    let devices = wifi_devices(conn, &nm).await?;
    if devices.is_empty() {
        return Err(WifiError::NoWifiDevice);
    }

    let stored: HashSet<String> = list_saved_profiles(conn)
        .await?
        .into_iter()
        .map(|profile| profile.ssid)
        .collect();

    let mut by_ssid: HashMap<String, AccessPoint> = HashMap::new();

    for dp in devices {
        let wifi = NMWirelessProxy::builder(conn)
            .path(dp.clone())?
            .build()
            .await?;
        let active = wifi.active_access_point().await.ok();

        for ap_path in wifi.access_points().await? {
            let ap = NMAccessPointProxy::builder(conn)
                .path(ap_path.clone())?
                .build()
                .await?;

            let ssid_bytes = ap.ssid().await?;
            if ssid_bytes.is_empty() {
                debug!("Skipping hidden access point {}", ap_path.as_str());
                continue;
            }
            let ssid = decode_ssid_or_hidden(&ssid_bytes).into_owned();

            let security = classify_security(
                ap.flags().await?,
                ap.wpa_flags().await?,
                ap.rsn_flags().await?,
            );
            let mut entry = AccessPoint::new(ssid.clone(), ap.strength().await?, security)
                .with_profile(stored.contains(&ssid))
                .with_connected(active.as_ref() == Some(&ap_path));
            entry.bssid = ap.hw_address().await.ok();
            entry.frequency = ap.frequency().await.ok();

            by_ssid
                .entry(ssid)
                .and_modify(|existing| merge_access_point(existing, &entry))
                .or_insert(entry);
        }
    }

    Ok(by_ssid.into_values().collect())
}

/// Folds `other` into `existing`, keeping the strongest radio's details.
fn merge_access_point(existing: &mut AccessPoint, other: &AccessPoint) {
    let connected = existing.connected || other.connected;
    if other.strength > existing.strength {
        existing.strength = other.strength;
        existing.bssid = other.bssid.clone();
        existing.frequency = other.frequency;
    }
    existing.connected = connected;
}

/// Triggers a scan and resolves the access point object for `ssid`.
pub(crate) async fn scan_and_resolve_ap(
    conn: &Connection,
    wifi: &NMWirelessProxy<'_>,
    ssid: &str,
) -> Result<OwnedObjectPath> {
    match wifi.request_scan(HashMap::new()).await {
        Ok(_) => debug!("Scan requested successfully"),
        Err(e) => warn!("Scan request failed: {e}"),
    }

    Delay::new(timeouts::scan_wait()).await;

    let mut best: Option<(u8, OwnedObjectPath)> = None;
    for ap_path in wifi.access_points().await? {
        let ap = NMAccessPointProxy::builder(conn)
            .path(ap_path.clone())?
            .build()
            .await?;
        if decode_ssid_or_empty(&ap.ssid().await?) != ssid {
            continue;
        }
        let strength = ap.strength().await.unwrap_or(0);
        if best.as_ref().is_none_or(|(s, _)| strength > *s) {
            best = Some((strength, ap_path));
        }
    }

    let (_, path) = best.ok_or(WifiError::NotFound)?;
    debug!("Matched target SSID '{ssid}' at {}", path.as_str());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_security_flags() {
        assert_eq!(classify_security(0, 0, 0), SecurityKind::Open);
        assert_eq!(classify_security(security_flags::PRIVACY, 0, 0), SecurityKind::Wep);
        assert_eq!(
            classify_security(security_flags::PRIVACY, 0, security_flags::PSK),
            SecurityKind::WpaPsk
        );
        assert_eq!(classify_security(0, 0, security_flags::SAE), SecurityKind::WpaPsk);
        assert_eq!(
            classify_security(security_flags::PRIVACY, security_flags::EAP, 0),
            SecurityKind::WpaEap
        );
    }

    #[test]
    fn merge_keeps_strongest_radio() {
        let mut existing = AccessPoint::new("Home", 40, SecurityKind::WpaPsk).with_connected(true);
        existing.frequency = Some(2437);
        let mut other = AccessPoint::new("Home", 75, SecurityKind::WpaPsk);
        other.frequency = Some(5180);

        merge_access_point(&mut existing, &other);

        assert_eq!(existing.strength, 75);
        assert_eq!(existing.frequency, Some(5180));
        assert!(existing.connected);
    }
}
