//! Stored connection profiles and connection settings.
//!
//! Profiles live in NetworkManager's `Settings` service. Each one is a
//! nested dictionary with sections such as `connection`, `802-11-wireless`
//! and `802-11-wireless-security`; this module reads the fields needed to
//! match a profile to an access point, builds fresh dictionaries for
//! `AddAndActivateConnection`, and renders profiles as XML.

use log::debug;
use std::collections::HashMap;
use uuid::Uuid;
use zbus::Connection;
use zvariant::{OwnedObjectPath, Value};

use crate::Result;
use crate::api::models::{AccessPoint, CredentialRequest, SecurityKind, WifiError};
use crate::util::utils::decode_ssid_or_empty;

const SETTINGS_PATH: &str = "/org/freedesktop/NetworkManager/Settings";
const SETTINGS_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings";
const CONNECTION_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings.Connection";

/// Settings dictionary in the shape `AddAndActivateConnection` expects.
pub(crate) type SettingsMap = HashMap<&'static str, HashMap<&'static str, Value<'static>>>;

type RawSettings<'a> = HashMap<String, HashMap<String, Value<'a>>>;

/// The parts of a stored Wi-Fi profile this crate cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SavedProfile {
    pub path: OwnedObjectPath,
    pub id: String,
    pub uuid: Option<String>,
    pub ssid: String,
    pub key_mgmt: Option<String>,
    pub autoconnect: bool,
}

impl SavedProfile {
    pub(crate) fn matches(&self, ssid: &str) -> bool {
        self.ssid == ssid || (self.ssid.is_empty() && self.id == ssid)
    }
}

/// Builds a proxy for a NetworkManager object that has no typed proxy.
pub(crate) async fn nm_proxy<'a, P>(
    conn: &'a Connection,
    path: P,
    interface: &'a str,
) -> Result<zbus::Proxy<'a>>
where
    P: TryInto<OwnedObjectPath>,
    P::Error: Into<zbus::Error>,
{
    let owned_path = path.try_into().map_err(Into::into)?;
    Ok(zbus::proxy::Builder::new(conn)
        .destination("org.freedesktop.NetworkManager")?
        .path(owned_path)?
        .interface(interface)?
        .build()
        .await?)
}

/// Lists every stored Wi-Fi profile.
///
/// Profiles whose settings cannot be read (e.g. owned by another user) are
/// skipped.
pub(crate) async fn list_saved_profiles(conn: &Connection) -> Result<Vec<SavedProfile>> {
    let settings = nm_proxy(conn, SETTINGS_PATH, SETTINGS_INTERFACE).await?;
    let reply = settings.call_method("ListConnections", &()).await?;
    let paths: Vec<OwnedObjectPath> = reply.body().deserialize()?;

    let mut profiles = Vec::new();
    for cpath in paths {
        let cproxy = nm_proxy(conn, cpath.clone(), CONNECTION_INTERFACE).await?;
        let msg = match cproxy.call_method("GetSettings", &()).await {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Skipping unreadable connection {}: {e}", cpath.as_str());
                continue;
            }
        };
        let body = msg.body();
        let all: RawSettings<'_> = body.deserialize()?;

        if let Some(profile) = parse_profile(cpath, &all) {
            profiles.push(profile);
        }
    }

    debug!("Found {} stored Wi-Fi profiles", profiles.len());
    Ok(profiles)
}

/// Finds the stored profile for `ssid`, if any.
pub(crate) async fn find_saved_profile(
    conn: &Connection,
    ssid: &str,
) -> Result<Option<SavedProfile>> {
    Ok(list_saved_profiles(conn)
        .await?
        .into_iter()
        .find(|profile| profile.matches(ssid)))
}

/// Deletes the settings object at `path`.
pub(crate) async fn delete_connection(conn: &Connection, path: OwnedObjectPath) -> Result<()> {
    let cproxy = nm_proxy(conn, path.clone(), CONNECTION_INTERFACE).await?;
    cproxy.call_method("Delete", &()).await?;
    debug!("Deleted connection: {}", path.as_str());
    Ok(())
}

/// Deletes every stored profile for `ssid`.
///
/// # Errors
///
/// Returns `WifiError::NoSavedConnection` if none exists.
pub(crate) async fn delete_profiles(conn: &Connection, ssid: &str) -> Result<()> {
    let matching: Vec<SavedProfile> = list_saved_profiles(conn)
        .await?
        .into_iter()
        .filter(|profile| profile.matches(ssid))
        .collect();

    if matching.is_empty() {
        return Err(WifiError::NoSavedConnection);
    }
    for profile in matching {
        delete_connection(conn, profile.path).await?;
    }
    Ok(())
}

fn parse_profile(path: OwnedObjectPath, all: &RawSettings<'_>) -> Option<SavedProfile> {
    let wireless = all.get("802-11-wireless")?;
    let connection = all.get("connection");

    let ssid = match wireless.get("ssid") {
        Some(Value::Array(arr)) => {
            let raw: Vec<u8> = arr
                .iter()
                .filter_map(|v| u8::try_from(v.clone()).ok())
                .collect();
            decode_ssid_or_empty(&raw).into_owned()
        }
        _ => String::new(),
    };

    let autoconnect = match connection.and_then(|c| c.get("autoconnect")) {
        Some(Value::Bool(enabled)) => *enabled,
        _ => true,
    };

    Some(SavedProfile {
        path,
        id: string_field(connection, "id").unwrap_or_else(|| ssid.clone()),
        uuid: string_field(connection, "uuid"),
        ssid,
        key_mgmt: string_field(all.get("802-11-wireless-security"), "key-mgmt"),
        autoconnect,
    })
}

fn string_field(section: Option<&HashMap<String, Value<'_>>>, key: &str) -> Option<String> {
    match section?.get(key)? {
        Value::Str(s) => Some(s.as_str().to_string()),
        _ => None,
    }
}

/// Builds a fresh infrastructure-mode profile for `ap` from `creds`.
pub(crate) fn build_wifi_settings(ap: &AccessPoint, creds: &CredentialRequest) -> SettingsMap {
    let mut settings = SettingsMap::new();

    let mut connection = HashMap::new();
    connection.insert("type", Value::from("802-11-wireless"));
    connection.insert("id", Value::from(ap.name.clone()));
    connection.insert("uuid", Value::from(Uuid::new_v4().to_string()));
    connection.insert("autoconnect", Value::from(true));
    settings.insert("connection", connection);

    let mut wireless = HashMap::new();
    wireless.insert("ssid", Value::from(ap.name.as_bytes().to_vec()));
    wireless.insert("mode", Value::from("infrastructure"));

    let password = creds.password.clone().unwrap_or_default();
    let security = match ap.security {
        SecurityKind::Open => None,
        SecurityKind::Wep => {
            let mut security = HashMap::new();
            security.insert("key-mgmt", Value::from("none"));
            security.insert("auth-alg", Value::from("open"));
            security.insert("wep-tx-keyidx", Value::from(0u32));
            security.insert("wep-key-type", Value::from(1u32));
            security.insert("wep-key0", Value::from(password));
            Some(security)
        }
        SecurityKind::WpaPsk => {
            let mut security = HashMap::new();
            security.insert("key-mgmt", Value::from("wpa-psk"));
            security.insert("auth-alg", Value::from("open"));
            security.insert("psk", Value::from(password));
            security.insert("psk-flags", Value::from(0u32));
            Some(security)
        }
        SecurityKind::WpaEap => {
            let mut security = HashMap::new();
            security.insert("key-mgmt", Value::from("wpa-eap"));
            security.insert("auth-alg", Value::from("open"));

            let mut e1x = HashMap::new();
            e1x.insert("eap", string_array(&["peap"]));
            e1x.insert(
                "identity",
                Value::from(creds.username.clone().unwrap_or_default()),
            );
            e1x.insert("password", Value::from(password));
            e1x.insert("phase2-auth", Value::from("mschapv2"));
            if let Some(domain) = &creds.domain {
                e1x.insert("domain-suffix-match", Value::from(domain.clone()));
            }
            settings.insert("802-1x", e1x);
            Some(security)
        }
    };

    if let Some(security) = security {
        wireless.insert("security", Value::from("802-11-wireless-security"));
        settings.insert("802-11-wireless-security", security);
    }
    settings.insert("802-11-wireless", wireless);

    let mut ipv4 = HashMap::new();
    ipv4.insert("method", Value::from("auto"));
    settings.insert("ipv4", ipv4);

    let mut ipv6 = HashMap::new();
    ipv6.insert("method", Value::from("auto"));
    settings.insert("ipv6", ipv6);

    settings
}

fn string_array(xs: &[&str]) -> Value<'static> {
    let vals: Vec<String> = xs.iter().map(|s| s.to_string()).collect();
    Value::from(vals)
}

/// Renders a stored profile as a WLAN profile XML document.
///
/// Secrets are not part of the stored settings NetworkManager hands out,
/// so no key material is included.
pub(crate) fn profile_xml(profile: &SavedProfile) -> String {
    let (authentication, encryption) = match profile.key_mgmt.as_deref() {
        None => ("open", "none"),
        Some("none") => ("open", "WEP"),
        Some("wpa-psk") => ("WPA2PSK", "AES"),
        Some("sae") => ("WPA3SAE", "AES"),
        Some("wpa-eap") => ("WPA2", "AES"),
        Some(other) => (other, "AES"),
    };
    let mode = if profile.autoconnect { "auto" } else { "manual" };

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\"?>\n");
    xml.push_str("<WLANProfile xmlns=\"http://www.microsoft.com/networking/WLAN/profile/v1\">\n");
    xml.push_str(&format!("\t<name>{}</name>\n", escape_xml(&profile.id)));
    if let Some(uuid) = &profile.uuid {
        xml.push_str(&format!("\t<uuid>{}</uuid>\n", escape_xml(uuid)));
    }
    xml.push_str("\t<SSIDConfig>\n\t\t<SSID>\n");
    xml.push_str(&format!(
        "\t\t\t<name>{}</name>\n",
        escape_xml(&profile.ssid)
    ));
    xml.push_str("\t\t</SSID>\n\t</SSIDConfig>\n");
    xml.push_str("\t<connectionType>ESS</connectionType>\n");
    xml.push_str(&format!("\t<connectionMode>{mode}</connectionMode>\n"));
    xml.push_str("\t<MSM>\n\t\t<security>\n\t\t\t<authEncryption>\n");
    xml.push_str(&format!(
        "\t\t\t\t<authentication>{}</authentication>\n",
        escape_xml(authentication)
    ));
    xml.push_str(&format!(
        "\t\t\t\t<encryption>{encryption}</encryption>\n"
    ));
    xml.push_str("\t\t\t</authEncryption>\n\t\t</security>\n\t</MSM>\n");
    xml.push_str("</WLANProfile>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
