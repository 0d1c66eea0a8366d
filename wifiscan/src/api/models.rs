use bitflags::bitflags;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt::{self, Debug, Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{self, scan};
use crate::util::utils::{bars_from_strength, channel_from_freq};

bitflags! {
    /// Credential fields an access point's security type asks for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SecurityFlags: u8 {
        /// A password (PSK, WEP key or EAP password) must be supplied.
        const REQUIRES_PASSWORD = 0b0000_0001;
        /// An identity must be supplied alongside the password.
        const REQUIRES_USERNAME = 0b0000_0010;
        /// A domain may optionally be supplied.
        const SUPPORTS_DOMAIN = 0b0000_0100;
    }
}

/// Security type advertised by an access point.
///
/// Determines both the credential fields the negotiator asks for and the
/// format rule a password must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityKind {
    /// Open network (no authentication)
    Open,
    /// Legacy WEP static key
    Wep,
    /// WPA/WPA2 personal (pre-shared key)
    WpaPsk,
    /// WPA/WPA2 enterprise (802.1X)
    WpaEap,
}

impl SecurityKind {
    /// Returns the credential capability set for this security type.
    pub fn flags(self) -> SecurityFlags {
        match self {
            Self::Open => SecurityFlags::empty(),
            Self::Wep | Self::WpaPsk => SecurityFlags::REQUIRES_PASSWORD,
            Self::WpaEap => {
                SecurityFlags::REQUIRES_PASSWORD
                    | SecurityFlags::REQUIRES_USERNAME
                    | SecurityFlags::SUPPORTS_DOMAIN
            }
        }
    }

    /// Checks a password against the format rule of this security type.
    ///
    /// - WEP: 5 or 13 ASCII characters, or 10 or 26 hex digits
    /// - WPA-PSK: 8 to 63 printable ASCII characters, or 64 hex digits
    /// - WPA-EAP: any non-empty password
    /// - Open: always valid (never asked for)
    pub fn is_valid_password(self, password: &str) -> bool {
        let len = password.len();
        match self {
            Self::Open => true,
            Self::Wep => match len {
                5 | 13 => password.is_ascii(),
                10 | 26 => is_hex(password),
                _ => false,
            },
            Self::WpaPsk => {
                let printable = password.chars().all(|c| (' '..='~').contains(&c));
                ((constants::psk::MIN_LEN..=constants::psk::MAX_LEN).contains(&len) && printable)
                    || (len == constants::psk::HEX_LEN && is_hex(password))
            }
            Self::WpaEap => !password.is_empty(),
        }
    }
}

impl Display for SecurityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Wep => write!(f, "WEP"),
            Self::WpaPsk => write!(f, "WPA-PSK"),
            Self::WpaEap => write!(f, "WPA-EAP"),
        }
    }
}

fn is_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

/// A visible wireless access point.
///
/// Snapshots are produced by the [`WirelessAdapter`](crate::WirelessAdapter)
/// on every listing; signal strength and connection state go stale quickly,
/// so callers should list again rather than hold on to old values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Network name (SSID)
    pub name: String,
    /// Signal strength (0-100)
    pub strength: u8,
    /// Whether this host is currently associated with the access point
    pub connected: bool,
    /// Advertised security type
    pub security: SecurityKind,
    /// Whether a connection profile is already stored for this network
    pub has_profile: bool,
    /// Access point MAC address (BSSID)
    pub bssid: Option<String>,
    /// Frequency in MHz
    pub frequency: Option<u32>,
}

impl AccessPoint {
    /// Creates a disconnected access point with no stored profile.
    ///
    /// Strength values above 100 are clamped.
    pub fn new(name: impl Into<String>, strength: u8, security: SecurityKind) -> Self {
        Self {
            name: name.into(),
            strength: strength.min(100),
            connected: false,
            security,
            has_profile: false,
            bssid: None,
            frequency: None,
        }
    }

    /// Marks whether a profile is stored for this network.
    #[must_use]
    pub fn with_profile(mut self, has_profile: bool) -> Self {
        self.has_profile = has_profile;
        self
    }

    /// Marks whether this host is connected to the access point.
    #[must_use]
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Returns the credential capability set of this access point.
    pub fn capabilities(&self) -> SecurityFlags {
        self.security.flags()
    }

    /// Returns whether joining this network needs a password.
    pub fn requires_password(&self) -> bool {
        self.capabilities()
            .contains(SecurityFlags::REQUIRES_PASSWORD)
    }

    /// Checks a password against this access point's format rule.
    pub fn is_valid_password(&self, password: &str) -> bool {
        self.security.is_valid_password(password)
    }
}

impl Display for AccessPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "SSID: {}", self.name)?;
        writeln!(
            f,
            "Signal: {}% {}",
            self.strength,
            bars_from_strength(self.strength)
        )?;
        writeln!(f, "Security: {}", self.security)?;
        if let Some(freq) = self.frequency {
            match channel_from_freq(freq) {
                Some(ch) => writeln!(f, "Frequency: {freq} MHz (channel {ch})")?,
                None => writeln!(f, "Frequency: {freq} MHz")?,
            }
        }
        if let Some(bssid) = &self.bssid {
            writeln!(f, "BSSID: {bssid}")?;
        }
        writeln!(f, "Connected: {}", self.connected)?;
        write!(f, "Profile stored: {}", self.has_profile)
    }
}

/// Access points ordered by descending signal strength.
///
/// Indices handed to [`get`](Self::get) refer to this order, which is the
/// order the listing is shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessPointList {
    items: Vec<AccessPoint>,
}

impl AccessPointList {
    /// Builds a list, sorting strongest first. Ties keep their input order.
    pub fn new(mut access_points: Vec<AccessPoint>) -> Self {
        access_points.sort_by(|a, b| b.strength.cmp(&a.strength));
        Self {
            items: access_points,
        }
    }

    /// Returns the access point at `index`.
    ///
    /// # Errors
    ///
    /// Returns `WifiError::IndexOutOfBounds` if the list is empty or
    /// `index` is not in `[0, len)`.
    pub fn get(&self, index: usize) -> crate::Result<&AccessPoint> {
        self.items.get(index).ok_or(WifiError::IndexOutOfBounds {
            index,
            len: self.items.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccessPoint> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[AccessPoint] {
        &self.items
    }
}

impl From<Vec<AccessPoint>> for AccessPointList {
    fn from(access_points: Vec<AccessPoint>) -> Self {
        Self::new(access_points)
    }
}

impl<'a> IntoIterator for &'a AccessPointList {
    type Item = &'a AccessPoint;
    type IntoIter = std::slice::Iter<'a, AccessPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Display for AccessPointList {
    /// One line per access point, prefixed with its selection index.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, ap) in self.items.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{index}. {} {}% {} Connected: {}",
                ap.name, ap.strength, ap.security, ap.connected
            )?;
        }
        Ok(())
    }
}

/// Credentials negotiated for one access point selection.
///
/// When `reuse_existing_profile` is false and the access point requires a
/// password, `password` must be set before connecting; see
/// [`satisfies`](Self::satisfies).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialRequest {
    /// Identity for enterprise networks
    pub username: Option<String>,
    /// Password or pre-shared key
    pub password: Option<String>,
    /// Domain for enterprise networks
    pub domain: Option<String>,
    /// Connect with the stored profile instead of these credentials
    pub reuse_existing_profile: bool,
}

impl CredentialRequest {
    /// A request that connects using whatever profile is already stored.
    pub fn reuse_profile() -> Self {
        Self {
            reuse_existing_profile: true,
            ..Self::default()
        }
    }

    /// Whether connecting should replace any stored profile.
    pub fn overwrite_profile(&self) -> bool {
        !self.reuse_existing_profile
    }

    /// Checks that this request carries everything `ap` needs.
    pub fn satisfies(&self, ap: &AccessPoint) -> bool {
        self.reuse_existing_profile || !ap.requires_password() || self.password.is_some()
    }
}

impl Debug for CredentialRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("reuse_existing_profile", &self.reuse_existing_profile)
            .finish()
    }
}

/// The first three octets of an IPv4 `/24` network.
///
/// Displays as the `"a.b.c."` prefix to which host octets are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    octets: [u8; 3],
}

impl Subnet {
    /// Parses a normalized `"a.b.c."` prefix.
    ///
    /// # Errors
    ///
    /// Returns `WifiError::InvalidSubnet` unless the input is exactly three
    /// decimal octets each followed by a dot.
    pub fn parse(prefix: &str) -> crate::Result<Self> {
        let invalid = || WifiError::InvalidSubnet(prefix.to_string());

        let body = prefix.strip_suffix('.').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let mut octets = [0u8; 3];
        for (slot, part) in octets.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self { octets })
    }

    /// The `/24` network containing `addr`.
    pub fn from_ipv4(addr: Ipv4Addr) -> Self {
        let [a, b, c, _] = addr.octets();
        Self { octets: [a, b, c] }
    }

    pub fn octets(&self) -> [u8; 3] {
        self.octets
    }

    /// The address formed by appending `host` to this prefix.
    pub fn host(&self, host: u8) -> Ipv4Addr {
        let [a, b, c] = self.octets;
        Ipv4Addr::new(a, b, c, host)
    }

    /// Every probeable host address: octets 1 through 254.
    ///
    /// The network (`.0`) and broadcast (`.255`) addresses are excluded.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> {
        let subnet = *self;
        (scan::FIRST_HOST..=scan::LAST_HOST).map(move |h| subnet.host(h))
    }

    /// Whether `addr` lies in this `/24`.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        Self::from_ipv4(addr) == *self
    }
}

impl Display for Subnet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.octets;
        write!(f, "{a}.{b}.{c}.")
    }
}

/// Accepts the `"a.b.c."` prefix form, a full IPv4 address, or an address
/// in CIDR notation (`"192.168.1.20/24"`); the last two keep only the first
/// three octets.
impl FromStr for Subnet {
    type Err = WifiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.ends_with('.') {
            return Self::parse(s);
        }

        let addr = s.split_once('/').map_or(s, |(addr, _)| addr);
        addr.parse::<Ipv4Addr>()
            .map(Self::from_ipv4)
            .map_err(|_| WifiError::InvalidSubnet(s.to_string()))
    }
}

impl Serialize for Subnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The host answered within the timeout.
    Reachable,
    /// No answer, an error reply, or the timeout expired.
    Unreachable,
}

impl ProbeOutcome {
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Hosts that answered during one subnet scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// The subnet that was scanned
    pub subnet: Subnet,
    /// Reachable hosts in the order their probes completed
    pub reachable: Vec<Ipv4Addr>,
    /// Number of probes that reported back
    pub probed: usize,
}

impl ScanResult {
    /// Number of reachable hosts.
    pub fn count(&self) -> usize {
        self.reachable.len()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.reachable.contains(&addr)
    }

    /// The reachable hosts as an unordered set.
    ///
    /// Completion order varies between runs, so comparisons should use this.
    pub fn reachable_set(&self) -> HashSet<Ipv4Addr> {
        self.reachable.iter().copied().collect()
    }

    /// Whether every host address of the subnet reported back.
    pub fn is_complete(&self) -> bool {
        self.probed == scan::HOST_COUNT
    }
}

/// Tuning for subnet scans.
///
/// The per-probe timeout is fixed; only concurrency can be adjusted.
///
/// # Examples
///
/// ```rust
/// use wifiscan::ScanConfig;
///
/// // Launch every probe at once (default)
/// let config = ScanConfig::default();
///
/// // At most 32 probes in flight
/// let bounded = ScanConfig::new().with_max_in_flight(32);
/// assert_eq!(bounded.max_in_flight, Some(32));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound on concurrently running probes (`None` = unbounded)
    pub max_in_flight: Option<usize>,
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of probes in flight. Zero is treated as one.
    #[must_use]
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit.max(1));
        self
    }

    /// Timeout applied to every individual probe.
    pub fn probe_timeout(&self) -> Duration {
        constants::timeouts::probe_timeout()
    }
}

/// Whether the host is currently associated with a wireless network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionStatus {
    Connected,
    NotConnected,
}

impl ConnectionStatus {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl Display for ConnectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

/// Result of asking the adapter to join a network.
///
/// A failed association is an expected outcome, not an error; callers
/// decide whether to prompt again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConnectionOutcome {
    Success,
    Failure { reason: String },
}

impl ConnectionOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl Display for ConnectionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure { reason } => write!(f, "failure ({reason})"),
        }
    }
}

/// What the auto-connect workflow did with one access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutoConnectStep {
    /// Connected with the stored profile and scanned the subnet.
    Scanned { name: String, result: ScanResult },
    /// No stored profile; left alone.
    Skipped { name: String },
    /// The adapter could not join the network.
    ConnectFailed { name: String, reason: String },
    /// Joined, but the subnet could not be scanned.
    ScanFailed { name: String, reason: String },
}

impl AutoConnectStep {
    pub fn name(&self) -> &str {
        match self {
            Self::Scanned { name, .. }
            | Self::Skipped { name }
            | Self::ConnectFailed { name, .. }
            | Self::ScanFailed { name, .. } => name,
        }
    }
}

/// Per-access-point record of an auto-connect run, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoConnectReport {
    pub steps: Vec<AutoConnectStep>,
}

impl AutoConnectReport {
    pub(crate) fn push(&mut self, step: AutoConnectStep) {
        self.steps.push(step);
    }

    /// Scan results of every network that was joined and scanned.
    pub fn scans(&self) -> impl Iterator<Item = (&str, &ScanResult)> {
        self.steps.iter().filter_map(|step| match step {
            AutoConnectStep::Scanned { name, result } => Some((name.as_str(), result)),
            _ => None,
        })
    }

    /// Names of networks skipped for lack of a stored profile.
    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|step| match step {
            AutoConnectStep::Skipped { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Number of networks that failed to connect or scan.
    pub fn failures(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| {
                matches!(
                    step,
                    AutoConnectStep::ConnectFailed { .. } | AutoConnectStep::ScanFailed { .. }
                )
            })
            .count()
    }
}

/// Error type for wifiscan operations.
///
/// Input errors abort the current operation and return control to the
/// caller; see [`is_input_error`](Self::is_input_error).
#[derive(Debug, Error)]
pub enum WifiError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// Reading from or writing to the operator's terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The selected index is not in the listed range (or the list is empty).
    #[error("index {index} out of bounds ({len} access points listed)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The selection was not a number.
    #[error("invalid selection: {0:?}")]
    InvalidSelection(String),

    /// Input ended while a required answer was being prompted for.
    #[error("input ended before a required answer was given")]
    EndOfInput,

    /// A credential request was missing a field the access point requires.
    #[error("missing credentials for network '{0}'")]
    MissingCredentials(String),

    /// No IPv4 address is bound to any local interface.
    #[error("no network adapter with an IPv4 address in the system")]
    NetworkUnavailable,

    /// A subnet string was not in "a.b.c." form.
    #[error("invalid subnet: {0:?}")]
    InvalidSubnet(String),

    /// The probe mechanism could not be set up (e.g. no ICMP socket permission).
    #[error("probe sender unavailable: {0}")]
    ProbeUnavailable(String),

    /// Discovery could not establish a connection to scan from.
    #[error("not connected: {reason}")]
    NotConnected { reason: String },

    /// No Wi-Fi device was found on the system.
    #[error("no Wi-Fi device found")]
    NoWifiDevice,

    /// The requested network is not visible.
    #[error("network not found")]
    NotFound,

    /// No saved profile exists for the requested network.
    #[error("no saved connection for network")]
    NoSavedConnection,

    /// Waiting for a state change timed out.
    #[error("operation timed out")]
    Timeout,

    /// A device is stuck in an unexpected state.
    #[error("device stuck in state: {0}")]
    Stuck(String),
}

impl WifiError {
    /// Whether this error came from operator input (bad index, no answer).
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfBounds { .. }
                | Self::InvalidSelection(_)
                | Self::EndOfInput
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_kind_flags() {
        assert!(SecurityKind::Open.flags().is_empty());
        assert_eq!(SecurityKind::WpaPsk.flags(), SecurityFlags::REQUIRES_PASSWORD);
        assert_eq!(SecurityKind::Wep.flags(), SecurityFlags::REQUIRES_PASSWORD);
        assert!(SecurityKind::WpaEap.flags().contains(
            SecurityFlags::REQUIRES_USERNAME | SecurityFlags::SUPPORTS_DOMAIN
        ));
    }

    #[test]
    fn wpa_psk_password_length_bounds() {
        let k = SecurityKind::WpaPsk;
        assert!(!k.is_valid_password("short"));
        assert!(!k.is_valid_password("1234567"));
        assert!(k.is_valid_password("password"));
        assert!(k.is_valid_password(&"a".repeat(63)));
        assert!(!k.is_valid_password(&"z".repeat(64)));
        assert!(k.is_valid_password(&"ab".repeat(32)));
        assert!(!k.is_valid_password("pass\u{7f}word"));
    }

    #[test]
    fn wep_key_forms() {
        let k = SecurityKind::Wep;
        assert!(k.is_valid_password("abcde"));
        assert!(k.is_valid_password("abcdefghijklm"));
        assert!(k.is_valid_password("0123456789"));
        assert!(!k.is_valid_password("0123456789xyz0123456789xy"));
        assert!(k.is_valid_password("0123456789abcdef0123456789"));
        assert!(!k.is_valid_password("abcd"));
        assert!(!k.is_valid_password("zzzzzzzzzz"));
    }

    #[test]
    fn eap_and_open_passwords() {
        assert!(SecurityKind::WpaEap.is_valid_password("x"));
        assert!(!SecurityKind::WpaEap.is_valid_password(""));
        assert!(SecurityKind::Open.is_valid_password(""));
    }

    #[test]
    fn access_point_strength_is_clamped() {
        let ap = AccessPoint::new("x", 250, SecurityKind::Open);
        assert_eq!(ap.strength, 100);
    }

    #[test]
    fn access_point_display_includes_channel() {
        let mut ap = AccessPoint::new("Cafe", 80, SecurityKind::WpaPsk).with_profile(true);
        ap.frequency = Some(2437);
        ap.bssid = Some("00:11:22:33:44:55".into());
        let text = ap.to_string();
        assert!(text.contains("SSID: Cafe"));
        assert!(text.contains("channel 6"));
        assert!(text.contains("BSSID: 00:11:22:33:44:55"));
        assert!(text.contains("Profile stored: true"));
    }

    #[test]
    fn list_sorts_by_descending_strength() {
        let list = AccessPointList::new(vec![
            AccessPoint::new("weak", 10, SecurityKind::Open),
            AccessPoint::new("strong", 90, SecurityKind::Open),
            AccessPoint::new("mid", 50, SecurityKind::Open),
        ]);
        let names: Vec<&str> = list.iter().map(|ap| ap.name.as_str()).collect();
        assert_eq!(names, ["strong", "mid", "weak"]);
    }

    #[test]
    fn list_get_rejects_out_of_range() {
        let list = AccessPointList::new(vec![
            AccessPoint::new("a", 10, SecurityKind::Open),
            AccessPoint::new("b", 20, SecurityKind::Open),
            AccessPoint::new("c", 30, SecurityKind::Open),
        ]);
        assert!(list.get(2).is_ok());
        assert!(matches!(
            list.get(3),
            Err(WifiError::IndexOutOfBounds { index: 3, len: 3 })
        ));
        assert!(matches!(
            AccessPointList::default().get(0),
            Err(WifiError::IndexOutOfBounds { index: 0, len: 0 })
        ));
    }

    #[test]
    fn list_display_numbers_entries_in_order() {
        let list = AccessPointList::new(vec![
            AccessPoint::new("Guest", 40, SecurityKind::Open),
            AccessPoint::new("Home", 80, SecurityKind::WpaPsk).with_connected(true),
        ]);
        assert_eq!(
            list.to_string(),
            "0. Home 80% WPA-PSK Connected: true\n1. Guest 40% Open Connected: false"
        );
    }

    #[test]
    fn credential_request_invariant() {
        let ap = AccessPoint::new("secure", 50, SecurityKind::WpaPsk);
        assert!(!CredentialRequest::default().satisfies(&ap));
        assert!(CredentialRequest::reuse_profile().satisfies(&ap));
        let creds = CredentialRequest {
            password: Some("password".into()),
            ..CredentialRequest::default()
        };
        assert!(creds.satisfies(&ap));
        assert!(creds.overwrite_profile());

        let open = AccessPoint::new("open", 50, SecurityKind::Open);
        assert!(CredentialRequest::default().satisfies(&open));
    }

    #[test]
    fn credential_request_debug_hides_password() {
        let creds = CredentialRequest {
            password: Some("hunter22".into()),
            ..CredentialRequest::default()
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("hunter22"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn subnet_parse_accepts_prefix() {
        let s = Subnet::parse("10.0.0.").unwrap();
        assert_eq!(s.to_string(), "10.0.0.");
        assert_eq!(s.host(50), Ipv4Addr::new(10, 0, 0, 50));
    }

    #[test]
    fn subnet_parse_rejects_malformed() {
        for bad in ["10.0.0", "10.0.0.1.", "10..0.", "256.0.0.", "a.b.c.", "10.0.", "+1.0.0."] {
            assert!(
                matches!(Subnet::parse(bad), Err(WifiError::InvalidSubnet(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn subnet_from_str_accepts_addresses() {
        let a: Subnet = "192.168.1.20".parse().unwrap();
        let b: Subnet = "192.168.1.20/24".parse().unwrap();
        let c: Subnet = "192.168.1.".parse().unwrap();
        assert_eq!(a, c);
        assert_eq!(b, c);
        assert!("not-an-ip".parse::<Subnet>().is_err());
    }

    #[test]
    fn subnet_hosts_cover_usable_range() {
        let s = Subnet::parse("172.16.5.").unwrap();
        let hosts: Vec<Ipv4Addr> = s.hosts().collect();
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts.first(), Some(&Ipv4Addr::new(172, 16, 5, 1)));
        assert_eq!(hosts.last(), Some(&Ipv4Addr::new(172, 16, 5, 254)));
        assert!(s.contains(Ipv4Addr::new(172, 16, 5, 99)));
        assert!(!s.contains(Ipv4Addr::new(172, 16, 6, 99)));
    }

    #[test]
    fn scan_result_set_and_completeness() {
        let subnet = Subnet::parse("10.0.0.").unwrap();
        let result = ScanResult {
            subnet,
            reachable: vec![subnet.host(50), subnet.host(1)],
            probed: 254,
        };
        assert_eq!(result.count(), 2);
        assert!(result.is_complete());
        assert!(result.reachable_set().contains(&subnet.host(1)));
    }

    #[test]
    fn scan_config_zero_limit_becomes_one() {
        assert_eq!(ScanConfig::new().with_max_in_flight(0).max_in_flight, Some(1));
        assert_eq!(ScanConfig::new().probe_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn input_error_classification() {
        assert!(WifiError::EndOfInput.is_input_error());
        assert!(WifiError::IndexOutOfBounds { index: 5, len: 3 }.is_input_error());
        assert!(!WifiError::NetworkUnavailable.is_input_error());
    }

    #[test]
    fn auto_connect_report_queries() {
        let subnet = Subnet::parse("10.0.0.").unwrap();
        let mut report = AutoConnectReport::default();
        report.push(AutoConnectStep::Scanned {
            name: "ap1".into(),
            result: ScanResult {
                subnet,
                reachable: vec![],
                probed: 254,
            },
        });
        report.push(AutoConnectStep::Skipped { name: "ap2".into() });
        report.push(AutoConnectStep::ConnectFailed {
            name: "ap3".into(),
            reason: "auth".into(),
        });
        assert_eq!(report.scans().count(), 1);
        assert_eq!(report.skipped().collect::<Vec<_>>(), ["ap2"]);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.steps[2].name(), "ap3");
    }
}
