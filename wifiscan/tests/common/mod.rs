//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wifiscan::{
    AccessPoint, ConnectionOutcome, ConnectionStatus, CredentialRequest, HostAddresses,
    LineInput, ProbeOutcome, ProbeSender, Result, WifiError, WirelessAdapter,
};

/// Adapter calls in the order they were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Disconnect,
    Connect {
        name: String,
        creds: CredentialRequest,
        overwrite: bool,
    },
    Status,
    ProfileXml(String),
    DeleteProfile(String),
}

pub struct FakeAdapter {
    access_points: Vec<AccessPoint>,
    status: Mutex<ConnectionStatus>,
    outcomes: HashMap<String, ConnectionOutcome>,
    fail_disconnect: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeAdapter {
    pub fn new(access_points: Vec<AccessPoint>) -> Self {
        Self {
            access_points,
            status: Mutex::new(ConnectionStatus::NotConnected),
            outcomes: HashMap::new(),
            fail_disconnect: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn connected(self) -> Self {
        *self.status.lock().unwrap() = ConnectionStatus::Connected;
        self
    }

    /// Makes every connect to `name` fail with `reason`.
    pub fn failing(mut self, name: &str, reason: &str) -> Self {
        self.outcomes
            .insert(name.to_string(), ConnectionOutcome::failure(reason));
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connects(&self) -> Vec<(String, CredentialRequest, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Connect {
                    name,
                    creds,
                    overwrite,
                } => Some((name, creds, overwrite)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WirelessAdapter for FakeAdapter {
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>> {
        self.record(Call::List);
        Ok(self.access_points.clone())
    }

    async fn disconnect(&self) -> Result<()> {
        self.record(Call::Disconnect);
        if self.fail_disconnect {
            return Err(WifiError::Stuck("state 70".into()));
        }
        *self.status.lock().unwrap() = ConnectionStatus::NotConnected;
        Ok(())
    }

    async fn connect(
        &self,
        ap: &AccessPoint,
        creds: &CredentialRequest,
        overwrite_profile: bool,
    ) -> Result<ConnectionOutcome> {
        self.record(Call::Connect {
            name: ap.name.clone(),
            creds: creds.clone(),
            overwrite: overwrite_profile,
        });
        let outcome = self
            .outcomes
            .get(&ap.name)
            .cloned()
            .unwrap_or(ConnectionOutcome::Success);
        if outcome.is_success() {
            *self.status.lock().unwrap() = ConnectionStatus::Connected;
        }
        Ok(outcome)
    }

    async fn profile_xml(&self, ap: &AccessPoint) -> Result<String> {
        self.record(Call::ProfileXml(ap.name.clone()));
        if !ap.has_profile {
            return Err(WifiError::NoSavedConnection);
        }
        Ok(format!("<WLANProfile><name>{}</name></WLANProfile>", ap.name))
    }

    async fn delete_profile(&self, ap: &AccessPoint) -> Result<()> {
        self.record(Call::DeleteProfile(ap.name.clone()));
        Ok(())
    }

    async fn status(&self) -> Result<ConnectionStatus> {
        self.record(Call::Status);
        Ok(*self.status.lock().unwrap())
    }
}

/// Shared view of what a [`FakeProbe`] was asked to do.
#[derive(Clone, Default)]
pub struct ProbeLog {
    probed: Arc<Mutex<Vec<Ipv4Addr>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ProbeLog {
    pub fn probed(&self) -> Vec<Ipv4Addr> {
        self.probed.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Answers for a fixed set of addresses, each after a short varying delay.
pub struct FakeProbe {
    up: HashSet<Ipv4Addr>,
    log: ProbeLog,
}

impl FakeProbe {
    pub fn new(up: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            up: up.into_iter().collect(),
            log: ProbeLog::default(),
        }
    }

    pub fn log(&self) -> ProbeLog {
        self.log.clone()
    }
}

#[async_trait]
impl ProbeSender for FakeProbe {
    async fn probe(&self, address: Ipv4Addr, _timeout: Duration) -> ProbeOutcome {
        let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.peak.fetch_max(now, Ordering::SeqCst);

        let delay = u64::from(address.octets()[3] % 7);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.log.probed.lock().unwrap().push(address);
        self.log.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.up.contains(&address) {
            ProbeOutcome::Reachable
        } else {
            ProbeOutcome::Unreachable
        }
    }
}

/// Fixed interface addresses.
pub struct StaticAddresses(pub Vec<IpAddr>);

impl StaticAddresses {
    pub fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self(vec![IpAddr::V4(Ipv4Addr::new(a, b, c, d))])
    }

    pub fn none() -> Self {
        Self(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
    }
}

impl HostAddresses for StaticAddresses {
    fn addresses(&self) -> Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

pub type Script = LineInput<Cursor<String>, Vec<u8>>;

/// Scripted operator answers, one per line.
pub fn script(answers: &str) -> Script {
    LineInput::new(Cursor::new(answers.to_string()), Vec::new())
}

/// Everything that was shown to the operator.
pub fn transcript(input: Script) -> String {
    String::from_utf8(input.into_writer()).unwrap()
}

pub fn host(d: u8) -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, d)
}
