//! Collaborator traits the core drives.
//!
//! The core never touches the radio, sockets or terminal directly. Each of
//! those concerns sits behind one of these traits so workflows can run
//! against NetworkManager and ICMP in production and against scripted fakes
//! in tests.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::Result;
use crate::api::models::{
    AccessPoint, ConnectionOutcome, ConnectionStatus, CredentialRequest, ProbeOutcome,
};

/// Wireless adapter service: scanning the air, association and stored
/// profiles.
///
/// Implementations own the access point data; the core only reads the
/// snapshots returned by [`list_access_points`](Self::list_access_points).
#[async_trait]
pub trait WirelessAdapter: Send + Sync {
    /// Lists the currently visible access points, in no particular order.
    async fn list_access_points(&self) -> Result<Vec<AccessPoint>>;

    /// Disconnects from the current network. Succeeds if already disconnected.
    async fn disconnect(&self) -> Result<()>;

    /// Joins `ap`.
    ///
    /// With `overwrite_profile` false the stored profile is used as-is and
    /// `creds` carries nothing; otherwise any stored profile is replaced by
    /// one built from `creds`. Association failures are reported as
    /// [`ConnectionOutcome::Failure`], not as errors.
    async fn connect(
        &self,
        ap: &AccessPoint,
        creds: &CredentialRequest,
        overwrite_profile: bool,
    ) -> Result<ConnectionOutcome>;

    /// Returns the stored profile of `ap` as an XML document.
    async fn profile_xml(&self, ap: &AccessPoint) -> Result<String>;

    /// Deletes the stored profile of `ap`.
    async fn delete_profile(&self, ap: &AccessPoint) -> Result<()>;

    /// Reports whether the host is associated with any network.
    async fn status(&self) -> Result<ConnectionStatus>;
}

/// Sends one liveness probe (ICMP echo) to one address.
#[async_trait]
pub trait ProbeSender: Send + Sync {
    /// Probes `address`, giving up after `timeout`.
    ///
    /// Every failure mode (no reply, error reply, timeout, send error) is
    /// reported as [`ProbeOutcome::Unreachable`].
    async fn probe(&self, address: Ipv4Addr, timeout: Duration) -> ProbeOutcome;
}

/// Line-based prompt/response source for operator answers.
pub trait InputSource {
    /// Shows `message` and reads one answer line without its line ending.
    ///
    /// Returns `Ok(None)` once input has ended.
    fn prompt(&mut self, message: &str) -> Result<Option<String>>;

    /// Shows an informational message that needs no answer.
    fn notify(&mut self, message: &str) -> Result<()> {
        let _ = message;
        Ok(())
    }
}

/// Source of the addresses bound to the host's network interfaces.
pub trait HostAddresses: Send + Sync {
    fn addresses(&self) -> Result<Vec<IpAddr>>;
}

/// [`InputSource`] over any reader/writer pair.
///
/// Wrap stdin and stdout for an interactive terminal, or an in-memory
/// cursor to replay a scripted session:
///
/// ```rust
/// use std::io::Cursor;
/// use wifiscan::{InputSource, LineInput};
///
/// let mut input = LineInput::new(Cursor::new("y\n"), Vec::new());
/// assert_eq!(input.prompt("Reuse? ").unwrap().as_deref(), Some("y"));
/// assert_eq!(input.prompt("Again? ").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the writer, e.g. to inspect the prompts that were shown.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl LineInput<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompts on stdout and reads answers from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> InputSource for LineInput<R, W> {
    fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        write!(self.writer, "{message}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(Some(trimmed.to_string()))
    }

    fn notify(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{message}")?;
        self.writer.flush()?;
        Ok(())
    }
}
