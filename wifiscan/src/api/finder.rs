use std::sync::Arc;

use crate::Result;
use crate::api::adapters::{HostAddresses, InputSource, ProbeSender, WirelessAdapter};
use crate::api::models::{
    AccessPoint, AccessPointList, AutoConnectReport, ConnectionOutcome, ConnectionStatus,
    CredentialRequest, ScanConfig, ScanResult, Subnet,
};
use crate::core::scanner::SubnetScanner;
use crate::core::subnet::{SystemAddresses, local_subnet};
use crate::core::{discovery, negotiator, orchestrator};

/// Entry point for connecting to Wi-Fi networks and scanning local subnets.
///
/// A `Finder` owns a [`WirelessAdapter`] for radio access and a
/// [`ProbeSender`] for liveness probes. Interactive operations read the
/// operator's answers from an [`InputSource`] passed per call.
///
/// # Creating an Instance
///
/// ```no_run
/// use wifiscan::Finder;
/// use wifiscan::nm::NmAdapter;
/// use wifiscan::probe::IcmpProbeSender;
///
/// # async fn example() -> wifiscan::Result<()> {
/// let finder = Finder::new(NmAdapter::new().await?, IcmpProbeSender::new()?);
/// # Ok(())
/// # }
/// ```
///
/// # Examples
///
/// ## Interactive Discovery
///
/// ```no_run
/// use wifiscan::{Finder, LineInput};
/// use wifiscan::nm::NmAdapter;
/// use wifiscan::probe::IcmpProbeSender;
///
/// # async fn example() -> wifiscan::Result<()> {
/// let finder = Finder::new(NmAdapter::new().await?, IcmpProbeSender::new()?);
/// let mut input = LineInput::stdio();
///
/// let result = finder.discover(&mut input).await?;
/// for host in &result.reachable {
///     println!("{host}");
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Auto-Connect
///
/// ```no_run
/// use wifiscan::Finder;
/// use wifiscan::nm::NmAdapter;
/// use wifiscan::probe::IcmpProbeSender;
///
/// # async fn example() -> wifiscan::Result<()> {
/// let finder = Finder::new(NmAdapter::new().await?, IcmpProbeSender::new()?);
///
/// let report = finder.connect_all().await?;
/// for (name, result) in report.scans() {
///     println!("{name}: {} hosts", result.count());
/// }
/// # Ok(())
/// # }
/// ```
pub struct Finder<A, P> {
    adapter: A,
    scanner: SubnetScanner<P>,
    hosts: Box<dyn HostAddresses>,
}

impl<A: WirelessAdapter, P: ProbeSender + 'static> Finder<A, P> {
    /// Creates a finder that resolves the local subnet from the system's
    /// interface addresses.
    pub fn new(adapter: A, probe: P) -> Self {
        Self {
            adapter,
            scanner: SubnetScanner::new(Arc::new(probe), ScanConfig::default()),
            hosts: Box::new(SystemAddresses),
        }
    }

    /// Replaces the scan tuning.
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.scanner = self.scanner.reconfigure(config);
        self
    }

    /// Replaces the source of local interface addresses.
    #[must_use]
    pub fn with_host_addresses(mut self, hosts: impl HostAddresses + 'static) -> Self {
        self.hosts = Box::new(hosts);
        self
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn scan_config(&self) -> ScanConfig {
        self.scanner.config()
    }

    /// Lists visible access points, strongest first.
    pub async fn list_access_points(&self) -> Result<AccessPointList> {
        orchestrator::list_access_points(&self.adapter).await
    }

    /// Reports whether the host is associated with a network.
    pub async fn status(&self) -> Result<ConnectionStatus> {
        self.adapter.status().await
    }

    /// Disconnects from the current network.
    pub async fn disconnect(&self) -> Result<()> {
        self.adapter.disconnect().await
    }

    /// Prompts with `message` for an index into `list`.
    ///
    /// # Errors
    ///
    /// `WifiError::IndexOutOfBounds` for an empty list or an index outside
    /// it, `WifiError::InvalidSelection` for a non-numeric answer.
    pub fn select<'a>(
        &self,
        list: &'a AccessPointList,
        input: &mut dyn InputSource,
        message: &str,
    ) -> Result<&'a AccessPoint> {
        orchestrator::select(list, input, message)
    }

    /// Negotiates the credentials for `ap` with the operator.
    pub fn negotiate(
        &self,
        ap: &AccessPoint,
        input: &mut dyn InputSource,
    ) -> Result<CredentialRequest> {
        negotiator::negotiate(ap, input)
    }

    /// Connects to `ap` with negotiated credentials.
    ///
    /// # Errors
    ///
    /// `WifiError::MissingCredentials` if `creds` lacks a required password;
    /// the adapter is not contacted in that case.
    pub async fn connect(
        &self,
        ap: &AccessPoint,
        creds: &CredentialRequest,
    ) -> Result<ConnectionOutcome> {
        orchestrator::connect(&self.adapter, ap, creds).await
    }

    /// Lists, selects, negotiates and connects in one step.
    pub async fn connect_interactive(
        &self,
        input: &mut dyn InputSource,
    ) -> Result<ConnectionOutcome> {
        orchestrator::connect_interactive(&self.adapter, input).await
    }

    /// Joins every network with a stored profile, scanning after each.
    pub async fn connect_all(&self) -> Result<AutoConnectReport> {
        orchestrator::connect_all(&self.adapter, &self.scanner, self.hosts.as_ref()).await
    }

    /// Ensures a connection (asking the operator when already connected)
    /// and scans its subnet.
    pub async fn discover(&self, input: &mut dyn InputSource) -> Result<ScanResult> {
        let status = self.adapter.status().await?;
        self.discover_from(status, input).await
    }

    /// Like [`discover`](Self::discover) with a known connection status.
    pub async fn discover_from(
        &self,
        status: ConnectionStatus,
        input: &mut dyn InputSource,
    ) -> Result<ScanResult> {
        discovery::discover(
            status,
            &self.adapter,
            &self.scanner,
            self.hosts.as_ref(),
            input,
        )
        .await
    }

    /// Probes every host address of `subnet`.
    pub async fn scan(&self, subnet: &Subnet) -> ScanResult {
        self.scanner.scan(subnet).await
    }

    /// Resolves the subnet of the host's first usable IPv4 address.
    pub fn local_subnet(&self) -> Result<Subnet> {
        local_subnet(self.hosts.as_ref())
    }

    /// Scans the subnet of the host's first usable IPv4 address.
    pub async fn scan_local(&self) -> Result<ScanResult> {
        let subnet = self.local_subnet()?;
        Ok(self.scanner.scan(&subnet).await)
    }

    /// Returns the stored profile of `ap` as XML.
    pub async fn profile_xml(&self, ap: &AccessPoint) -> Result<String> {
        self.adapter.profile_xml(ap).await
    }

    /// Deletes the stored profile of `ap`.
    pub async fn delete_profile(&self, ap: &AccessPoint) -> Result<()> {
        self.adapter.delete_profile(ap).await
    }
}
