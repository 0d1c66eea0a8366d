//! Connection workflows: selection, single connect and auto-connect.

use log::{debug, info, warn};

use crate::Result;
use crate::api::adapters::{HostAddresses, InputSource, ProbeSender, WirelessAdapter};
use crate::api::models::{
    AccessPoint, AccessPointList, AutoConnectReport, AutoConnectStep, ConnectionOutcome,
    CredentialRequest, WifiError,
};
use crate::core::negotiator::negotiate;
use crate::core::scanner::SubnetScanner;
use crate::core::subnet::local_subnet;

pub(crate) const SELECT_PROMPT: &str = "Select a network by its index: ";

/// Lists visible access points, strongest first.
pub(crate) async fn list_access_points<A: WirelessAdapter + ?Sized>(
    adapter: &A,
) -> Result<AccessPointList> {
    let list = AccessPointList::new(adapter.list_access_points().await?);
    debug!("Listed {} access points", list.len());
    Ok(list)
}

/// Reads an index from `input` and resolves it against `list`.
///
/// An empty list is rejected without prompting.
///
/// # Errors
///
/// - `WifiError::IndexOutOfBounds` if the list is empty or the index is not
///   in `[0, len)`
/// - `WifiError::InvalidSelection` if the answer is not a number
/// - `WifiError::EndOfInput` if input has ended
pub(crate) fn select<'a>(
    list: &'a AccessPointList,
    input: &mut dyn InputSource,
    message: &str,
) -> Result<&'a AccessPoint> {
    if list.is_empty() {
        return Err(WifiError::IndexOutOfBounds { index: 0, len: 0 });
    }

    let answer = input.prompt(message)?.ok_or(WifiError::EndOfInput)?;
    let answer = answer.trim();
    let index: usize = answer
        .parse()
        .map_err(|_| WifiError::InvalidSelection(answer.to_string()))?;
    list.get(index)
}

/// Connects to `ap` with already negotiated credentials.
///
/// # Errors
///
/// Returns `WifiError::MissingCredentials` without contacting the adapter
/// if `creds` lacks a password the access point requires.
pub(crate) async fn connect<A: WirelessAdapter + ?Sized>(
    adapter: &A,
    ap: &AccessPoint,
    creds: &CredentialRequest,
) -> Result<ConnectionOutcome> {
    if !creds.satisfies(ap) {
        return Err(WifiError::MissingCredentials(ap.name.clone()));
    }

    debug!(
        "Connecting to '{}' | security={} overwrite_profile={}",
        ap.name,
        ap.security,
        creds.overwrite_profile()
    );
    let outcome = adapter
        .connect(ap, creds, creds.overwrite_profile())
        .await?;

    match &outcome {
        ConnectionOutcome::Success => info!("Connected to '{}'", ap.name),
        ConnectionOutcome::Failure { reason } => {
            warn!("Connection to '{}' failed: {reason}", ap.name)
        }
    }
    Ok(outcome)
}

/// Lists, lets the operator pick an access point, negotiates and connects.
///
/// Nothing is sent to the adapter unless the selection is valid and
/// negotiation completed.
pub(crate) async fn connect_interactive<A: WirelessAdapter + ?Sized>(
    adapter: &A,
    input: &mut dyn InputSource,
) -> Result<ConnectionOutcome> {
    let list = list_access_points(adapter).await?;
    if !list.is_empty() {
        input.notify(&list.to_string())?;
    }

    let ap = select(&list, input, SELECT_PROMPT)?;
    let creds = negotiate(ap, input)?;
    connect(adapter, ap, &creds).await
}

/// Joins every network with a stored profile in turn and scans its subnet.
///
/// Per-network failures are recorded in the report and the run moves on;
/// only a failure to list access points aborts.
pub(crate) async fn connect_all<A, P>(
    adapter: &A,
    scanner: &SubnetScanner<P>,
    hosts: &dyn HostAddresses,
) -> Result<AutoConnectReport>
where
    A: WirelessAdapter + ?Sized,
    P: ProbeSender + 'static,
{
    let list = list_access_points(adapter).await?;
    let mut report = AutoConnectReport::default();

    for ap in &list {
        if let Err(e) = adapter.disconnect().await {
            warn!("Disconnect before '{}' failed: {e}", ap.name);
        }

        if !ap.has_profile {
            info!("Skipping '{}': no stored profile", ap.name);
            report.push(AutoConnectStep::Skipped {
                name: ap.name.clone(),
            });
            continue;
        }

        let reason = match connect(adapter, ap, &CredentialRequest::reuse_profile()).await {
            Ok(ConnectionOutcome::Success) => None,
            Ok(ConnectionOutcome::Failure { reason }) => Some(reason),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = reason {
            report.push(AutoConnectStep::ConnectFailed {
                name: ap.name.clone(),
                reason,
            });
            continue;
        }

        match local_subnet(hosts) {
            Ok(subnet) => {
                let result = scanner.scan(&subnet).await;
                info!(
                    "'{}': {} hosts reachable on {subnet}",
                    ap.name,
                    result.count()
                );
                report.push(AutoConnectStep::Scanned {
                    name: ap.name.clone(),
                    result,
                });
            }
            Err(e) => {
                warn!("Could not scan from '{}': {e}", ap.name);
                report.push(AutoConnectStep::ScanFailed {
                    name: ap.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Auto-connect finished: {} scanned, {} skipped, {} failed",
        report.scans().count(),
        report.skipped().count(),
        report.failures()
    );
    Ok(report)
}
