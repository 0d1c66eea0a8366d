//! Discovery: make sure the host is on a network, then scan it.

use log::{debug, info};

use crate::Result;
use crate::api::adapters::{HostAddresses, InputSource, ProbeSender, WirelessAdapter};
use crate::api::models::{ConnectionOutcome, ConnectionStatus, ScanResult, WifiError};
use crate::core::orchestrator::connect_interactive;
use crate::core::scanner::SubnetScanner;
use crate::core::subnet::local_subnet;
use crate::util::utils::is_affirmative;

pub(crate) const SWITCH_PROMPT: &str =
    "You are already connected to a network, do you want to change (y/n)? ";

/// Runs discovery starting from `status`.
///
/// When connected, the operator may keep the current network (it is scanned
/// as-is) or switch, which disconnects and runs the interactive connect.
/// When not connected, the interactive connect always runs first.
///
/// # Errors
///
/// - `WifiError::NotConnected` if the interactive connect failed
/// - `WifiError::NetworkUnavailable` if no local IPv4 address exists
/// - any input error from selection or negotiation
pub(crate) async fn discover<A, P>(
    status: ConnectionStatus,
    adapter: &A,
    scanner: &SubnetScanner<P>,
    hosts: &dyn HostAddresses,
    input: &mut dyn InputSource,
) -> Result<ScanResult>
where
    A: WirelessAdapter + ?Sized,
    P: ProbeSender + 'static,
{
    let reconnect = match status {
        ConnectionStatus::NotConnected => true,
        ConnectionStatus::Connected => {
            let answer = input
                .prompt(SWITCH_PROMPT)?
                .ok_or(WifiError::EndOfInput)?;
            is_affirmative(&answer)
        }
    };

    if reconnect {
        if status.is_connected() {
            adapter.disconnect().await?;
        }
        if let ConnectionOutcome::Failure { reason } = connect_interactive(adapter, input).await? {
            return Err(WifiError::NotConnected { reason });
        }
    } else {
        debug!("Keeping the current connection");
    }

    let subnet = local_subnet(hosts)?;
    input.notify(&format!("Initiating network scan on {subnet}"))?;
    info!("Discovery scan of {subnet}");
    Ok(scanner.scan(&subnet).await)
}
