//! Connection state monitoring using D-Bus signals.
//!
//! Both waits subscribe to the relevant `StateChanged` signal before reading
//! the current state, so a transition that happens in between is not lost.

use futures::{FutureExt, StreamExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::pin::pin;
use zbus::Connection;
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::models::{ConnectionOutcome, WifiError};
use crate::dbus::{NMActiveConnectionProxy, NMDeviceProxy};
use crate::types::constants::{active_reason, active_state, device_state, timeouts};

/// Waits for an active connection to become activated or fail.
///
/// A deactivation or the activation timeout is a [`ConnectionOutcome::Failure`]
/// carrying a readable reason; only D-Bus errors are returned as `Err`.
pub(crate) async fn wait_for_connection_activation(
    conn: &Connection,
    active_conn_path: &OwnedObjectPath,
) -> Result<ConnectionOutcome> {
    let active_conn = NMActiveConnectionProxy::builder(conn)
        .path(active_conn_path.clone())?
        .build()
        .await?;

    let mut stream = active_conn.receive_activation_state_changed().await?;
    debug!("Subscribed to ActiveConnection StateChanged signal");

    match active_conn.state().await? {
        active_state::ACTIVATED => {
            debug!("Connection already activated");
            return Ok(ConnectionOutcome::Success);
        }
        active_state::DEACTIVATED => {
            warn!("Connection already deactivated");
            return Ok(ConnectionOutcome::failure("connection was deactivated"));
        }
        state => debug!("Current active connection state: {state}"),
    }

    let timeout = timeouts::connection_timeout();
    let mut timeout_delay = pin!(Delay::new(timeout).fuse());

    loop {
        select! {
            _ = timeout_delay => {
                warn!("Connection activation timed out after {timeout:?}");
                return Ok(ConnectionOutcome::failure(format!(
                    "activation timed out after {}s",
                    timeout.as_secs()
                )));
            }
            signal_opt = stream.next() => {
                let Some(signal) = signal_opt else {
                    return Err(WifiError::Stuck("signal stream ended".into()));
                };
                match signal.args() {
                    Ok(args) => {
                        debug!(
                            "Active connection state changed to {} (reason {})",
                            args.state, args.reason
                        );
                        match args.state {
                            active_state::ACTIVATED => return Ok(ConnectionOutcome::Success),
                            active_state::DEACTIVATED => {
                                return Ok(ConnectionOutcome::failure(reason_text(args.reason)));
                            }
                            _ => {}
                        }
                    }
                    Err(e) => warn!("Failed to parse StateChanged signal args: {e}"),
                }
            }
        }
    }
}

/// Waits for a device to reach the disconnected (or unavailable) state.
pub(crate) async fn wait_for_device_disconnect(dev: &NMDeviceProxy<'_>) -> Result<()> {
    let mut stream = dev.receive_device_state_changed().await?;
    debug!("Subscribed to device StateChanged signal for disconnect");

    if is_disconnected(dev.state().await?) {
        debug!("Device already disconnected");
        return Ok(());
    }

    let mut timeout_delay = pin!(Delay::new(timeouts::disconnect_timeout()).fuse());

    loop {
        select! {
            _ = timeout_delay => {
                let final_state = dev.state().await?;
                if is_disconnected(final_state) {
                    return Ok(());
                }
                warn!("Disconnect timed out, device still in state: {final_state}");
                return Err(WifiError::Stuck(format!("state {final_state}")));
            }
            signal_opt = stream.next() => {
                let Some(signal) = signal_opt else {
                    return Err(WifiError::Stuck("signal stream ended".into()));
                };
                match signal.args() {
                    Ok(args) if is_disconnected(args.new_state) => {
                        debug!("Device reached disconnected state");
                        return Ok(());
                    }
                    Ok(args) => debug!("Device state during disconnect: {}", args.new_state),
                    Err(e) => warn!("Failed to parse StateChanged signal args: {e}"),
                }
            }
        }
    }
}

pub(crate) fn is_disconnected(state: u32) -> bool {
    state == device_state::DISCONNECTED || state == device_state::UNAVAILABLE
}

/// Describes an active connection state reason code.
pub(crate) fn reason_text(reason: u32) -> String {
    let text = match reason {
        active_reason::USER_DISCONNECTED => "disconnected by user",
        active_reason::DEVICE_DISCONNECTED => "device disconnected",
        active_reason::SERVICE_STOPPED => "network service stopped",
        active_reason::IP_CONFIG_INVALID => "IP configuration could not be obtained",
        active_reason::CONNECT_TIMEOUT => "connection attempt timed out",
        active_reason::NO_SECRETS => "credentials were rejected or missing",
        active_reason::LOGIN_FAILED => "login failed",
        active_reason::CONNECTION_REMOVED => "connection profile was removed",
        active_reason::DEVICE_REMOVED => "device was removed",
        other => return format!("activation failed (reason {other})"),
    };
    text.to_string()
}
