//! Local subnet resolution.

use log::debug;
use std::net::{IpAddr, Ipv4Addr};

use crate::Result;
use crate::api::adapters::HostAddresses;
use crate::api::models::{Subnet, WifiError};

/// Returns the first usable IPv4 address in `addresses`.
///
/// Loopback, link-local and unspecified addresses are skipped, as are all
/// IPv6 addresses.
///
/// # Examples
///
/// ```rust
/// use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
/// use wifiscan::first_ipv4;
///
/// let addrs = [
///     IpAddr::V6(Ipv6Addr::LOCALHOST),
///     IpAddr::V4(Ipv4Addr::LOCALHOST),
///     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
/// ];
/// assert_eq!(first_ipv4(&addrs), Some(Ipv4Addr::new(10, 0, 0, 5)));
/// ```
pub fn first_ipv4(addresses: &[IpAddr]) -> Option<Ipv4Addr> {
    addresses.iter().find_map(|addr| match addr {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() && !v4.is_unspecified() => {
            Some(*v4)
        }
        _ => None,
    })
}

/// Resolves the `/24` subnet of the host's first usable IPv4 address.
///
/// # Errors
///
/// Returns `WifiError::NetworkUnavailable` if no interface carries one.
pub(crate) fn local_subnet(hosts: &dyn HostAddresses) -> Result<Subnet> {
    let addresses = hosts.addresses()?;
    let addr = first_ipv4(&addresses).ok_or(WifiError::NetworkUnavailable)?;
    let subnet = Subnet::from_ipv4(addr);
    debug!("Local address {addr} is on subnet {subnet}");
    Ok(subnet)
}

/// Interface addresses as reported by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddresses;

impl HostAddresses for SystemAddresses {
    fn addresses(&self) -> Result<Vec<IpAddr>> {
        let interfaces = if_addrs::get_if_addrs()?;
        Ok(interfaces
            .into_iter()
            .filter(|iface| !iface.is_loopback())
            .map(|iface| iface.ip())
            .collect())
    }
}
