//! D-Bus proxy interfaces for NetworkManager.
//!
//! Low-level proxy definitions for the parts of the NetworkManager API the
//! [`NmAdapter`](crate::nm::NmAdapter) uses.

mod access_point;
mod active_connection;
mod device;
mod main_nm;
mod wireless;

pub(crate) use access_point::NMAccessPointProxy;
pub(crate) use active_connection::NMActiveConnectionProxy;
pub(crate) use device::NMDeviceProxy;
pub(crate) use main_nm::NMProxy;
pub(crate) use wireless::NMWirelessProxy;
