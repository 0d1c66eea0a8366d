//! Wi-Fi credential negotiation and local subnet discovery.
//!
//! This crate drives the workflow of joining a wireless network and then
//! finding out which hosts answer on the resulting subnet:
//!
//! - Listing visible access points, strongest first
//! - Negotiating credentials (reuse a stored profile or collect new ones)
//! - Connecting through a pluggable wireless adapter
//! - Auto-connecting to every known network, scanning after each
//! - Concurrently probing every host address of a `/24` subnet
//!
//! # Example
//!
//! ```no_run
//! use wifiscan::nm::NmAdapter;
//! use wifiscan::probe::IcmpProbeSender;
//! use wifiscan::{Finder, Subnet};
//!
//! # async fn example() -> wifiscan::Result<()> {
//! let adapter = NmAdapter::new().await?;
//! let probe = IcmpProbeSender::new()?;
//! let finder = Finder::new(adapter, probe);
//!
//! for ap in finder.list_access_points().await?.iter() {
//!     println!("{} ({}%)", ap.name, ap.strength);
//! }
//!
//! let result = finder.scan(&Subnet::parse("192.168.1.")?).await;
//! println!("{} hosts alive", result.count());
//! # Ok(())
//! # }
//! ```
//!
//! # Collaborators
//!
//! The core never talks to hardware directly. Radio access goes through a
//! [`WirelessAdapter`], liveness probes through a [`ProbeSender`] and
//! operator prompts through an [`InputSource`]. The [`nm`] and [`probe`]
//! modules provide Linux implementations backed by NetworkManager and ICMP
//! echo; tests substitute in-memory fakes.
//!
//! # Error Handling
//!
//! All fallible operations return `Result<T, WifiError>`. Connection
//! failures reported by the adapter are values ([`ConnectionOutcome`]),
//! not errors, and a probe that gets no answer is simply left out of the
//! [`ScanResult`].
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade. Install a
//! logger such as `env_logger` in the binary to see output.

pub mod api;
mod core;
mod dbus;
pub mod nm;
pub mod probe;
mod types;
mod util;

pub use api::adapters::{HostAddresses, InputSource, LineInput, ProbeSender, WirelessAdapter};
pub use api::finder::Finder;
pub use api::models::{
    AccessPoint, AccessPointList, AutoConnectReport, AutoConnectStep, ConnectionOutcome,
    ConnectionStatus, CredentialRequest, ProbeOutcome, ScanConfig, ScanResult, SecurityFlags,
    SecurityKind, Subnet, WifiError,
};
pub use crate::core::subnet::{SystemAddresses, first_ipv4};

/// A specialized `Result` type for wifiscan operations.
pub type Result<T> = std::result::Result<T, WifiError>;
