use async_trait::async_trait;
use log::trace;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};

use crate::Result;
use crate::api::adapters::ProbeSender;
use crate::api::models::{ProbeOutcome, WifiError};
use crate::types::constants::scan;

/// ICMP echo probe over a shared socket.
///
/// Construction opens the ICMP socket, so a host without permission for
/// (unprivileged) ICMP fails here rather than during a scan.
pub struct IcmpProbeSender {
    client: Client,
    next_id: AtomicU16,
}

impl IcmpProbeSender {
    /// # Errors
    ///
    /// Returns `WifiError::ProbeUnavailable` if the ICMP socket cannot be
    /// opened.
    pub fn new() -> Result<Self> {
        let client = Client::new(&Config::default())
            .map_err(|e| WifiError::ProbeUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            next_id: AtomicU16::new(std::process::id() as u16),
        })
    }
}

#[async_trait]
impl ProbeSender for IcmpProbeSender {
    async fn probe(&self, address: Ipv4Addr, timeout: Duration) -> ProbeOutcome {
        let id = PingIdentifier(self.next_id.fetch_add(1, Ordering::Relaxed));
        let payload = [0u8; scan::PAYLOAD_LEN];

        let mut pinger = self.client.pinger(IpAddr::V4(address), id).await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &payload).await {
            Ok((_packet, rtt)) => {
                trace!("Echo reply from {address} in {rtt:?}");
                ProbeOutcome::Reachable
            }
            Err(e) => {
                trace!("No echo reply from {address}: {e}");
                ProbeOutcome::Unreachable
            }
        }
    }
}
