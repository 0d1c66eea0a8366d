//! Concurrent liveness scan of a `/24` subnet.
//!
//! One probe task is spawned per host address (`.1` through `.254`). Each
//! task reports its outcome over a channel to the single consumer in
//! [`SubnetScanner::scan`], which is the only place results are
//! accumulated. The scan returns once every task has reported.

use log::{debug, info, warn};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};

use crate::api::adapters::ProbeSender;
use crate::api::models::{ProbeOutcome, ScanConfig, ScanResult, Subnet};
use crate::types::constants::scan;

pub(crate) struct SubnetScanner<P> {
    probe: Arc<P>,
    config: ScanConfig,
}

impl<P: ProbeSender + 'static> SubnetScanner<P> {
    pub(crate) fn new(probe: Arc<P>, config: ScanConfig) -> Self {
        Self { probe, config }
    }

    pub(crate) fn reconfigure(self, config: ScanConfig) -> Self {
        Self { config, ..self }
    }

    pub(crate) fn config(&self) -> ScanConfig {
        self.config
    }

    /// Probes every host address of `subnet` and collects those that answered.
    ///
    /// Reachable hosts appear in completion order. A probe that exceeds the
    /// configured timeout counts as unreachable even if the sender ignores it.
    pub(crate) async fn scan(&self, subnet: &Subnet) -> ScanResult {
        let timeout = self.config.probe_timeout();
        let limiter = self
            .config
            .max_in_flight
            .map(|limit| Arc::new(Semaphore::new(limit)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(Ipv4Addr, ProbeOutcome)>();

        debug!(
            "Scanning {subnet}{}-{} (timeout {timeout:?}, max in flight {:?})",
            scan::FIRST_HOST,
            scan::LAST_HOST,
            self.config.max_in_flight
        );

        for address in subnet.hosts() {
            let probe = Arc::clone(&self.probe);
            let tx = tx.clone();
            let limiter = limiter.clone();

            tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = tokio::time::timeout(timeout, probe.probe(address, timeout))
                    .await
                    .unwrap_or(ProbeOutcome::Unreachable);
                let _ = tx.send((address, outcome));
            });
        }
        drop(tx);

        let mut reachable = Vec::new();
        let mut probed = 0;
        while let Some((address, outcome)) = rx.recv().await {
            probed += 1;
            if outcome.is_reachable() {
                debug!("{address} is up");
                reachable.push(address);
            }
        }

        if probed < scan::HOST_COUNT {
            warn!(
                "{} probe tasks ended without reporting",
                scan::HOST_COUNT - probed
            );
        }
        info!(
            "Scan of {subnet} finished: {} of {probed} hosts reachable",
            reachable.len()
        );

        ScanResult {
            subnet: *subnet,
            reachable,
            probed,
        }
    }
}
