//! Backend connectivity checks

use genesis_api::Backend;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Result of a health check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Shared "backend unreachable" flag read by the UI.
///
/// Advisory only: it drives the banner and the send guard in the UI, the chat
/// call itself is what decides whether a turn succeeds.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityFlag(Arc<AtomicBool>);

impl ConnectivityFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unreachable(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag, logging transitions
    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        let previous = self.0.swap(unreachable, Ordering::AcqRel);
        if previous != unreachable {
            if unreachable {
                tracing::info!("Backend marked unreachable");
            } else {
                tracing::info!("Backend reachable again");
            }
        }
    }
}

/// Health checker for the backend
#[derive(Clone)]
pub struct ConnectivityProbe {
    backend: Arc<dyn Backend>,
    flag: ConnectivityFlag,
}

impl ConnectivityProbe {
    pub fn new(backend: Arc<dyn Backend>, flag: ConnectivityFlag) -> Self {
        Self { backend, flag }
    }

    pub fn flag(&self) -> &ConnectivityFlag {
        &self.flag
    }

    /// Probe `/health` once and update the flag
    pub async fn check_health(&self) -> Reachability {
        match self.backend.health().await {
            Ok(status) => {
                tracing::debug!(
                    "Health ok: status={:?} service={:?}",
                    status.status,
                    status.service
                );
                self.flag.set_unreachable(false);
                Reachability::Reachable
            }
            Err(e) => {
                tracing::warn!("Health check against {} failed: {}", self.backend.base_url(), e);
                self.flag.set_unreachable(true);
                Reachability::Unreachable
            }
        }
    }

    /// User-triggered retry. The flag is only cleared if the backend now
    /// answers; while the check is pending it keeps its previous value.
    pub async fn retry(&self) -> Reachability {
        tracing::debug!("Retrying health check against {}", self.backend.base_url());
        self.check_health().await
    }

    /// Re-check every `interval` until `cancel` fires. The first check runs
    /// immediately.
    pub fn spawn_periodic(&self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let probe = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        probe.check_health().await;
                    }
                }
            }
            tracing::debug!("Periodic health probe stopped");
        })
    }
}
