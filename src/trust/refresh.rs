//! Periodic re-resolution of the DNS trust source.
//!
//! # Responsibilities
//! - Re-resolve the DNS source on a fixed period and swap the trusted set
//! - Serve forced refreshes from the request path, pushing the next tick back
//! - Stop cleanly when the owning instance is torn down
//!
//! # Design Decisions
//! - One task per instance, owned through its `JoinHandle`
//! - Cancellation uses a dedicated `Shutdown` channel, never the process one
//! - A forced refresh resets the timer so it cannot fire right after
//! - Forced and periodic refreshes may race; the last `replace` stands

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::trust::networks::TrustedNetworks;
use crate::trust::resolver::DnsSource;

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    Periodic,
    Forced,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTrigger::Initial => "initial",
            RefreshTrigger::Periodic => "periodic",
            RefreshTrigger::Forced => "forced",
        }
    }
}

/// Resolve the source once and swap the result in. Returns the new size.
pub async fn refresh_once(
    source: &DnsSource,
    networks: &TrustedNetworks,
    trigger: RefreshTrigger,
) -> usize {
    let set = source.resolve().await;
    let len = set.len();
    networks.replace(set);

    metrics::record_refresh(trigger.as_str(), len);
    if len == 0 {
        tracing::warn!(
            dns_name = %source.name(),
            trigger = trigger.as_str(),
            "Trusted set is empty after refresh"
        );
    } else {
        tracing::debug!(
            dns_name = %source.name(),
            trigger = trigger.as_str(),
            entries = len,
            "Trusted set refreshed"
        );
    }
    len
}

/// Background refresher for a DNS trust source.
pub struct RefreshScheduler {
    source: DnsSource,
    networks: Arc<TrustedNetworks>,
    reset: Arc<Notify>,
    cancel: Shutdown,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    /// Spawn the refresh loop. Must be called inside a Tokio runtime.
    ///
    /// The first tick fires one full `period` after start; the initial
    /// resolution is the caller's job.
    pub fn start(source: DnsSource, networks: Arc<TrustedNetworks>, period: Duration) -> Self {
        let cancel = Shutdown::new();
        let reset = Arc::new(Notify::new());

        let task = RefreshTask {
            source: source.clone(),
            networks: networks.clone(),
            reset: reset.clone(),
            period,
        };
        let handle = tokio::spawn(task.run(cancel.subscribe()));

        tracing::info!(dns_name = %source.name(), period = ?period, "Trust refresh scheduler started");

        Self {
            source,
            networks,
            reset,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Re-resolve now, swap the set, and push the next periodic tick a full
    /// period into the future.
    pub async fn force_refresh(&self) -> usize {
        let len = refresh_once(&self.source, &self.networks, RefreshTrigger::Forced).await;
        self.reset.notify_one();
        len
    }

    /// Whether the background loop is still alive.
    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.lock_handle()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn stop(&self) {
        self.cancel.trigger();
        let handle = self.lock_handle().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "Trust refresh task failed");
                }
            }
            tracing::info!(dns_name = %self.source.name(), "Trust refresh scheduler stopped");
        }
    }

    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel.trigger();
        let handle = match self.handle.get_mut() {
            Ok(h) => h.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

struct RefreshTask {
    source: DnsSource,
    networks: Arc<TrustedNetworks>,
    reset: Arc<Notify>,
    period: Duration,
}

impl RefreshTask {
    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    refresh_once(&self.source, &self.networks, RefreshTrigger::Periodic).await;
                }
                _ = self.reset.notified() => {
                    ticker.reset();
                }
                _ = shutdown.recv() => {
                    tracing::debug!(dns_name = %self.source.name(), "Trust refresh loop cancelled");
                    break;
                }
            }
        }
    }
}
