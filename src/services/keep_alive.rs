//! Periodic liveness pings that stop an idle backend host from suspending it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiError};

/// The host suspends after 15 idle minutes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(14 * 60);

const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingStatus {
    Ok,
    Failed(u16),
}

#[async_trait]
pub trait Pinger: Send + Sync {
    async fn ping(&self) -> Result<PingStatus, ApiError>;
}

/// `HEAD /health` against the configured backend.
pub struct HttpPinger {
    api: ApiClient,
}

impl HttpPinger {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Pinger for HttpPinger {
    async fn ping(&self) -> Result<PingStatus, ApiError> {
        let status = self.api.head(HEALTH_PATH).await?;
        if status.is_success() {
            Ok(PingStatus::Ok)
        } else {
            Ok(PingStatus::Failed(status.as_u16()))
        }
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns at most one ping timer. No retries: a failed ping is logged and the
/// next scheduled one goes ahead.
pub struct KeepAliveService {
    pinger: Arc<dyn Pinger>,
    interval: Duration,
    running: Mutex<Option<Running>>,
}

impl KeepAliveService {
    pub fn new(pinger: Arc<dyn Pinger>, interval: Duration) -> Self {
        Self {
            pinger,
            interval,
            running: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Running>> {
        match self.running.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_some()
    }

    /// Ping now and then every interval. Returns `false` if already running.
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.lock();
        if running.is_some() {
            tracing::info!("Keep-alive already running");
            return false;
        }

        tracing::info!(interval_secs = self.interval.as_secs(), "Starting keep-alive service");
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let pinger = self.pinger.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => ping_once(pinger.as_ref()).await,
                }
            }
        });

        *running = Some(Running { cancel, handle });
        true
    }

    pub fn stop(&self) {
        if let Some(running) = self.lock().take() {
            running.cancel.cancel();
            running.handle.abort();
            tracing::info!("Keep-alive service stopped");
        }
    }

    /// Hiding does not pause the timer. Becoming visible triggers one extra
    /// ping while the service is running.
    pub fn on_visibility_change(&self, visible: bool) {
        if !visible {
            tracing::debug!("Hidden, keep-alive keeps running");
            return;
        }
        if self.is_running() {
            let pinger = self.pinger.clone();
            tokio::spawn(async move {
                ping_once(pinger.as_ref()).await;
            });
        }
    }
}

impl Drop for KeepAliveService {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn ping_once(pinger: &dyn Pinger) {
    match pinger.ping().await {
        Ok(PingStatus::Ok) => tracing::debug!("Backend pinged successfully"),
        Ok(PingStatus::Failed(status)) => tracing::warn!(status, "Backend ping failed"),
        Err(e) => tracing::error!("Error pinging backend: {}", e),
    }
}
