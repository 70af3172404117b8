//! Wake-on-LAN forwarding backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::dialer::{Dialer, Sleeper, TcpDialer, TokioSleeper};
use super::error::{BackendError, BackendResult};
use super::tcp_forwarder::close_incoming;
use super::tracker::ActivePipes;
use super::Backend;
use crate::config::WolForwarderBackendConfig;
use crate::pipe::Pipe;
use crate::wol::{WakeSender, WolEmitter};

/// Per-attempt dial timeout. Short, because an unreachable sleeping host
/// fails the probe quickly and the retry loop provides the patience.
const DIAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Grace period after the magic packet before the first retry.
const WAKE_SETTLE: Duration = Duration::from_secs(5);

/// Pause between dial retries.
const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Dial retries after the wake signal before giving up.
const MAX_RETRIES: u32 = 50;

/// A backend that relays to a target which may have to be woken first.
///
/// The dial sequence for each incoming connection: one quick probe (the
/// target may already be awake), then a single magic packet, a settle
/// sleep, and up to [`MAX_RETRIES`] further probes. On exhaustion the
/// incoming connection is closed.
pub struct WolForwarderBackend {
    name: String,
    target_addr: String,
    pipes: Arc<ActivePipes>,
    wake_sender: Arc<dyn WakeSender>,
    dialer: Arc<dyn Dialer>,
    sleeper: Arc<dyn Sleeper>,
}

impl WolForwarderBackend {
    /// Create a WoL forwarder backend from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAC address or broadcast endpoint cannot be
    /// parsed.
    pub fn new(config: &WolForwarderBackendConfig) -> BackendResult<Self> {
        let emitter = WolEmitter::new(&config.wol_mac_addr, &config.wol_broadcast_addr)
            .map_err(|source| BackendError::WolSetup {
                name: config.name.clone(),
                source,
            })?;

        Ok(Self {
            name: config.name.clone(),
            target_addr: config.target_addr.clone(),
            pipes: Arc::new(ActivePipes::new()),
            wake_sender: Arc::new(emitter),
            dialer: Arc::new(TcpDialer),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Dial the target, waking it if necessary.
    ///
    /// Sends at most one magic packet per invocation.
    async fn dial_with_wake(&self) -> BackendResult<TcpStream> {
        // Quick probe first; the target may already be awake.
        if let Ok(target) = self.dialer.dial(&self.target_addr, DIAL_TIMEOUT).await {
            return Ok(target);
        }

        debug!(
            target = %self.target_addr,
            "failed to connect to target, sending wake-on-LAN magic packet"
        );
        self.wake_sender
            .send_wake()
            .await
            .map_err(BackendError::WakeSend)?;

        // Give the machine time to boot before probing again.
        self.sleeper.sleep(WAKE_SETTLE).await;

        for attempt in 0..MAX_RETRIES {
            debug!(target = %self.target_addr, attempt, "dialing woken target");

            self.sleeper.sleep(RETRY_INTERVAL).await;
            if let Ok(target) = self.dialer.dial(&self.target_addr, DIAL_TIMEOUT).await {
                return Ok(target);
            }
        }

        Err(BackendError::WakeTimeout {
            target: self.target_addr.clone(),
        })
    }
}

#[async_trait]
impl Backend for WolForwarderBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn active_pipes(&self) -> usize {
        self.pipes.len()
    }

    async fn handle(&self, connection: TcpStream) {
        let target = match self.dial_with_wake().await {
            Ok(target) => target,
            Err(e) => {
                info!(
                    name = %self.name,
                    target = %self.target_addr,
                    error = %e,
                    "backend could not connect to target"
                );
                close_incoming(connection).await;
                return;
            },
        };

        self.pipes.track(Pipe::between(connection, target));
    }
}
