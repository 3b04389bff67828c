//! Wake coordinator: send, wait, probe, all under one deadline

use rouse_core::{HardwareAddress, PlaybackError};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::packet::WakePacket;
use crate::probe::{LivenessProbe, PingProbe, ProbeLoop, ProbeSchedule};
use crate::sender::{UdpWakeSender, WakeSender, WAKE_PORT};

/// Slack added on top of the pre-probe delay and probe budget before the
/// coordinator gives up on the whole sequence
pub const DEFAULT_DEADLINE_BUFFER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WakeStatus {
    Awake,
    Offline,
    Timeout,
    Error,
}

/// Result of one wake request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WakeOutcome {
    pub status: WakeStatus,
    pub message: String,
    /// Probe attempts that settled before the outcome was decided
    pub attempts: u32,
    pub elapsed_ms: u64,
}

impl WakeOutcome {
    pub fn is_awake(&self) -> bool {
        self.status == WakeStatus::Awake
    }

    pub fn status_code(&self) -> u16 {
        match self.status {
            WakeStatus::Awake => 200,
            WakeStatus::Offline | WakeStatus::Timeout => 504,
            WakeStatus::Error => 500,
        }
    }

    /// Map a non-awake outcome onto the error taxonomy
    pub fn into_result(self) -> Result<WakeOutcome, PlaybackError> {
        match self.status {
            WakeStatus::Awake => Ok(self),
            WakeStatus::Offline => Err(PlaybackError::ProbeExhausted(self.message)),
            WakeStatus::Timeout => Err(PlaybackError::DeadlineExceeded(self.message)),
            WakeStatus::Error => Err(PlaybackError::WakeSendFailure(self.message)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeRequest {
    /// Address probed for liveness
    pub host: Ipv4Addr,
    pub mac: HardwareAddress,
    pub broadcast: Ipv4Addr,
    pub port: u16,
    /// Pause between sending the packet and the first probe
    pub pre_delay: Duration,
    pub schedule: ProbeSchedule,
    /// Only probe, never send a wake packet
    pub dry_run: bool,
}

impl WakeRequest {
    pub fn new(host: Ipv4Addr, mac: HardwareAddress) -> Self {
        Self {
            host,
            mac,
            broadcast: Ipv4Addr::BROADCAST,
            port: WAKE_PORT,
            pre_delay: Duration::from_secs(5),
            schedule: ProbeSchedule::default(),
            dry_run: false,
        }
    }
}

pub struct WakeCoordinator {
    sender: Arc<dyn WakeSender>,
    probe: Arc<dyn LivenessProbe>,
    deadline_buffer: Duration,
}

impl WakeCoordinator {
    pub fn new(sender: Arc<dyn WakeSender>, probe: Arc<dyn LivenessProbe>) -> Self {
        Self {
            sender,
            probe,
            deadline_buffer: DEFAULT_DEADLINE_BUFFER,
        }
    }

    /// Coordinator using UDP broadcast and the system `ping`
    pub fn system() -> Self {
        Self::new(Arc::new(UdpWakeSender), Arc::new(PingProbe))
    }

    pub fn with_deadline_buffer(mut self, buffer: Duration) -> Self {
        self.deadline_buffer = buffer;
        self
    }

    pub fn deadline_for(&self, request: &WakeRequest) -> Duration {
        request
            .pre_delay
            .saturating_add(request.schedule.total)
            .saturating_add(self.deadline_buffer)
    }

    /// Run the wake sequence raced against its deadline.
    ///
    /// When the deadline wins, the sequence is dropped at its current
    /// suspension point; any running probe is cancelled with it.
    pub async fn wake(&self, request: &WakeRequest) -> WakeOutcome {
        let started = Instant::now();
        let deadline = self.deadline_for(request);
        let attempts = AtomicU32::new(0);

        info!(
            host = %request.host,
            mac = %request.mac,
            dry_run = request.dry_run,
            deadline_secs = deadline.as_secs_f64(),
            "Wake requested"
        );

        match timeout(deadline, self.sequence(request, started, &attempts)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(host = %request.host, "Wake sequence did not settle before its deadline");
                WakeOutcome {
                    status: WakeStatus::Timeout,
                    message: format!(
                        "{} did not settle within {}s",
                        request.host,
                        deadline.as_secs_f64()
                    ),
                    attempts: attempts.load(Ordering::Relaxed),
                    elapsed_ms: elapsed_ms(started),
                }
            }
        }
    }

    async fn sequence(
        &self,
        request: &WakeRequest,
        started: Instant,
        attempts: &AtomicU32,
    ) -> WakeOutcome {
        if request.dry_run {
            debug!(host = %request.host, "Dry run, wake packet not sent");
        } else {
            let packet = WakePacket::new(request.mac);
            if !self
                .sender
                .send(&packet, request.broadcast, request.port)
                .await
            {
                return WakeOutcome {
                    status: WakeStatus::Error,
                    message: format!(
                        "Failed to send wake packet for {} to {}:{}",
                        request.mac, request.broadcast, request.port
                    ),
                    attempts: 0,
                    elapsed_ms: elapsed_ms(started),
                };
            }
            info!(mac = %request.mac, broadcast = %request.broadcast, port = request.port, "Wake packet sent");
        }

        if !request.pre_delay.is_zero() {
            sleep(request.pre_delay).await;
        }

        let report = ProbeLoop::new(self.probe.clone(), request.schedule)
            .run_observed(IpAddr::V4(request.host), |r| {
                attempts.store(r.attempt, Ordering::Relaxed)
            })
            .await;

        if report.reachable {
            info!(host = %request.host, attempts = report.attempts(), "Device awake");
            WakeOutcome {
                status: WakeStatus::Awake,
                message: format!(
                    "{} is awake after {} probe attempt(s)",
                    request.host,
                    report.attempts()
                ),
                attempts: report.attempts(),
                elapsed_ms: elapsed_ms(started),
            }
        } else {
            WakeOutcome {
                status: WakeStatus::Offline,
                message: format!(
                    "{} did not respond within {}s",
                    request.host,
                    request.schedule.total.as_secs_f64()
                ),
                attempts: report.attempts(),
                elapsed_ms: elapsed_ms(started),
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
