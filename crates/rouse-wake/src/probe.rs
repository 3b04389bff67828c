//! Liveness probing with a fixed retry interval

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, trace};

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Single reachability check. Unreachable hosts, resolution and
    /// permission failures all report `false`.
    async fn probe(&self, host: IpAddr, timeout: Duration) -> bool;
}

/// ICMP echo through the system `ping` binary
#[derive(Debug, Clone, Copy, Default)]
pub struct PingProbe;

#[async_trait]
impl LivenessProbe for PingProbe {
    async fn probe(&self, host: IpAddr, limit: Duration) -> bool {
        let wait_secs = limit.as_secs_f64().ceil().max(1.0) as u64;
        let output = Command::new("ping")
            .args(["-c", "1", "-W", &wait_secs.to_string(), &host.to_string()])
            .kill_on_drop(true)
            .output();

        match timeout(limit, output).await {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(e)) => {
                trace!(host = %host, error = %e, "ping could not run");
                false
            }
            Err(_) => false,
        }
    }
}

/// Timing budget of a probe loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSchedule {
    /// Total time allowed for all attempts
    pub total: Duration,
    /// Pause between a failed attempt and the next one
    pub interval: Duration,
    /// Upper bound for a single attempt
    pub per_attempt: Duration,
}

impl Default for ProbeSchedule {
    fn default() -> Self {
        Self {
            total: Duration::from_secs(60),
            interval: Duration::from_secs(2),
            per_attempt: Duration::from_secs(3),
        }
    }
}

/// Outcome of one probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub reachable: bool,
    /// 1-based attempt index
    pub attempt: u32,
    /// Time since the loop started, measured when the attempt settled
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub reachable: bool,
    pub results: Vec<ProbeResult>,
    pub elapsed: Duration,
}

impl ProbeReport {
    pub fn attempts(&self) -> u32 {
        self.results.len() as u32
    }
}

/// Repeats a liveness probe until it succeeds or the budget runs out
pub struct ProbeLoop {
    probe: Arc<dyn LivenessProbe>,
    schedule: ProbeSchedule,
}

impl ProbeLoop {
    pub fn new(probe: Arc<dyn LivenessProbe>, schedule: ProbeSchedule) -> Self {
        Self { probe, schedule }
    }

    pub async fn retry(&self, host: IpAddr) -> bool {
        self.run(host).await.reachable
    }

    pub async fn run(&self, host: IpAddr) -> ProbeReport {
        self.run_observed(host, |_| {}).await
    }

    /// Run the loop, calling `observe` after every attempt.
    ///
    /// Worst-case duration is `total + per_attempt`: another attempt is only
    /// scheduled when the pause plus a full attempt still ends before the
    /// budget expires.
    pub async fn run_observed<F>(&self, host: IpAddr, mut observe: F) -> ProbeReport
    where
        F: FnMut(&ProbeResult) + Send,
    {
        let ProbeSchedule {
            total,
            interval,
            per_attempt,
        } = self.schedule;
        let started = Instant::now();
        // `None` when the budget is too large to represent: no deadline
        let deadline = started.checked_add(total);
        let mut results = Vec::new();

        loop {
            let attempt = results.len() as u32 + 1;
            let reachable = timeout(per_attempt, self.probe.probe(host, per_attempt))
                .await
                .unwrap_or(false);

            let result = ProbeResult {
                reachable,
                attempt,
                elapsed: started.elapsed(),
            };
            debug!(
                host = %host,
                attempt,
                reachable,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "Liveness probe"
            );
            observe(&result);
            results.push(result);

            if reachable {
                return ProbeReport {
                    reachable: true,
                    results,
                    elapsed: started.elapsed(),
                };
            }

            let next_attempt_end = interval
                .checked_add(per_attempt)
                .and_then(|d| Instant::now().checked_add(d));
            let exhausted = match (deadline, next_attempt_end) {
                (Some(deadline), Some(end)) => end > deadline,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if exhausted {
                info!(
                    host = %host,
                    attempts = attempt,
                    budget_secs = total.as_secs_f64(),
                    "Probe budget exhausted"
                );
                return ProbeReport {
                    reachable: false,
                    results,
                    elapsed: started.elapsed(),
                };
            }

            sleep(interval).await;
        }
    }
}
