//! Configuration loading and validation

use anyhow::{bail, Context, Result};
use rouse_core::{DeviceRef, HardwareAddress, Preset};
use rouse_playback::WakeSettings;
use rouse_wake::{ProbeSchedule, WAKE_PORT};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub wake: WakeConfig,
    #[serde(default, rename = "preset")]
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tls: None,
        }
    }
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format)
    pub cert: String,
    /// Path to private key file (PEM format)
    pub key: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Defaults for wake requests and for waking preset renderers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeConfig {
    #[serde(default = "default_broadcast")]
    pub broadcast: Ipv4Addr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wait between the wake packet and the first probe
    #[serde(default = "default_pre_delay")]
    pub pre_delay_secs: u64,
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// Slack on top of delay + probe budget before a wake is reported as timed out
    #[serde(default = "default_deadline_buffer")]
    pub deadline_buffer_secs: u64,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            broadcast: default_broadcast(),
            port: default_port(),
            pre_delay_secs: default_pre_delay(),
            total_timeout_secs: default_total_timeout(),
            interval_secs: default_interval(),
            probe_timeout_secs: default_probe_timeout(),
            deadline_buffer_secs: default_deadline_buffer(),
        }
    }
}

/// Longest accepted `[wake]` timing, one day
const MAX_TIMING_SECS: u64 = 86_400;

fn default_broadcast() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

fn default_port() -> u16 {
    WAKE_PORT
}

fn default_pre_delay() -> u64 {
    5
}

fn default_total_timeout() -> u64 {
    60
}

fn default_interval() -> u64 {
    2
}

fn default_probe_timeout() -> u64 {
    3
}

fn default_deadline_buffer() -> u64 {
    10
}

impl WakeConfig {
    pub fn schedule(&self) -> ProbeSchedule {
        ProbeSchedule {
            total: Duration::from_secs(self.total_timeout_secs),
            interval: Duration::from_secs(self.interval_secs),
            per_attempt: Duration::from_secs(self.probe_timeout_secs),
        }
    }

    pub fn pre_delay(&self) -> Duration {
        Duration::from_secs(self.pre_delay_secs)
    }

    pub fn deadline_buffer(&self) -> Duration {
        Duration::from_secs(self.deadline_buffer_secs)
    }

    /// Reject schedules the probe loop cannot run
    pub fn validate(&self) -> Result<()> {
        let timings = [
            ("total_timeout_secs", self.total_timeout_secs, false),
            ("interval_secs", self.interval_secs, false),
            ("probe_timeout_secs", self.probe_timeout_secs, false),
            ("pre_delay_secs", self.pre_delay_secs, true),
            ("deadline_buffer_secs", self.deadline_buffer_secs, true),
        ];
        for (field, secs, allow_zero) in timings {
            if secs == 0 && !allow_zero {
                bail!("[wake] {field} must be positive");
            }
            if secs > MAX_TIMING_SECS {
                bail!("[wake] {field} must not exceed {MAX_TIMING_SECS}");
            }
        }
        if self.port == 0 {
            bail!("[wake] port must be positive");
        }
        Ok(())
    }

    /// Settings used by the preset player's readiness branch
    pub fn settings(&self) -> WakeSettings {
        WakeSettings {
            port: self.port,
            pre_delay: self.pre_delay(),
            schedule: self.schedule(),
        }
    }
}

impl Config {
    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config
            .wake
            .validate()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        info!(
            path = %path.display(),
            presets = config.presets.len(),
            "Loaded configuration"
        );
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let config = Config {
        daemon: DaemonConfig::default(),
        wake: WakeConfig::default(),
        presets: vec![Preset {
            name: "living-room".to_string(),
            target: Some(DeviceRef {
                id: "uuid:00000000-0000-0000-0000-000000000001".to_string(),
                description_url: "http://192.168.1.20:1400/xml/device_description.xml"
                    .to_string(),
                ip: Ipv4Addr::new(192, 168, 1, 20),
                mac: HardwareAddress::new([0xAC, 0x5A, 0xF0, 0xE5, 0x8C, 0x25]),
                broadcast: Ipv4Addr::new(192, 168, 1, 255),
            }),
            source_id: Some("uuid:00000000-0000-0000-0000-000000000002".to_string()),
            folder_id: Some("64".to_string()),
        }],
    };

    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;
    Ok(())
}
