//! REST API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rouse_core::HardwareAddress;
use rouse_wake::{ProbeSchedule, WakeRequest};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::WakeConfig;
use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Wake request body; omitted fields take the `[wake]` defaults
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WakeBody {
    pub ip: String,
    pub mac: String,
    pub broadcast: Option<String>,
    pub port: Option<u16>,
    /// Seconds to wait before the first probe
    pub delay: Option<f64>,
    /// Total probe budget in seconds
    pub timeout: Option<f64>,
    pub interval: Option<f64>,
    pub probe_timeout: Option<f64>,
    pub dry_run: Option<bool>,
}

impl WakeBody {
    fn into_request(self, defaults: &WakeConfig) -> Result<WakeRequest, String> {
        let host = parse_ipv4("ip", &self.ip)?;
        let broadcast = match self.broadcast.as_deref() {
            Some(b) => parse_ipv4("broadcast", b)?,
            None => defaults.broadcast,
        };
        let mac = HardwareAddress::parse_grouped(&self.mac)
            .map_err(|e| format!("mac '{}' is invalid: {e}", self.mac))?;
        let port = self.port.unwrap_or(defaults.port);
        if port == 0 {
            return Err("port must be positive".to_string());
        }

        let defaults_schedule = defaults.schedule();
        let schedule = ProbeSchedule {
            total: seconds("timeout", self.timeout, defaults_schedule.total, false)?,
            interval: seconds("interval", self.interval, defaults_schedule.interval, false)?,
            per_attempt: seconds(
                "probe_timeout",
                self.probe_timeout,
                defaults_schedule.per_attempt,
                false,
            )?,
        };

        Ok(WakeRequest {
            broadcast,
            port,
            pre_delay: seconds("delay", self.delay, defaults.pre_delay(), true)?,
            schedule,
            dry_run: self.dry_run.unwrap_or(false),
            ..WakeRequest::new(host, mac)
        })
    }
}

fn parse_ipv4(field: &str, value: &str) -> Result<Ipv4Addr, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{field} '{value}' is not an IPv4 address"))
}

/// Longest accepted value for any timing field, one day
const MAX_TIMING_SECS: f64 = 86_400.0;

fn seconds(
    field: &str,
    value: Option<f64>,
    default: Duration,
    allow_zero: bool,
) -> Result<Duration, String> {
    let Some(secs) = value else {
        return Ok(default);
    };
    let valid = secs.is_finite() && (secs > 0.0 || (allow_zero && secs == 0.0));
    if !valid {
        return Err(if allow_zero {
            format!("{field} must be zero or a positive number of seconds")
        } else {
            format!("{field} must be a positive number of seconds")
        });
    }
    if secs > MAX_TIMING_SECS {
        return Err(format!("{field} must not exceed {MAX_TIMING_SECS} seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{field} is out of range: {e}"))
}

/// Send a wake packet and wait for the host to answer probes
pub async fn wake(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WakeBody>, JsonRejection>,
) -> impl IntoResponse {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected wake request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(rejection.body_text())),
            )
                .into_response();
        }
    };

    let request = match body.into_request(&state.config.wake) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiError::new(e))).into_response(),
    };

    let outcome = state.coordinator.wake(&request).await;
    (status(outcome.status_code()), Json(outcome)).into_response()
}

/// List configured presets
pub async fn list_presets(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.presets.clone())
}

/// Wake the preset's renderer if needed and start its folder playing
pub async fn play_preset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let Some(preset) = state.config.preset(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(format!("Preset '{name}' not found"))),
        )
            .into_response();
    };
    let Some(player) = &state.player else {
        return (
            StatusCode::NOT_IMPLEMENTED,
            Json(ApiError::new("No control-plane adapter attached")),
        )
            .into_response();
    };

    info!(preset = %name, "Preset playback requested");
    let result = player.play_preset(preset).await;
    (status(result.status_code), Json(result)).into_response()
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}

/// Network interface info
#[derive(Serialize)]
pub struct NetworkInterface {
    pub name: String,
    pub ip: String,
    /// Directed broadcast address, usable as a wake target
    pub broadcast: String,
    pub prefix_len: u8,
}

/// List available network interfaces
pub async fn list_interfaces() -> impl IntoResponse {
    use network_interface::{NetworkInterface as NI, NetworkInterfaceConfig};

    let interfaces: Vec<NetworkInterface> = NI::show()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|iface| {
            iface.addr.iter().find_map(|addr| {
                if let network_interface::Addr::V4(v4) = addr {
                    let prefix = v4
                        .netmask
                        .map(|m| u32::from(m).count_ones() as u8)
                        .unwrap_or(24);
                    let broadcast = v4
                        .broadcast
                        .unwrap_or_else(|| directed_broadcast(v4.ip, prefix));

                    Some(NetworkInterface {
                        name: iface.name.clone(),
                        ip: v4.ip.to_string(),
                        broadcast: broadcast.to_string(),
                        prefix_len: prefix,
                    })
                } else {
                    None
                }
            })
        })
        .filter(|iface| {
            // Filter out loopback and container bridges
            !iface.name.starts_with("lo")
                && !iface.name.starts_with("docker")
                && !iface.name.starts_with("br-")
                && !iface.name.starts_with("veth")
                && iface.ip != "127.0.0.1"
        })
        .collect();

    Json(interfaces)
}

fn directed_broadcast(ip: Ipv4Addr, prefix: u8) -> Ipv4Addr {
    let mask = if prefix == 0 { 0 } else { !0u32 << (32 - prefix.min(32)) };
    Ipv4Addr::from(u32::from(ip) | !mask)
}
