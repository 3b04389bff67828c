//! Device references, control-plane descriptions and registry entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::address::HardwareAddress;

/// UPnP service kind used to browse a content source
pub const CONTENT_DIRECTORY: &str = "ContentDirectory";
/// UPnP service kind used to drive playback on a renderer
pub const AV_TRANSPORT: &str = "AVTransport";

/// A device as configured in a preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    /// Logical id, matched against the registry (the device UDN)
    pub id: String,
    /// Location of the device description, also the control base locator
    pub description_url: String,
    /// Network address used by the liveness probe
    pub ip: Ipv4Addr,
    /// Hardware address the wake packet is built from
    pub mac: HardwareAddress,
    /// Broadcast address the wake packet is sent to
    #[serde(default = "default_broadcast")]
    pub broadcast: Ipv4Addr,
}

pub fn default_broadcast() -> Ipv4Addr {
    Ipv4Addr::BROADCAST
}

/// Control metadata returned by the description fetcher.
///
/// Every field except the base URL is optional because the fetcher reports
/// whatever the device published; callers validate before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescription {
    pub udn: Option<String>,
    pub friendly_name: Option<String>,
    pub model_name: Option<String>,
    pub manufacturer: Option<String>,
    /// Base against which relative control URLs are resolved
    pub base_url: String,
    #[serde(default)]
    pub services: Vec<ServiceDescription>,
}

impl DeviceDescription {
    /// Names of the identity fields that are absent or blank
    pub fn missing_identity(&self) -> Vec<&'static str> {
        let fields = [
            ("friendly name", &self.friendly_name),
            ("model", &self.model_name),
            ("unique id", &self.udn),
        ];
        fields
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub service_type: String,
    pub control_url: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// An invokable service held by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub service_type: String,
    /// Absolute control URL, `None` when it could not be resolved
    pub control_url: Option<String>,
    /// Advertised actions; empty when the device did not list them
    pub actions: Vec<String>,
}

impl ServiceEndpoint {
    /// Whether this is a `urn:...:service:<kind>:<version>` service
    pub fn is_kind(&self, kind: &str) -> bool {
        self.service_type
            .split(':')
            .collect::<Vec<_>>()
            .windows(2)
            .any(|w| w[0] == "service" && w[1] == kind)
    }

    pub fn supports(&self, action: &str) -> bool {
        self.actions.is_empty() || self.actions.iter().any(|a| a == action)
    }

    pub fn control_url(&self) -> Option<&str> {
        self.control_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// Registry view of a device that has been described
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub friendly_name: String,
    pub model_name: String,
    pub base_url: String,
    pub last_seen: DateTime<Utc>,
    pub services: Vec<ServiceEndpoint>,
}

impl RegistryEntry {
    /// First service of `kind` that supports `action`, with its control URL
    pub fn usable_service(&self, kind: &str, action: &str) -> Option<(&ServiceEndpoint, &str)> {
        self.services
            .iter()
            .filter(|s| s.is_kind(kind) && s.supports(action))
            .find_map(|s| s.control_url().map(|url| (s, url)))
    }
}
