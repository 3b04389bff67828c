//! In-memory device registry

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use url::Url;

use crate::collaborator::DeviceRegistry;
use crate::device::{DeviceDescription, RegistryEntry, ServiceEndpoint};

/// Registry keyed by device unique id
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    devices: RwLock<HashMap<String, RegistryEntry>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry as-is
    pub fn insert(&self, entry: RegistryEntry) {
        self.devices.write().insert(entry.id.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

impl DeviceRegistry for InMemoryRegistry {
    fn lookup(&self, id: &str) -> Option<RegistryEntry> {
        self.devices.read().get(id).cloned()
    }

    fn update(&self, description: &DeviceDescription) {
        let Some(id) = description.udn.clone() else {
            warn!(base_url = %description.base_url, "Ignoring description without unique id");
            return;
        };

        let base = Url::parse(&description.base_url).ok();
        let services = description
            .services
            .iter()
            .map(|s| ServiceEndpoint {
                service_type: s.service_type.clone(),
                control_url: s
                    .control_url
                    .as_deref()
                    .and_then(|u| resolve_control_url(base.as_ref(), u)),
                actions: s.actions.clone(),
            })
            .collect::<Vec<_>>();

        let entry = RegistryEntry {
            id: id.clone(),
            friendly_name: description.friendly_name.clone().unwrap_or_default(),
            model_name: description.model_name.clone().unwrap_or_default(),
            base_url: description.base_url.clone(),
            last_seen: Utc::now(),
            services,
        };

        let replaced = self.devices.write().insert(id.clone(), entry).is_some();
        if replaced {
            debug!(device = %id, "Refreshed registry entry");
        } else {
            info!(device = %id, "Registered device");
        }
    }
}

fn resolve_control_url(base: Option<&Url>, control_url: &str) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(control_url),
        None => Url::parse(control_url),
    };
    match resolved {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            warn!(control_url, error = %e, "Unresolvable control URL");
            None
        }
    }
}
