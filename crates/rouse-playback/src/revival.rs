//! Re-fetch a device's control metadata after it wakes up

use rouse_core::{DescriptionFetcher, DeviceDescription, DeviceRef, DeviceRegistry, PlaybackError};
use std::sync::Arc;
use tracing::{info, warn};

pub struct DeviceRevival {
    fetcher: Arc<dyn DescriptionFetcher>,
    registry: Arc<dyn DeviceRegistry>,
}

impl DeviceRevival {
    pub fn new(fetcher: Arc<dyn DescriptionFetcher>, registry: Arc<dyn DeviceRegistry>) -> Self {
        Self { fetcher, registry }
    }

    /// Fetch the description, reject partial ones and hand it to the registry
    pub async fn revive(&self, device: &DeviceRef) -> Result<DeviceDescription, PlaybackError> {
        let url = &device.description_url;
        let description = self
            .fetcher
            .fetch_device_description(url)
            .await
            .ok_or_else(|| {
                warn!(device = %device.id, url = %url, "No device description");
                PlaybackError::RevivalFailure(format!("no device description at {url}"))
            })?;

        let missing = description.missing_identity();
        if !missing.is_empty() {
            warn!(device = %device.id, url = %url, missing = ?missing, "Incomplete device description");
            return Err(PlaybackError::RevivalFailure(format!(
                "description at {url} has no {}",
                missing.join(", ")
            )));
        }

        self.registry.update(&description);
        info!(
            device = %device.id,
            name = description.friendly_name.as_deref().unwrap_or_default(),
            services = description.services.len(),
            "Device control metadata refreshed"
        );
        Ok(description)
    }
}
