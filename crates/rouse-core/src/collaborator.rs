//! Contracts for the external control-plane collaborators
//!
//! Device description parsing, content browsing and action invocation are
//! provided by an adapter (typically UPnP/SOAP). The orchestration code only
//! depends on these traits, so tests and alternative transports can plug in.

use async_trait::async_trait;

use crate::content::BrowseResult;
use crate::device::{DeviceDescription, RegistryEntry};
use crate::error::UpstreamError;

/// Output arguments of an invoked action, in reply order
pub type ActionResponse = Vec<(String, String)>;

/// Shared registry of described devices.
///
/// Updates must be visible to a `lookup` issued right after they return.
pub trait DeviceRegistry: Send + Sync {
    fn lookup(&self, id: &str) -> Option<RegistryEntry>;
    fn update(&self, description: &DeviceDescription);
}

#[async_trait]
pub trait DescriptionFetcher: Send + Sync {
    /// Fetch and parse the description at `base_url`; `None` on any failure
    async fn fetch_device_description(&self, base_url: &str) -> Option<DeviceDescription>;
}

#[async_trait]
pub trait ContentBrowser: Send + Sync {
    /// Direct children of `folder_id`, unfiltered, in a single full page
    async fn browse_folder(
        &self,
        control_url: &str,
        folder_id: &str,
    ) -> Result<BrowseResult, UpstreamError>;
}

#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke_action(
        &self,
        control_url: &str,
        service_type: &str,
        action: &str,
        args: &[(&str, String)],
    ) -> Result<ActionResponse, UpstreamError>;
}
