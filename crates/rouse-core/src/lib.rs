//! Rouse Core - Shared types, error taxonomy and collaborator contracts
//!
//! This crate provides the foundational pieces used by every other Rouse crate:
//! - Hardware addresses and device references supplied by presets
//! - Content browse/playback value types
//! - The typed error taxonomy with HTTP-style status hints
//! - Contracts for the external control-plane collaborators
//! - An in-memory device registry and a request/response correlation table

pub mod address;
pub mod collaborator;
pub mod content;
pub mod correlation;
pub mod device;
pub mod error;
pub mod preset;
pub mod registry;

pub use address::{AddressError, HardwareAddress};
pub use collaborator::{ActionInvoker, ActionResponse, ContentBrowser, DescriptionFetcher, DeviceRegistry};
pub use content::{BrowseItem, BrowseResource, BrowseResult, ContentFolderRef, PlaybackPlan, ResolvedPlayItem};
pub use correlation::{CallError, CallId, PendingCalls, PendingReply};
pub use device::{DeviceDescription, DeviceRef, RegistryEntry, ServiceDescription, ServiceEndpoint};
pub use error::{PlaybackError, PlaybackResult, UpstreamError};
pub use preset::Preset;
pub use registry::InMemoryRegistry;
