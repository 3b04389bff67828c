//! Rouse Playback - Bring a renderer up and start a folder playing on it
//!
//! This crate wraps the control-plane collaborators to provide:
//! - Revival of a renderer's control metadata once it is awake
//! - Resolution of a content folder into an ordered playback plan
//! - The Stop/SetURI/Play/SetNext command sequence
//! - The preset orchestrator that runs readiness and content resolution together

pub mod orchestrator;
pub mod resolver;
pub mod revival;
pub mod sequencer;

#[cfg(test)]
mod testing;

pub use orchestrator::{Collaborators, PresetPlayer, WakeSettings};
pub use resolver::ContentResolver;
pub use revival::DeviceRevival;
pub use sequencer::PlaybackSequencer;
