//! Playback presets: which renderer to wake and which folder to play on it

use serde::{Deserialize, Serialize};

use crate::content::ContentFolderRef;
use crate::device::DeviceRef;
use crate::error::PlaybackError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub target: Option<DeviceRef>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
}

impl Preset {
    /// Split the preset into its target and content folder, rejecting
    /// presets with missing or blank fields.
    pub fn validate(&self) -> Result<(DeviceRef, ContentFolderRef), PlaybackError> {
        let target = self
            .target
            .clone()
            .filter(|t| !t.id.trim().is_empty())
            .ok_or_else(|| self.missing("target device"))?;
        if target.description_url.trim().is_empty() {
            return Err(self.missing("target description URL"));
        }
        let source_id = non_blank(&self.source_id).ok_or_else(|| self.missing("content source"))?;
        let folder_id = non_blank(&self.folder_id).ok_or_else(|| self.missing("folder id"))?;

        Ok((
            target,
            ContentFolderRef {
                source_id,
                folder_id,
            },
        ))
    }

    fn missing(&self, field: &str) -> PlaybackError {
        PlaybackError::InvalidInput(format!("preset '{}' has no {}", self.name, field))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
