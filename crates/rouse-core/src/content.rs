//! Content browse results and playback plans

use serde::{Deserialize, Serialize};

/// UPnP class prefix of playable video items
pub const VIDEO_ITEM_CLASS: &str = "object.item.videoItem";

/// A folder on a content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFolderRef {
    pub source_id: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseResource {
    /// Locator as published by the source, possibly relative
    pub uri: String,
    /// Protocol hint, e.g. `http-get:*:video/mp4:*`
    pub protocol_info: Option<String>,
}

/// One direct child returned by a folder browse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub title: Option<String>,
    pub class: String,
    #[serde(default)]
    pub resources: Vec<BrowseResource>,
}

impl BrowseItem {
    pub fn is_video(&self) -> bool {
        self.class.starts_with(VIDEO_ITEM_CLASS)
    }

    /// First resource carrying a non-empty locator
    pub fn primary_resource(&self) -> Option<&BrowseResource> {
        self.resources.iter().find(|r| !r.uri.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseResult {
    pub items: Vec<BrowseItem>,
    pub total_matches: Option<u32>,
}

/// A playable item with an absolute locator and its metadata envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlayItem {
    pub uri: String,
    /// DIDL-Lite document describing the item
    pub metadata: String,
    pub title: String,
}

/// Ordered, non-empty list of items; the first one is started, the rest queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackPlan(Vec<ResolvedPlayItem>);

impl PlaybackPlan {
    /// Returns `None` for an empty list
    pub fn new(items: Vec<ResolvedPlayItem>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn first(&self) -> &ResolvedPlayItem {
        &self.0[0]
    }

    pub fn rest(&self) -> &[ResolvedPlayItem] {
        &self.0[1..]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn items(&self) -> &[ResolvedPlayItem] {
        &self.0
    }
}
