//! Error taxonomy shared by the wake and playback paths

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Failure reported by an external control-plane collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("UPnP error {code}: {description}")]
    Fault { code: u32, description: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("No reply within {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    /// Fault code returned by the device, when it sent one
    pub fn fault_code(&self) -> Option<u32> {
        match self {
            Self::Fault { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Errors that end a wake or playback orchestration.
///
/// Best-effort command failures never become a `PlaybackError`; they are
/// logged where they happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Wake packet could not be sent: {0}")]
    WakeSendFailure(String),
    #[error("Device offline: {0}")]
    ProbeExhausted(String),
    #[error("Wake deadline exceeded: {0}")]
    DeadlineExceeded(String),
    #[error("Device revival failed: {0}")]
    RevivalFailure(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Browse failed: {0}")]
    BrowseFailure(String),
    #[error("No playable content: {0}")]
    EmptyContent(String),
    #[error("{action} failed: {source}")]
    PlaybackCommandFailure {
        action: String,
        source: UpstreamError,
    },
}

impl PlaybackError {
    /// HTTP-style status hint for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::EmptyContent(_) => 404,
            Self::WakeSendFailure(_) => 500,
            Self::RevivalFailure(_) | Self::BrowseFailure(_) => 502,
            Self::PlaybackCommandFailure { .. } => 502,
            Self::ServiceUnavailable(_) => 503,
            Self::ProbeExhausted(_) | Self::DeadlineExceeded(_) => 504,
        }
    }

    /// Whether repeating the same request may succeed without changes
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidInput(_) | Self::EmptyContent(_) | Self::PlaybackCommandFailure { .. }
        )
    }
}

/// Structured outcome of a playback orchestration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackResult {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    /// Follow-up items accepted by the renderer
    pub queued: usize,
    /// Follow-up items the renderer rejected
    pub skipped: usize,
}

impl PlaybackResult {
    pub fn started(items: usize, queued: usize, skipped: usize) -> Self {
        Self {
            success: true,
            message: format!("playback started for {items} items"),
            status_code: 200,
            queued,
            skipped,
        }
    }

    pub fn failed(error: &PlaybackError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            status_code: error.status_code(),
            queued: 0,
            skipped: 0,
        }
    }
}
