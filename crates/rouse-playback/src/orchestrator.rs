//! Preset playback: make the renderer ready while resolving content, then play

use rouse_core::{
    ActionInvoker, ContentBrowser, DescriptionFetcher, DeviceRef, DeviceRegistry, PlaybackError,
    PlaybackPlan, PlaybackResult, Preset, RegistryEntry,
};
use rouse_wake::{ProbeSchedule, WakeCoordinator, WakeRequest, WAKE_PORT};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::resolver::ContentResolver;
use crate::revival::DeviceRevival;
use crate::sequencer::PlaybackSequencer;

/// Wake parameters applied when a preset's renderer is not registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSettings {
    pub port: u16,
    pub pre_delay: Duration,
    pub schedule: ProbeSchedule,
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            port: WAKE_PORT,
            pre_delay: Duration::from_secs(5),
            schedule: ProbeSchedule::default(),
        }
    }
}

/// External control-plane services the player depends on
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn DeviceRegistry>,
    pub fetcher: Arc<dyn DescriptionFetcher>,
    pub browser: Arc<dyn ContentBrowser>,
    pub invoker: Arc<dyn ActionInvoker>,
}

pub struct PresetPlayer {
    registry: Arc<dyn DeviceRegistry>,
    coordinator: Arc<WakeCoordinator>,
    wake: WakeSettings,
    revival: DeviceRevival,
    resolver: ContentResolver,
    sequencer: PlaybackSequencer,
}

impl PresetPlayer {
    pub fn new(
        collaborators: Collaborators,
        coordinator: Arc<WakeCoordinator>,
        wake: WakeSettings,
    ) -> Self {
        let Collaborators {
            registry,
            fetcher,
            browser,
            invoker,
        } = collaborators;
        Self {
            revival: DeviceRevival::new(fetcher, registry.clone()),
            resolver: ContentResolver::new(registry.clone(), browser),
            sequencer: PlaybackSequencer::new(registry.clone(), invoker),
            registry,
            coordinator,
            wake,
        }
    }

    /// Run a preset and fold any failure into a structured result
    pub async fn play_preset(&self, preset: &Preset) -> PlaybackResult {
        match self.run(preset).await {
            Ok(result) => result,
            Err(e) => {
                error!(preset = %preset.name, status = e.status_code(), "Preset playback failed: {e}");
                PlaybackResult::failed(&e)
            }
        }
    }

    /// Validate, then run readiness and content resolution side by side.
    ///
    /// Both branches always run to completion. When both fail, the readiness
    /// error is reported.
    pub async fn run(&self, preset: &Preset) -> Result<PlaybackResult, PlaybackError> {
        let (target, folder) = preset.validate()?;
        info!(
            preset = %preset.name,
            target = %target.id,
            source = %folder.source_id,
            folder = %folder.folder_id,
            "Starting preset"
        );

        let (ready, content) = tokio::join!(
            self.ensure_ready(&target),
            self.resolver.resolve_folder(&folder)
        );

        let (entry, plan): (RegistryEntry, PlaybackPlan) = match (ready, content) {
            (Ok(entry), Ok(plan)) => (entry, plan),
            (Err(e), _) | (Ok(_), Err(e)) => return Err(e),
        };

        self.sequencer.play(&entry.id, &plan).await
    }

    /// Registry entry for `target`, waking and reviving it first if needed
    async fn ensure_ready(&self, target: &DeviceRef) -> Result<RegistryEntry, PlaybackError> {
        if let Some(entry) = self.registry.lookup(&target.id) {
            return Ok(entry);
        }

        info!(target = %target.id, ip = %target.ip, "Renderer not registered, waking it");
        let request = WakeRequest {
            broadcast: target.broadcast,
            port: self.wake.port,
            pre_delay: self.wake.pre_delay,
            schedule: self.wake.schedule,
            ..WakeRequest::new(target.ip, target.mac)
        };
        self.coordinator.wake(&request).await.into_result()?;
        self.revival.revive(target).await?;

        self.registry.lookup(&target.id).ok_or_else(|| {
            PlaybackError::ServiceUnavailable(format!(
                "renderer {} is still not registered after revival",
                target.id
            ))
        })
    }
}
