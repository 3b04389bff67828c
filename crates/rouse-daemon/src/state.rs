//! Application state management

use rouse_playback::{Collaborators, PresetPlayer};
use rouse_wake::WakeCoordinator;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Wake coordinator used by the wake endpoint and the preset player
    pub coordinator: Arc<WakeCoordinator>,
    /// Preset player, present once a control-plane adapter is attached
    pub player: Option<Arc<PresetPlayer>>,
}

impl AppState {
    /// State backed by UDP broadcast and the system `ping`
    pub fn new(config: Config) -> Arc<Self> {
        let coordinator =
            WakeCoordinator::system().with_deadline_buffer(config.wake.deadline_buffer());
        Self::with_coordinator(config, coordinator)
    }

    pub fn with_coordinator(config: Config, coordinator: WakeCoordinator) -> Arc<Self> {
        Arc::new(Self {
            config,
            coordinator: Arc::new(coordinator),
            player: None,
        })
    }

    /// Attach the control-plane collaborators that enable preset playback
    pub fn with_collaborators(
        config: Config,
        coordinator: WakeCoordinator,
        collaborators: Collaborators,
    ) -> Arc<Self> {
        let coordinator = Arc::new(coordinator);
        let player = PresetPlayer::new(collaborators, coordinator.clone(), config.wake.settings());
        info!(presets = config.presets.len(), "Preset playback enabled");
        Arc::new(Self {
            config,
            coordinator,
            player: Some(Arc::new(player)),
        })
    }
}
