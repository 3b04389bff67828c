//! Transport command sequence for starting a playback plan on a renderer

use rouse_core::device::AV_TRANSPORT;
use rouse_core::{
    ActionInvoker, DeviceRegistry, PlaybackError, PlaybackPlan, PlaybackResult, ResolvedPlayItem,
    UpstreamError,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const INSTANCE_ID: &str = "0";
const PLAY_SPEED: &str = "1";

/// How a failed command affects the rest of the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Failure aborts the sequence
    Required,
    /// Failure is logged and the sequence continues
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stop,
    SetUri,
    Play,
    SetNextUri,
}

impl Command {
    fn action(self) -> &'static str {
        match self {
            Self::Stop => "Stop",
            Self::SetUri => "SetAVTransportURI",
            Self::Play => "Play",
            Self::SetNextUri => "SetNextAVTransportURI",
        }
    }

    fn step(self) -> Step {
        match self {
            Self::Stop | Self::SetNextUri => Step::BestEffort,
            Self::SetUri | Self::Play => Step::Required,
        }
    }

    fn args(self, item: Option<&ResolvedPlayItem>) -> Vec<(&'static str, String)> {
        let mut args = vec![("InstanceID", INSTANCE_ID.to_string())];
        match (self, item) {
            (Self::SetUri, Some(item)) => {
                args.push(("CurrentURI", item.uri.clone()));
                args.push(("CurrentURIMetaData", item.metadata.clone()));
            }
            (Self::SetNextUri, Some(item)) => {
                args.push(("NextURI", item.uri.clone()));
                args.push(("NextURIMetaData", item.metadata.clone()));
            }
            (Self::Play, _) => args.push(("Speed", PLAY_SPEED.to_string())),
            _ => {}
        }
        args
    }
}

pub struct PlaybackSequencer {
    registry: Arc<dyn DeviceRegistry>,
    invoker: Arc<dyn ActionInvoker>,
}

struct Transport<'a> {
    control_url: &'a str,
    service_type: &'a str,
}

impl PlaybackSequencer {
    pub fn new(registry: Arc<dyn DeviceRegistry>, invoker: Arc<dyn ActionInvoker>) -> Self {
        Self { registry, invoker }
    }

    /// Stop, load the first item, start it, then queue the rest.
    ///
    /// Only the load and start commands can fail the call; a rejected stop or
    /// follow-up item is logged and counted in `skipped`.
    pub async fn play(
        &self,
        target_id: &str,
        plan: &PlaybackPlan,
    ) -> Result<PlaybackResult, PlaybackError> {
        let target = self.registry.lookup(target_id).ok_or_else(|| {
            PlaybackError::ServiceUnavailable(format!("renderer {target_id} is not known"))
        })?;
        let (service, control_url) = target
            .usable_service(AV_TRANSPORT, Command::SetUri.action())
            .ok_or_else(|| {
                PlaybackError::ServiceUnavailable(format!(
                    "renderer {target_id} has no transport control service"
                ))
            })?;
        let transport = Transport {
            control_url,
            service_type: &service.service_type,
        };

        self.run(&transport, Command::Stop, None).await?;
        self.run(&transport, Command::SetUri, Some(plan.first())).await?;
        self.run(&transport, Command::Play, None).await?;

        let mut queued = 0;
        let mut skipped = 0;
        for item in plan.rest() {
            if self.run(&transport, Command::SetNextUri, Some(item)).await? {
                queued += 1;
            } else {
                skipped += 1;
            }
        }

        info!(
            renderer = target_id,
            items = plan.len(),
            queued,
            skipped,
            "Playback started"
        );
        Ok(PlaybackResult::started(plan.len(), queued, skipped))
    }

    /// Invoke one command; `Ok(false)` is a swallowed best-effort failure
    async fn run(
        &self,
        transport: &Transport<'_>,
        command: Command,
        item: Option<&ResolvedPlayItem>,
    ) -> Result<bool, PlaybackError> {
        let action = command.action();
        let args = command.args(item);
        debug!(action, uri = item.map(|i| i.uri.as_str()), "Invoking transport action");

        match self
            .invoker
            .invoke_action(transport.control_url, transport.service_type, action, &args)
            .await
        {
            Ok(_) => Ok(true),
            Err(source) => match command.step() {
                Step::BestEffort => {
                    log_ignored(action, item, &source);
                    Ok(false)
                }
                Step::Required => {
                    warn!(action, error = %source, "Required transport action failed");
                    Err(PlaybackError::PlaybackCommandFailure {
                        action: action.to_string(),
                        source,
                    })
                }
            },
        }
    }
}

fn log_ignored(action: &str, item: Option<&ResolvedPlayItem>, error: &UpstreamError) {
    match item {
        Some(item) => warn!(action, title = %item.title, error = %error, "Skipping playlist item"),
        None => debug!(action, error = %error, "Ignoring best-effort action failure"),
    }
}
