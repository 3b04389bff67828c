//! Folder browse to playback plan resolution

use quick_xml::escape::escape;
use rouse_core::device::CONTENT_DIRECTORY;
use rouse_core::{
    BrowseItem, BrowseResource, ContentBrowser, ContentFolderRef, DeviceRegistry, PlaybackError,
    PlaybackPlan, ResolvedPlayItem,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const BROWSE_ACTION: &str = "Browse";
const DEFAULT_PROTOCOL_INFO: &str = "http-get:*:*:*";

pub struct ContentResolver {
    registry: Arc<dyn DeviceRegistry>,
    browser: Arc<dyn ContentBrowser>,
}

impl ContentResolver {
    pub fn new(registry: Arc<dyn DeviceRegistry>, browser: Arc<dyn ContentBrowser>) -> Self {
        Self { registry, browser }
    }

    /// Browse `folder` and turn its playable children into an ordered plan.
    ///
    /// Items keep browse order. Items whose locator cannot be made absolute
    /// are dropped one by one; the call only fails when nothing survives.
    pub async fn resolve_folder(
        &self,
        folder: &ContentFolderRef,
    ) -> Result<PlaybackPlan, PlaybackError> {
        let source = self.registry.lookup(&folder.source_id).ok_or_else(|| {
            PlaybackError::ServiceUnavailable(format!(
                "content source {} is not known",
                folder.source_id
            ))
        })?;

        let (_, control_url) = source
            .usable_service(CONTENT_DIRECTORY, BROWSE_ACTION)
            .ok_or_else(|| {
                PlaybackError::ServiceUnavailable(format!(
                    "content source {} has no browsable content service",
                    folder.source_id
                ))
            })?;

        debug!(source = %folder.source_id, folder = %folder.folder_id, control_url, "Browsing folder");
        let result = self
            .browser
            .browse_folder(control_url, &folder.folder_id)
            .await
            .map_err(|e| {
                warn!(source = %folder.source_id, folder = %folder.folder_id, error = %e, "Browse failed");
                PlaybackError::BrowseFailure(format!("folder {}: {e}", folder.folder_id))
            })?;

        if result.items.is_empty() {
            return Err(PlaybackError::EmptyContent(format!(
                "folder {} is empty",
                folder.folder_id
            )));
        }

        let base = Url::parse(&source.base_url).ok();
        let browsed = result.items.len();
        let mut playable = 0;
        let mut items = Vec::new();

        for item in &result.items {
            let Some(resource) = item.primary_resource().filter(|_| item.is_video()) else {
                continue;
            };
            playable += 1;

            match absolute_locator(base.as_ref(), &resource.uri) {
                Some(uri) => items.push(ResolvedPlayItem {
                    metadata: didl_metadata(item, resource, &uri),
                    title: display_title(item).to_string(),
                    uri,
                }),
                None => {
                    warn!(item = %item.id, uri = %resource.uri, "Dropping item with unresolvable locator")
                }
            }
        }

        if playable == 0 {
            return Err(PlaybackError::EmptyContent(format!(
                "folder {} has no video items",
                folder.folder_id
            )));
        }

        let plan = PlaybackPlan::new(items).ok_or_else(|| {
            PlaybackError::EmptyContent(format!(
                "no item in folder {} has a usable locator",
                folder.folder_id
            ))
        })?;

        info!(
            source = %folder.source_id,
            folder = %folder.folder_id,
            browsed,
            resolved = plan.len(),
            "Folder resolved"
        );
        Ok(plan)
    }
}

fn display_title(item: &BrowseItem) -> &str {
    item.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&item.id)
}

/// Absolute http(s) locator for `uri`, joined onto `base` when relative
fn absolute_locator(base: Option<&Url>, uri: &str) -> Option<String> {
    let uri = uri.trim();
    let url = match Url::parse(uri) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(uri).ok()?,
        Err(_) => return None,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Minimal DIDL-Lite document for one item
fn didl_metadata(item: &BrowseItem, resource: &BrowseResource, uri: &str) -> String {
    let protocol_info = resource
        .protocol_info
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PROTOCOL_INFO);
    let parent_id = item.parent_id.as_deref().unwrap_or("-1");

    let mut didl = String::from(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#,
    );
    didl.push_str(&format!(
        r#"<item id="{}" parentID="{}" restricted="1">"#,
        escape(item.id.as_str()),
        escape(parent_id)
    ));
    didl.push_str(&format!(
        "<dc:title>{}</dc:title>",
        escape(display_title(item))
    ));
    didl.push_str(&format!(
        "<upnp:class>{}</upnp:class>",
        escape(item.class.as_str())
    ));
    didl.push_str(&format!(
        r#"<res protocolInfo="{}">{}</res>"#,
        escape(protocol_info),
        escape(uri)
    ));
    didl.push_str("</item></DIDL-Lite>");
    didl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{audio, nas_entry, video, FakeControl, NAS_CD_CONTROL};
    use rouse_core::{InMemoryRegistry, UpstreamError};

    fn folder() -> ContentFolderRef {
        ContentFolderRef {
            source_id: "uuid:nas".to_string(),
            folder_id: "64$1".to_string(),
        }
    }

    fn resolver(control: &Arc<FakeControl>) -> (ContentResolver, Arc<InMemoryRegistry>) {
        let registry = Arc::new(InMemoryRegistry::new());
        registry.insert(nas_entry());
        (ContentResolver::new(registry.clone(), control.clone()), registry)
    }

    #[tokio::test]
    async fn test_resolves_videos_in_browse_order() {
        let control = FakeControl::new();
        control.set_items(vec![
            video("3", "Third", "/media/3.mp4"),
            audio("9", "Song", "/media/9.mp3"),
            video("1", "First", "http://192.168.1.5:8200/media/1.mp4"),
            video("2", "Second", "media/2.mp4"),
        ]);
        let (resolver, _) = resolver(&control);

        let plan = resolver.resolve_folder(&folder()).await.unwrap();

        let uris: Vec<_> = plan.items().iter().map(|i| i.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "http://192.168.1.5:8200/media/3.mp4",
                "http://192.168.1.5:8200/media/1.mp4",
                "http://192.168.1.5:8200/media/2.mp4",
            ]
        );
        assert_eq!(plan.first().title, "Third");
        assert_eq!(
            control.browses(),
            vec![(NAS_CD_CONTROL.to_string(), "64$1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_metadata_envelope_is_escaped() {
        let control = FakeControl::new();
        let mut item = video("7", "Tom & Jerry <1>", "/media/a.mp4?x=1&y=2");
        item.resources[0].protocol_info = None;
        control.set_items(vec![item]);
        let (resolver, _) = resolver(&control);

        let plan = resolver.resolve_folder(&folder()).await.unwrap();
        let metadata = &plan.first().metadata;

        assert!(metadata.starts_with("<DIDL-Lite"));
        assert!(metadata.contains("<dc:title>Tom &amp; Jerry &lt;1&gt;</dc:title>"));
        assert!(metadata.contains("<upnp:class>object.item.videoItem</upnp:class>"));
        assert!(metadata.contains(r#"protocolInfo="http-get:*:*:*""#));
        assert!(metadata.contains("http://192.168.1.5:8200/media/a.mp4?x=1&amp;y=2</res>"));
    }

    #[tokio::test]
    async fn test_unknown_source_is_unavailable() {
        let control = FakeControl::new();
        let resolver = ContentResolver::new(Arc::new(InMemoryRegistry::new()), control.clone());

        let err = resolver.resolve_folder(&folder()).await.unwrap_err();

        assert!(matches!(err, PlaybackError::ServiceUnavailable(_)));
        assert!(control.browses().is_empty());
    }

    #[tokio::test]
    async fn test_source_without_browse_service_is_unavailable() {
        let control = FakeControl::new();
        let registry = Arc::new(InMemoryRegistry::new());
        let mut nas = nas_entry();
        nas.services[0].control_url = None;
        registry.insert(nas);
        let resolver = ContentResolver::new(registry, control.clone());

        let err = resolver.resolve_folder(&folder()).await.unwrap_err();

        assert_eq!(err.status_code(), 503);
        assert!(control.browses().is_empty());
    }

    #[tokio::test]
    async fn test_browse_fault_is_browse_failure() {
        let control = FakeControl::new();
        control.set_browse(Err(UpstreamError::Fault {
            code: 701,
            description: "No such object".to_string(),
        }));
        let (resolver, _) = resolver(&control);

        let err = resolver.resolve_folder(&folder()).await.unwrap_err();

        assert!(matches!(err, PlaybackError::BrowseFailure(_)));
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_empty_and_videoless_folders() {
        let control = FakeControl::new();
        let (resolver, _) = resolver(&control);

        let err = resolver.resolve_folder(&folder()).await.unwrap_err();
        assert!(matches!(err, PlaybackError::EmptyContent(_)));

        let mut no_resource = video("2", "Broken", "");
        no_resource.resources.clear();
        control.set_items(vec![audio("1", "Song", "/a.mp3"), no_resource]);
        let err = resolver.resolve_folder(&folder()).await.unwrap_err();
        assert!(matches!(err, PlaybackError::EmptyContent(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_unresolvable_locators_are_dropped() {
        let control = FakeControl::new();
        let registry = Arc::new(InMemoryRegistry::new());
        let mut nas = nas_entry();
        nas.base_url = String::new();
        registry.insert(nas);
        let resolver = ContentResolver::new(registry, control.clone());

        control.set_items(vec![
            video("1", "Relative", "/media/1.mp4"),
            video("2", "Absolute", "http://192.168.1.5:8200/media/2.mp4"),
            video("3", "Odd", "rtsp://192.168.1.5/live"),
        ]);
        let plan = resolver.resolve_folder(&folder()).await.unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.first().title, "Absolute");

        control.set_items(vec![video("1", "Relative", "/media/1.mp4")]);
        let err = resolver.resolve_folder(&folder()).await.unwrap_err();
        assert!(matches!(err, PlaybackError::EmptyContent(_)));
    }

    #[test]
    fn test_title_falls_back_to_id() {
        let mut item = video("42", "  ", "/x.mp4");
        assert_eq!(display_title(&item), "42");
        item.title = None;
        assert_eq!(display_title(&item), "42");
    }
}
