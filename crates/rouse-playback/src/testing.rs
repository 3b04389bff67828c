//! Test doubles for the control-plane collaborators

use async_trait::async_trait;
use chrono::Utc;
use rouse_core::{
    ActionInvoker, ActionResponse, BrowseItem, BrowseResource, BrowseResult, ContentBrowser,
    DescriptionFetcher, DeviceDescription, DeviceRef, HardwareAddress, RegistryEntry,
    ServiceDescription, ServiceEndpoint, UpstreamError,
};
use rouse_wake::{LivenessProbe, WakePacket, WakeSender};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub const TV_AV_CONTROL: &str = "http://192.168.1.20:1400/AVTransport/control";
pub const NAS_CD_CONTROL: &str = "http://192.168.1.5:8200/ctl/ContentDir";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub control_url: String,
    pub action: String,
    pub args: Vec<(String, String)>,
}

impl Invocation {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Records every call and answers from configurable canned responses
pub struct FakeControl {
    description: Mutex<Option<DeviceDescription>>,
    browse: Mutex<Result<BrowseResult, UpstreamError>>,
    /// (action, uri): fail `action`, only for that uri when given
    failures: Mutex<Vec<(String, Option<String>)>>,
    fetches: Mutex<Vec<String>>,
    browses: Mutex<Vec<(String, String)>>,
    invocations: Mutex<Vec<Invocation>>,
}

impl FakeControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            description: Mutex::new(None),
            browse: Mutex::new(Ok(BrowseResult::default())),
            failures: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
            browses: Mutex::new(Vec::new()),
            invocations: Mutex::new(Vec::new()),
        })
    }

    pub fn set_description(&self, description: Option<DeviceDescription>) {
        *self.description.lock() = description;
    }

    pub fn set_browse(&self, result: Result<BrowseResult, UpstreamError>) {
        *self.browse.lock() = result;
    }

    pub fn set_items(&self, items: Vec<BrowseItem>) {
        self.set_browse(Ok(BrowseResult {
            total_matches: Some(items.len() as u32),
            items,
        }));
    }

    pub fn fail(&self, action: &str, uri: Option<&str>) {
        self.failures.lock().push((action.to_string(), uri.map(str::to_string)));
    }

    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().clone()
    }

    pub fn browses(&self) -> Vec<(String, String)> {
        self.browses.lock().clone()
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.invocations().into_iter().map(|i| i.action).collect()
    }
}

#[async_trait]
impl DescriptionFetcher for FakeControl {
    async fn fetch_device_description(&self, base_url: &str) -> Option<DeviceDescription> {
        self.fetches.lock().push(base_url.to_string());
        self.description.lock().clone()
    }
}

#[async_trait]
impl ContentBrowser for FakeControl {
    async fn browse_folder(
        &self,
        control_url: &str,
        folder_id: &str,
    ) -> Result<BrowseResult, UpstreamError> {
        self.browses.lock().push((control_url.to_string(), folder_id.to_string()));
        // Let the other orchestration branch make progress first
        tokio::task::yield_now().await;
        self.browse.lock().clone()
    }
}

#[async_trait]
impl ActionInvoker for FakeControl {
    async fn invoke_action(
        &self,
        control_url: &str,
        _service_type: &str,
        action: &str,
        args: &[(&str, String)],
    ) -> Result<ActionResponse, UpstreamError> {
        let invocation = Invocation {
            control_url: control_url.to_string(),
            action: action.to_string(),
            args: args.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        };
        let fails = self.failures.lock().iter().any(|(a, uri)| {
            a == action
                && uri
                    .as_deref()
                    .map_or(true, |u| invocation.args.iter().any(|(_, v)| v == u))
        });
        self.invocations.lock().push(invocation);

        if fails {
            Err(UpstreamError::Fault {
                code: 701,
                description: "Transition not available".to_string(),
            })
        } else {
            Ok(Vec::new())
        }
    }
}

/// Wake sender that always reports `succeed`
pub struct StaticSender {
    pub succeed: bool,
    pub sent: AtomicUsize,
}

impl StaticSender {
    pub fn new(succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            succeed,
            sent: AtomicUsize::new(0),
        })
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WakeSender for StaticSender {
    async fn send(&self, _packet: &WakePacket, _broadcast: Ipv4Addr, _port: u16) -> bool {
        self.sent.fetch_add(1, Ordering::SeqCst);
        self.succeed
    }
}

/// Liveness probe with a fixed answer
pub struct StaticProbe {
    pub reachable: bool,
    pub calls: AtomicUsize,
}

impl StaticProbe {
    pub fn new(reachable: bool) -> Arc<Self> {
        Arc::new(Self {
            reachable,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LivenessProbe for StaticProbe {
    async fn probe(&self, _host: IpAddr, _timeout: Duration) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reachable
    }
}

pub fn tv_ref() -> DeviceRef {
    DeviceRef {
        id: "uuid:tv".to_string(),
        description_url: "http://192.168.1.20:1400/xml/device_description.xml".to_string(),
        ip: Ipv4Addr::new(192, 168, 1, 20),
        mac: HardwareAddress::new([0xAC, 0x5A, 0xF0, 0xE5, 0x8C, 0x25]),
        broadcast: Ipv4Addr::new(192, 168, 1, 255),
    }
}

pub fn tv_description() -> DeviceDescription {
    DeviceDescription {
        udn: Some("uuid:tv".to_string()),
        friendly_name: Some("Living Room TV".to_string()),
        model_name: Some("OLED55".to_string()),
        manufacturer: Some("Acme".to_string()),
        base_url: "http://192.168.1.20:1400/xml/device_description.xml".to_string(),
        services: vec![ServiceDescription {
            service_type: "urn:schemas-upnp-org:service:AVTransport:1".to_string(),
            control_url: Some("/AVTransport/control".to_string()),
            actions: Vec::new(),
        }],
    }
}

pub fn tv_entry() -> RegistryEntry {
    RegistryEntry {
        id: "uuid:tv".to_string(),
        friendly_name: "Living Room TV".to_string(),
        model_name: "OLED55".to_string(),
        base_url: "http://192.168.1.20:1400/".to_string(),
        last_seen: Utc::now(),
        services: vec![ServiceEndpoint {
            service_type: "urn:schemas-upnp-org:service:AVTransport:1".to_string(),
            control_url: Some(TV_AV_CONTROL.to_string()),
            actions: Vec::new(),
        }],
    }
}

pub fn nas_entry() -> RegistryEntry {
    RegistryEntry {
        id: "uuid:nas".to_string(),
        friendly_name: "NAS".to_string(),
        model_name: "MiniDLNA".to_string(),
        base_url: "http://192.168.1.5:8200/rootDesc.xml".to_string(),
        last_seen: Utc::now(),
        services: vec![ServiceEndpoint {
            service_type: "urn:schemas-upnp-org:service:ContentDirectory:1".to_string(),
            control_url: Some(NAS_CD_CONTROL.to_string()),
            actions: vec!["Browse".to_string()],
        }],
    }
}

pub fn video(id: &str, title: &str, uri: &str) -> BrowseItem {
    BrowseItem {
        id: id.to_string(),
        parent_id: Some("64".to_string()),
        title: Some(title.to_string()),
        class: "object.item.videoItem".to_string(),
        resources: vec![BrowseResource {
            uri: uri.to_string(),
            protocol_info: Some("http-get:*:video/mp4:*".to_string()),
        }],
    }
}

pub fn audio(id: &str, title: &str, uri: &str) -> BrowseItem {
    BrowseItem {
        class: "object.item.audioItem.musicTrack".to_string(),
        ..video(id, title, uri)
    }
}
