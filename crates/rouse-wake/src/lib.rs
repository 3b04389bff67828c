//! Rouse Wake - Wake a sleeping device and confirm it came up
//!
//! This crate provides:
//! - Wake packet construction from a hardware address
//! - A UDP broadcast sender for wake packets
//! - A bounded liveness probe and a fixed-interval probe loop
//! - The coordinator that sequences send, delay and probing under a deadline

pub mod coordinator;
pub mod packet;
pub mod probe;
pub mod sender;

pub use coordinator::{WakeCoordinator, WakeOutcome, WakeRequest, WakeStatus, DEFAULT_DEADLINE_BUFFER};
pub use packet::{build_packet, WakePacket, WAKE_PACKET_LEN};
pub use probe::{LivenessProbe, PingProbe, ProbeLoop, ProbeReport, ProbeResult, ProbeSchedule};
pub use sender::{UdpWakeSender, WakeSender, WAKE_PORT};
