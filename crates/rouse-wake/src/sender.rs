//! UDP broadcast of wake packets

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use crate::packet::WakePacket;

/// Conventional discard port used for wake packets
pub const WAKE_PORT: u16 = 9;

#[async_trait]
pub trait WakeSender: Send + Sync {
    /// Transmit the packet once. Socket failures are reported as `false`.
    async fn send(&self, packet: &WakePacket, broadcast: Ipv4Addr, port: u16) -> bool;
}

/// Sends each packet from a fresh broadcast-enabled UDP socket
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpWakeSender;

#[async_trait]
impl WakeSender for UdpWakeSender {
    async fn send(&self, packet: &WakePacket, broadcast: Ipv4Addr, port: u16) -> bool {
        let target = SocketAddrV4::new(broadcast, port);
        match send_once(packet, target).await {
            Ok(sent) if sent == packet.as_bytes().len() => {
                debug!(target = %target, bytes = sent, "Wake packet transmitted");
                true
            }
            Ok(sent) => {
                warn!(target = %target, bytes = sent, "Wake packet truncated");
                false
            }
            Err(e) => {
                warn!(target = %target, error = %e, "Failed to send wake packet");
                false
            }
        }
    }
}

// The socket is closed when it goes out of scope, on every path
async fn send_once(packet: &WakePacket, target: SocketAddrV4) -> std::io::Result<usize> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;
    socket.send_to(packet.as_bytes(), target).await
}
