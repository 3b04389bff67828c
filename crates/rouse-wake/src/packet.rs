//! Wake packet layout

use rouse_core::{HardwareAddress, PlaybackError};

/// 6 sync bytes followed by 16 copies of the 6-byte address
pub const WAKE_PACKET_LEN: usize = 6 + 16 * 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePacket([u8; WAKE_PACKET_LEN]);

impl WakePacket {
    pub fn new(mac: HardwareAddress) -> Self {
        let mut payload = [0xFFu8; WAKE_PACKET_LEN];
        let octets = mac.octets();
        for chunk in payload[6..].chunks_exact_mut(6) {
            chunk.copy_from_slice(&octets);
        }
        Self(payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Build a wake packet from a textual hardware address
pub fn build_packet(mac: &str) -> Result<WakePacket, PlaybackError> {
    HardwareAddress::parse(mac)
        .map(WakePacket::new)
        .map_err(|e| PlaybackError::InvalidInput(format!("{mac:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_layout() {
        let packet = build_packet("AC:5A:F0:E5:8C:25").unwrap();
        let bytes = packet.as_bytes();

        assert_eq!(bytes.len(), 102);
        assert_eq!(&bytes[..6], &[0xFF; 6]);
        for rep in bytes[6..].chunks(6) {
            assert_eq!(rep, &[0xAC, 0x5A, 0xF0, 0xE5, 0x8C, 0x25]);
        }
    }

    #[test]
    fn test_packet_ignores_separator_style() {
        let canonical = build_packet("AC:5A:F0:E5:8C:25").unwrap();
        assert_eq!(build_packet("ac-5a-f0-e5-8c-25").unwrap(), canonical);
        assert_eq!(build_packet("ac5aF0E58C25").unwrap(), canonical);
    }

    #[test]
    fn test_packet_with_ff_address() {
        // The sync header must not be confused with an all-ones address
        let packet = build_packet("FF:FF:FF:FF:FF:FF").unwrap();
        assert!(packet.as_bytes().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_invalid_address_is_invalid_input() {
        for bad in ["", "AC:5A:F0:E5:8C", "AC:5A:F0:E5:8C:ZZ", "not a mac"] {
            assert!(
                matches!(build_packet(bad), Err(PlaybackError::InvalidInput(_))),
                "{bad}"
            );
        }
    }
}
