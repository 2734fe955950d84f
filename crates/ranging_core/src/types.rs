//! Tipos compartilhados entre o poller, o utilitário de identidade e o monitor.
//!
//! O payload de resposta é a struct `{ double distance; }` do nó de referência,
//! serializada com bincode (8 bytes little-endian, sem header).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Endereço de hardware
// ──────────────────────────────────────────────

/// Endereço de hardware (MAC) de 6 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const LEN: usize = 6;

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Lê um endereço a partir dos 6 primeiros bytes de um frame.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let head: [u8; 6] = bytes.get(..Self::LEN)?.try_into().ok()?;
        Some(Self(head))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Erro ao interpretar um MAC em texto.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("MAC inválido: '{0}' (esperado XX:XX:XX:XX:XX:XX)")]
pub struct ParseMacError(pub String);

impl FromStr for MacAddress {
    type Err = ParseMacError;

    /// Aceita `:` ou `-` como separador, maiúsculas ou minúsculas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMacError(s.to_string());
        let mut bytes = [0u8; 6];
        let mut parts = s.trim().split([':', '-']);

        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(err)?;
            if part.len() != 2 {
                return Err(err());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| err())?;
        }

        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self(bytes))
    }
}

// ──────────────────────────────────────────────
// Peer
// ──────────────────────────────────────────────

/// Registro de peer no link: endereço, canal e criptografia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerInfo {
    pub mac: MacAddress,
    pub channel: u8,
    pub encrypt: bool,
}

impl PeerInfo {
    /// Peer sem criptografia no canal informado.
    pub fn unencrypted(mac: MacAddress, channel: u8) -> Self {
        Self {
            mac,
            channel,
            encrypt: false,
        }
    }
}

// ──────────────────────────────────────────────
// Datagramas
// ──────────────────────────────────────────────

/// Datagrama recebido pelo link, entregue à thread de recepção.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundDatagram {
    /// Endereço de quem enviou (ignorado na admissão)
    pub source: MacAddress,
    pub data: Vec<u8>,
}

/// Resposta do nó de referência: uma única distância em metros.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseDatagram {
    pub distance: f64,
}

/// Resultado de uma tentativa de envio no link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    /// Fila de saída do link sem slot livre
    QueueFull,
    OtherFailure,
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_display_is_uppercase_colon() {
        let mac = MacAddress::new([0x98, 0xA3, 0x16, 0xEB, 0xE6, 0xCC]);
        assert_eq!(mac.to_string(), "98:A3:16:EB:E6:CC");
    }

    #[test]
    fn mac_parse_accepts_both_separators() {
        let expected = MacAddress::new([0x98, 0xA3, 0x16, 0xEB, 0xE6, 0xCC]);
        assert_eq!("98:a3:16:eb:e6:cc".parse::<MacAddress>().unwrap(), expected);
        assert_eq!("98-A3-16-EB-E6-CC".parse::<MacAddress>().unwrap(), expected);
    }

    #[test]
    fn mac_parse_rejects_malformed() {
        for bad in ["", "98:A3:16:EB:E6", "98:A3:16:EB:E6:CC:00", "98:A3:16:EB:E6:ZZ", "983:16:EB:E6:CC:0"] {
            assert!(bad.parse::<MacAddress>().is_err(), "deveria rejeitar '{bad}'");
        }
    }

    #[test]
    fn mac_from_short_slice_is_none() {
        assert!(MacAddress::from_slice(&[1, 2, 3]).is_none());
        assert_eq!(
            MacAddress::from_slice(&[1, 2, 3, 4, 5, 6, 7]),
            Some(MacAddress::new([1, 2, 3, 4, 5, 6]))
        );
    }

    #[test]
    fn response_is_eight_bytes_bincode() {
        let bytes = bincode::serialize(&ResponseDatagram { distance: 1.5 }).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes, 1.5f64.to_le_bytes());
    }
}
