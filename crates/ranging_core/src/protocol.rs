//! Protocolo de ranging.
//!
//! ```text
//! Poll (poller → referência):    "POLL\0"              5 bytes
//! Resposta (referência → poller): f64 little-endian    8 bytes
//! ```
//!
//! Sem header, sem número de sequência e sem checksum: a resposta é válida
//! somente pelo tamanho exato. Poll e resposta se correlacionam apenas pelo tempo.

use crate::types::ResponseDatagram;

/// Conteúdo fixo do poll (inclui o terminador nulo).
pub const POLL_DATAGRAM: &[u8; 5] = b"POLL\0";

/// Tamanho exato de uma resposta válida.
pub const RESPONSE_SIZE: usize = std::mem::size_of::<f64>();

/// Payload máximo de um datagrama no link de rádio.
pub const MAX_LINK_PAYLOAD: usize = 250;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Tamanho de resposta inválido ({0} bytes, esperado {RESPONSE_SIZE})")]
    WrongLength(usize),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Codifica uma resposta no layout do nó de referência.
pub fn encode_response(response: &ResponseDatagram) -> Result<Vec<u8>, ProtocolError> {
    bincode::serialize(response).map_err(|e| ProtocolError::Serialize(e.to_string()))
}

/// Decodifica uma resposta. O tamanho é o único filtro de admissão.
pub fn decode_response(data: &[u8]) -> Result<ResponseDatagram, ProtocolError> {
    if data.len() != RESPONSE_SIZE {
        return Err(ProtocolError::WrongLength(data.len()));
    }
    bincode::deserialize(data).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

/// Formata a linha de saída de uma medição (sem o terminador).
///
/// Valores não finitos saem como `nan`, `inf` e `-inf`, igual ao `%.2f` do firmware.
pub fn format_distance_line(distance: f64) -> String {
    if distance.is_nan() {
        "Distance:nan".to_string()
    } else if distance.is_infinite() {
        let sign = if distance < 0.0 { "-" } else { "" };
        format!("Distance:{sign}inf")
    } else {
        format!("Distance:{distance:.2}")
    }
}

/// Interpreta uma linha `Distance:<valor>` produzida pelo poller.
///
/// Linhas com outro prefixo ou valor não numérico retornam `None`.
pub fn parse_distance_line(line: &str) -> Option<f64> {
    let value = line.trim().strip_prefix("Distance:")?;
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_is_five_bytes_with_terminator() {
        assert_eq!(POLL_DATAGRAM.len(), 5);
        assert_eq!(POLL_DATAGRAM[4], 0);
        assert!(POLL_DATAGRAM.len() <= MAX_LINK_PAYLOAD);
    }

    #[test]
    fn decode_known_bytes() {
        let decoded = decode_response(&12.34f64.to_le_bytes()).unwrap();
        assert_eq!(format_distance_line(decoded.distance), "Distance:12.34");
    }

    #[test]
    fn representative_values_survive_at_two_decimals() {
        for value in [0.00, 1.00, 999_999.99] {
            let encoded = encode_response(&ResponseDatagram { distance: value }).unwrap();
            assert_eq!(encoded.len(), RESPONSE_SIZE);
            let decoded = decode_response(&encoded).unwrap();
            assert_eq!(format!("{:.2}", decoded.distance), format!("{value:.2}"));
        }
    }

    #[test]
    fn rejects_every_other_length() {
        let buf = [0u8; 32];
        for len in (0..=buf.len()).filter(|&l| l != RESPONSE_SIZE) {
            assert!(matches!(
                decode_response(&buf[..len]),
                Err(ProtocolError::WrongLength(l)) if l == len
            ));
        }
    }

    #[test]
    fn parse_line_accepts_poller_output() {
        assert_eq!(parse_distance_line("Distance:12.34"), Some(12.34));
        assert_eq!(parse_distance_line("  Distance:0.50\r\n"), Some(0.5));
    }

    #[test]
    fn parse_line_ignores_noise() {
        assert_eq!(parse_distance_line("I (312) GATEWAY_NODE: init"), None);
        assert_eq!(parse_distance_line("Distance:"), None);
        assert_eq!(parse_distance_line("Distance:abc"), None);
        assert_eq!(parse_distance_line("Distance:NaN"), None);
    }

    #[test]
    fn non_finite_values_use_firmware_spelling() {
        assert_eq!(format_distance_line(f64::NAN), "Distance:nan");
        assert_eq!(format_distance_line(f64::INFINITY), "Distance:inf");
        assert_eq!(format_distance_line(f64::NEG_INFINITY), "Distance:-inf");
        assert_eq!(parse_distance_line(&format_distance_line(f64::NAN)), None);
    }

    #[test]
    fn formatted_line_parses_back() {
        let line = format_distance_line(3.457);
        assert_eq!(line, "Distance:3.46");
        assert_eq!(parse_distance_line(&line), Some(3.46));
    }
}
