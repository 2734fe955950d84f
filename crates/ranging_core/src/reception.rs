//! Tratamento das respostas do nó de referência.
//!
//! A thread `link-rx` entrega datagramas numa fila bounded; a thread
//! `reception` drena a fila e escreve uma linha `Distance:<valor>` por
//! resposta válida. O tamanho exato é o único filtro de admissão.

use crate::protocol::{decode_response, format_distance_line};
use crate::types::InboundDatagram;
use crossbeam_channel::Receiver;
use std::io::Write;
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Decodifica respostas e escreve as distâncias no sink.
pub struct ReceptionHandler<W: Write> {
    sink: W,
    /// Após o primeiro erro de escrita (ex.: pipe fechado) o sink não é mais usado
    sink_closed: bool,
}

impl<W: Write> ReceptionHandler<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            sink_closed: false,
        }
    }

    pub fn is_sink_closed(&self) -> bool {
        self.sink_closed
    }

    /// Processa um datagrama. Retorna a distância aceita, se houver.
    pub fn handle(&mut self, datagram: &InboundDatagram) -> Option<f64> {
        let response = match decode_response(&datagram.data) {
            Ok(r) => r,
            Err(e) => {
                debug!("Descartando datagrama de {}: {e}", datagram.source);
                return None;
            }
        };

        if !self.sink_closed {
            let line = format_distance_line(response.distance);
            if let Err(e) = writeln!(self.sink, "{line}").and_then(|_| self.sink.flush()) {
                warn!("Erro ao escrever saída, medições não serão mais impressas: {e}");
                self.sink_closed = true;
            }
        }
        Some(response.distance)
    }

    /// Drena a fila até o lado emissor ser encerrado.
    pub fn drain(&mut self, rx: &Receiver<InboundDatagram>) {
        for datagram in rx.iter() {
            self.handle(&datagram);
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Inicia a thread de recepção sobre a fila entregue pelo link.
pub fn spawn_reception_thread<W>(
    rx: Receiver<InboundDatagram>,
    sink: W,
) -> std::io::Result<JoinHandle<()>>
where
    W: Write + Send + 'static,
{
    std::thread::Builder::new()
        .name("reception".into())
        .spawn(move || {
            ReceptionHandler::new(sink).drain(&rx);
            debug!("Fila de recepção encerrada");
        })
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{RESPONSE_SIZE, encode_response};
    use crate::types::{MacAddress, ResponseDatagram};
    use crossbeam_channel::bounded;
    use std::sync::{Arc, Mutex};

    const REFERENCE: MacAddress = MacAddress::new([0x98, 0xA3, 0x16, 0xEB, 0xE6, 0xCC]);

    fn datagram(data: Vec<u8>) -> InboundDatagram {
        InboundDatagram {
            source: REFERENCE,
            data,
        }
    }

    fn output(handler: ReceptionHandler<Vec<u8>>) -> String {
        String::from_utf8(handler.into_inner()).unwrap()
    }

    /// Sink compartilhado para inspecionar a saída de outra thread.
    #[derive(Clone, Default)]
    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Sink que sempre falha com pipe fechado e conta as tentativas.
    #[derive(Default)]
    struct ClosedPipe {
        attempts: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.attempts += 1;
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_sink_is_written_only_once() {
        let mut handler = ReceptionHandler::new(ClosedPipe::default());
        let bytes = 1.0f64.to_le_bytes().to_vec();

        for _ in 0..1000 {
            assert_eq!(handler.handle(&datagram(bytes.clone())), Some(1.0));
        }

        assert!(handler.is_sink_closed());
        assert_eq!(handler.into_inner().attempts, 1);
    }

    #[test]
    fn valid_response_prints_one_line() {
        let mut handler = ReceptionHandler::new(Vec::new());
        let accepted = handler.handle(&datagram(12.34f64.to_le_bytes().to_vec()));
        assert_eq!(accepted, Some(12.34));
        assert_eq!(output(handler), "Distance:12.34\n");
    }

    #[test]
    fn wrong_lengths_print_nothing() {
        let mut handler = ReceptionHandler::new(Vec::new());
        for len in (0..=64).filter(|&l| l != RESPONSE_SIZE) {
            assert_eq!(handler.handle(&datagram(vec![0x41; len])), None);
        }
        assert!(output(handler).is_empty());
    }

    #[test]
    fn poll_echo_is_not_a_response() {
        let mut handler = ReceptionHandler::new(Vec::new());
        assert_eq!(handler.handle(&datagram(crate::protocol::POLL_DATAGRAM.to_vec())), None);
        assert!(output(handler).is_empty());
    }

    #[test]
    fn each_datagram_is_independent() {
        let mut handler = ReceptionHandler::new(Vec::new());
        for d in [0.0, 1.0, 2.5, 1.0] {
            let bytes = encode_response(&ResponseDatagram { distance: d }).unwrap();
            handler.handle(&datagram(bytes));
        }
        assert_eq!(
            output(handler),
            "Distance:0.00\nDistance:1.00\nDistance:2.50\nDistance:1.00\n"
        );
    }

    #[test]
    fn reception_thread_drains_queue() {
        let (tx, rx) = bounded(8);
        let sink = SharedSink::default();
        let handle = spawn_reception_thread(rx, sink.clone()).unwrap();

        tx.send(datagram(vec![1, 2, 3])).unwrap();
        tx.send(datagram(999_999.99f64.to_le_bytes().to_vec())).unwrap();
        drop(tx);
        handle.join().unwrap();

        let text = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "Distance:999999.99\n");
    }
}
