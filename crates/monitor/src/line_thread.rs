//! Thread que lê a saída do poller e envia medições para a UI via channel.

use crossbeam_channel::{Receiver, Sender, bounded};
use ranging_core::protocol::parse_distance_line;
use std::io::BufRead;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Medição enviada da thread de leitura para a UI.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// Segundos desde o início do monitor
    pub time_secs: f64,
    pub distance: f64,
}

/// Inicia a thread de leitura do stdin. Retorna o receiver do channel.
pub fn spawn_stdin_thread() -> Receiver<Measurement> {
    let (tx, rx) = bounded::<Measurement>(256);

    let spawned = std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            read_lines(stdin.lock(), &tx, Instant::now());
        });
    if let Err(e) = spawned {
        warn!("Falha ao criar thread de leitura: {e}");
    }

    rx
}

/// Lê linhas até EOF, encaminhando as medições válidas.
pub fn read_lines<R: BufRead>(reader: R, tx: &Sender<Measurement>, start: Instant) {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("Erro ao ler stdin: {e}");
                break;
            }
        };

        let Some(distance) = parse_distance_line(&line) else {
            debug!("Ignorando linha: {line}");
            continue;
        };

        let time_secs = start.elapsed().as_secs_f64();
        info!("Time: {time_secs:.2}s, Distance: {distance:.2}m");

        // Non-blocking send: se a UI está lenta, descarta medições
        if tx.try_send(Measurement { time_secs, distance }).is_err() {
            debug!("Channel cheio, descartando medição");
        }
    }
    info!("Fim da entrada");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_distance_lines_are_forwarded() {
        let input = "I (312) GATEWAY_NODE: init\nDistance:1.50\ngarbage\nDistance:2.25\n";
        let (tx, rx) = bounded(8);
        read_lines(input.as_bytes(), &tx, Instant::now());

        let got: Vec<f64> = rx.try_iter().map(|m| m.distance).collect();
        assert_eq!(got, vec![1.5, 2.25]);
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let input = "Distance:1.00\nDistance:2.00\nDistance:3.00\n";
        let (tx, rx) = bounded(1);
        read_lines(input.as_bytes(), &tx, Instant::now());

        let got: Vec<f64> = rx.try_iter().map(|m| m.distance).collect();
        assert_eq!(got, vec![1.0]);
    }
}
