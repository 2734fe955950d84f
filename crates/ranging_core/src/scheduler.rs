//! Agendador de transmissão de polls.
//!
//! Envia o poll fixo ao nó de referência o mais rápido que o link permite.
//! O único ponto de suspensão é o backoff após fila cheia (e, conforme a
//! [`FailurePolicy`], após outras falhas). Sem estado entre iterações além
//! das estatísticas locais de [`PollScheduler::run`].

use crate::config::{FailurePolicy, PollerConfig};
use crate::link::RadioLink;
use crate::protocol::POLL_DATAGRAM;
use crate::types::{MacAddress, SendOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Contadores de uma execução do agendador.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub sent: u64,
    pub queue_full: u64,
    pub failed: u64,
}

impl SchedulerStats {
    fn record(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Success => self.sent += 1,
            SendOutcome::QueueFull => self.queue_full += 1,
            SendOutcome::OtherFailure => self.failed += 1,
        }
    }
}

/// Agendador de polls para um único peer.
pub struct PollScheduler<'a, L: RadioLink + ?Sized> {
    link: &'a L,
    peer: MacAddress,
    backoff: Duration,
    on_failure: FailurePolicy,
    stats_interval: Duration,
}

impl<'a, L: RadioLink + ?Sized> PollScheduler<'a, L> {
    pub fn new(link: &'a L, peer: MacAddress, backoff: Duration, on_failure: FailurePolicy) -> Self {
        Self {
            link,
            peer,
            backoff,
            on_failure,
            stats_interval: Duration::from_secs(10),
        }
    }

    /// Monta o agendador a partir da seção `[poller]`.
    pub fn from_config(link: &'a L, peer: MacAddress, cfg: &PollerConfig) -> Self {
        Self::new(link, peer, cfg.backoff(), cfg.on_failure)
            .with_stats_interval(
                Duration::try_from_secs_f64(cfg.stats_interval_secs).unwrap_or(Duration::from_secs(10)),
            )
    }

    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    pub fn peer(&self) -> &MacAddress {
        &self.peer
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Uma iteração: um envio e, se preciso, o backoff.
    pub fn step(&self) -> SendOutcome {
        let outcome = self.link.send(&self.peer, POLL_DATAGRAM);

        match outcome {
            // Sem delay no caso normal, para enviar o mais rápido possível
            SendOutcome::Success => {}
            SendOutcome::QueueFull => std::thread::sleep(self.backoff),
            SendOutcome::OtherFailure => {
                if self.on_failure == FailurePolicy::Backoff {
                    std::thread::sleep(self.backoff);
                }
            }
        }

        outcome
    }

    /// Executa até `stop` ser sinalizado. O flag é observado a cada iteração.
    pub fn run(&self, stop: &AtomicBool) -> SchedulerStats {
        let mut stats = SchedulerStats::default();
        let mut last_report = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            stats.record(self.step());

            if last_report.elapsed() >= self.stats_interval {
                debug!(
                    "Polls → {}: {} enviados | {} fila cheia | {} falhas",
                    self.peer, stats.sent, stats.queue_full, stats.failed
                );
                last_report = Instant::now();
            }
        }

        stats
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
