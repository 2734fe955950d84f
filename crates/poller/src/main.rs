//! # Ranging Poller
//!
//! Envia polls ao nó de referência na velocidade máxima do link e imprime
//! cada distância recebida no stdout (`Distance:<valor>`). Logs vão para o
//! stderr para não misturar com a saída de medições.
//!
//! ## Uso
//! ```bash
//! ranging_poller                    # config.toml ao lado do executável
//! ranging_poller /etc/ranging.toml  # config explícito
//! ranging_poller | ranging_monitor  # gráfico em tempo real
//! ```

use ranging_core::config::AppConfig;
use ranging_core::link::{LinkError, RadioLink, UdpLink};
use ranging_core::reception::spawn_reception_thread;
use ranging_core::scheduler::PollScheduler;
use ranging_core::types::{MacAddress, PeerInfo};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Carregar config ──
    // Arquivo existente mas inválido é fatal: nunca cair no peer padrão
    let config_path = AppConfig::resolve_path();
    let config = match AppConfig::load_strict(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Falha ao carregar {}: {e}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    // ── Bring-up do link ──
    let (mut link, peer) = match bring_up(&config) {
        Ok(v) => v,
        Err(e) => {
            error!("Falha ao iniciar o link: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Recepção ──
    let rx = match link.spawn_receiver() {
        Ok(rx) => rx,
        Err(e) => {
            error!("Falha ao iniciar recepção: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = spawn_reception_thread(rx, std::io::stdout()) {
        error!("Falha ao criar thread de recepção: {e}");
        return ExitCode::FAILURE;
    }

    // ── Banner ──
    eprintln!();
    eprintln!("══════════════════════════════════════════════");
    eprintln!("   📡 RANGING POLLER – ATIVO");
    eprintln!("══════════════════════════════════════════════");
    eprintln!("  Referência: {peer} ({})", config.poller.peer_addr);
    eprintln!("  Canal:      {}", config.link.channel);
    eprintln!("  Backoff:    {} ms", config.poller.backoff_ms);
    eprintln!("══════════════════════════════════════════════");
    eprintln!();

    info!("Poller inicializado. Enviando polls na velocidade máxima.");

    // ── Loop principal ──
    // Nunca sinalizado: o loop dura o processo inteiro.
    let stop = AtomicBool::new(false);
    let stats = PollScheduler::from_config(&link, peer, &config.poller).run(&stop);
    info!(
        "Agendador encerrado: {} enviados | {} fila cheia | {} falhas",
        stats.sent, stats.queue_full, stats.failed
    );

    ExitCode::SUCCESS
}

/// Abre o link e registra o nó de referência como único peer.
fn bring_up(config: &AppConfig) -> Result<(UdpLink, MacAddress), LinkError> {
    let peer: MacAddress = config.poller.peer_mac()?;
    let peer_addr: SocketAddr = config
        .poller
        .peer_addr
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut link = UdpLink::open(&config.link)?;
    link.add_route(peer, peer_addr);
    link.add_peer(&PeerInfo::unencrypted(peer, config.link.channel))?;

    Ok((link, peer))
}
