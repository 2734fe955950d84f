//! # Ranging Identity
//!
//! Sobe o link só o suficiente para ler o endereço de hardware local,
//! imprime uma vez e encerra. O valor impresso é o `peer_mac` a configurar
//! no poller do outro nó.

use ranging_core::config::AppConfig;
use ranging_core::identity_banner;
use ranging_core::link::{RadioLink, UdpLink};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&AppConfig::resolve_path());

    // Porta 0: não disputa a porta de um poller rodando na mesma máquina
    let mut link_cfg = config.link.clone();
    link_cfg.port = 0;

    let mac = match UdpLink::open(&link_cfg).and_then(|link| link.local_mac()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Não foi possível obter o MAC local: {e}");
            return ExitCode::FAILURE;
        }
    };

    print!("{}", identity_banner(&mac));
    ExitCode::SUCCESS
}
