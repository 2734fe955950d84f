//! # Ranging Core
//!
//! Crate compartilhada do sistema de ranging: tipos, protocolo de
//! poll/resposta, configuração TOML, link de rádio, agendador de polls e
//! tratamento das respostas.
//!
//! ## Módulos
//! - [`types`] – MAC, peer, datagramas e resultado de envio
//! - [`protocol`] – Poll fixo, layout da resposta e linha `Distance:`
//! - [`config`] – Configuração unificada via TOML
//! - [`link`] – Fronteira com o rádio e link UDP do host
//! - [`scheduler`] – Loop de envio com backoff por fila cheia
//! - [`reception`] – Decodificação das respostas e saída em texto
//! - [`history`] – Janela deslizante de medições para o monitor

pub mod types;
pub mod protocol;
pub mod config;
pub mod link;
pub mod scheduler;
pub mod reception;
pub mod history;

// Re-exports convenientes
pub use types::{MacAddress, PeerInfo, SendOutcome};
pub use protocol::{POLL_DATAGRAM, RESPONSE_SIZE};
pub use config::AppConfig;
pub use link::{RadioLink, UdpLink};
pub use scheduler::PollScheduler;

/// Banner impresso pelo utilitário de identidade.
pub fn identity_banner(mac: &MacAddress) -> String {
    const RULE: &str = "============================================";
    format!("\n{RULE}\nBoard MAC Address: {mac}\n{RULE}\n\n")
}
