//! Link de rádio de curto alcance.
//!
//! [`RadioLink`] é a fronteira com o rádio: envio não bloqueante com fila de
//! saída finita, registro de um único peer e leitura do MAC local.
//!
//! [`UdpLink`] é a rendição no host sobre UDP. Formato do frame:
//!
//! ```text
//! ┌──────────────┬──────────────────┐
//! │ MAC orig.(6) │ Payload (≤ 250)  │
//! └──────────────┴──────────────────┘
//! ```
//!
//! - `link-tx`: drena a fila de saída (bounded) e transmite.
//! - `link-rx`: recebe, remove o header e entrega um [`InboundDatagram`] na
//!   fila de recepção via `try_send`. Nunca bloqueia: fila cheia descarta.

use crate::config::LinkConfig;
use crate::protocol::MAX_LINK_PAYLOAD;
use crate::types::{InboundDatagram, MacAddress, ParseMacError, PeerInfo, SendOutcome};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Erros de bring-up do link.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Falha ao bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Erro de E/S no link: {0}")]
    Io(#[from] std::io::Error),

    #[error("Já existe um peer registrado ({0})")]
    PeerExists(MacAddress),

    #[error("Criptografia não suportada para o peer {0}")]
    EncryptionUnsupported(MacAddress),

    #[error("Sem rota para o peer {0}")]
    NoRoute(MacAddress),

    #[error("Recepção já iniciada neste link")]
    ReceiverActive,

    #[error("MAC local indisponível: {0}")]
    LocalMacUnavailable(String),

    #[error(transparent)]
    InvalidMac(#[from] ParseMacError),
}

/// Fronteira com o rádio.
pub trait RadioLink {
    /// Registra o único peer do link.
    fn add_peer(&mut self, peer: &PeerInfo) -> Result<(), LinkError>;

    /// Tentativa de envio não bloqueante.
    fn send(&self, dest: &MacAddress, data: &[u8]) -> SendOutcome;

    /// Endereço de hardware local.
    fn local_mac(&self) -> Result<MacAddress, LinkError>;
}

/// Frame pronto para transmissão.
struct OutboundFrame {
    dest: SocketAddr,
    bytes: Vec<u8>,
}

/// Link de rádio emulado sobre UDP.
pub struct UdpLink {
    sock: UdpSocket,
    local_mac: MacAddress,
    channel: u8,
    routes: HashMap<MacAddress, SocketAddr>,
    peer: Option<(MacAddress, SocketAddr)>,
    tx: Sender<OutboundFrame>,
    rx_queue_depth: usize,
    receiving: bool,
}

impl UdpLink {
    /// Abre o socket, resolve o MAC local e inicia a thread `link-tx`.
    pub fn open(cfg: &LinkConfig) -> Result<Self, LinkError> {
        let local_mac = resolve_local_mac(cfg)?;

        let addr = format!("{}:{}", cfg.bind_ip, cfg.port);
        let sock = UdpSocket::bind(&addr).map_err(|source| LinkError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let (tx, rx) = bounded::<OutboundFrame>(cfg.tx_queue_depth.max(1));
        let tx_sock = sock.try_clone()?;
        std::thread::Builder::new()
            .name("link-tx".into())
            .spawn(move || transmit_loop(&tx_sock, &rx))?;

        info!("Link aberto em {addr} – canal {} – MAC {local_mac}", cfg.channel);

        Ok(Self {
            sock,
            local_mac,
            channel: cfg.channel,
            routes: HashMap::new(),
            peer: None,
            tx,
            rx_queue_depth: cfg.rx_queue_depth.max(1),
            receiving: false,
        })
    }

    /// Associa um MAC ao endereço UDP onde o nó escuta.
    pub fn add_route(&mut self, mac: MacAddress, addr: SocketAddr) {
        self.routes.insert(mac, addr);
    }

    /// Endereço UDP local efetivo (útil com porta 0).
    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        Ok(self.sock.local_addr()?)
    }

    /// Inicia a thread `link-rx`. Retorna o receiver da fila de recepção.
    ///
    /// Só uma thread lê o socket: uma segunda chamada retorna
    /// [`LinkError::ReceiverActive`].
    pub fn spawn_receiver(&mut self) -> Result<Receiver<InboundDatagram>, LinkError> {
        if self.receiving {
            return Err(LinkError::ReceiverActive);
        }
        let (tx, rx) = bounded::<InboundDatagram>(self.rx_queue_depth);
        let sock = self.sock.try_clone()?;

        std::thread::Builder::new()
            .name("link-rx".into())
            .spawn(move || receive_loop(&sock, &tx))?;

        self.receiving = true;
        Ok(rx)
    }
}

impl RadioLink for UdpLink {
    fn add_peer(&mut self, peer: &PeerInfo) -> Result<(), LinkError> {
        if let Some((existing, _)) = self.peer {
            return Err(LinkError::PeerExists(existing));
        }
        if peer.encrypt {
            return Err(LinkError::EncryptionUnsupported(peer.mac));
        }
        let addr = *self.routes.get(&peer.mac).ok_or(LinkError::NoRoute(peer.mac))?;
        if peer.channel != self.channel {
            warn!(
                "Peer {} no canal {} (link no canal {})",
                peer.mac, peer.channel, self.channel
            );
        }

        self.peer = Some((peer.mac, addr));
        info!("Peer {} registrado → {addr}", peer.mac);
        Ok(())
    }

    fn send(&self, dest: &MacAddress, data: &[u8]) -> SendOutcome {
        let Some((peer_mac, addr)) = self.peer else {
            return SendOutcome::OtherFailure;
        };
        if *dest != peer_mac || data.len() > MAX_LINK_PAYLOAD {
            return SendOutcome::OtherFailure;
        }

        let mut bytes = Vec::with_capacity(MacAddress::LEN + data.len());
        bytes.extend_from_slice(self.local_mac.as_bytes());
        bytes.extend_from_slice(data);

        match self.tx.try_send(OutboundFrame { dest: addr, bytes }) {
            Ok(()) => SendOutcome::Success,
            Err(TrySendError::Full(_)) => SendOutcome::QueueFull,
            Err(TrySendError::Disconnected(_)) => SendOutcome::OtherFailure,
        }
    }

    fn local_mac(&self) -> Result<MacAddress, LinkError> {
        Ok(self.local_mac)
    }
}

fn transmit_loop(sock: &UdpSocket, rx: &Receiver<OutboundFrame>) {
    for frame in rx.iter() {
        if let Err(e) = sock.send_to(&frame.bytes, frame.dest) {
            warn!("Erro ao enviar para {}: {e}", frame.dest);
        }
    }
    debug!("Fila de saída encerrada");
}

fn receive_loop(sock: &UdpSocket, tx: &Sender<InboundDatagram>) {
    let mut buf = [0u8; MacAddress::LEN + MAX_LINK_PAYLOAD];
    loop {
        match sock.recv_from(&mut buf) {
            Ok((size, addr)) => {
                let Some(source) = MacAddress::from_slice(&buf[..size]) else {
                    debug!("Frame curto de {addr} ({size} bytes)");
                    continue;
                };
                let datagram = InboundDatagram {
                    source,
                    data: buf[MacAddress::LEN..size].to_vec(),
                };
                match tx.try_send(datagram) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        debug!("Fila de recepção cheia, descartando datagrama de {source}");
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!("Fila de recepção encerrada");
                        return;
                    }
                }
            }
            Err(ref e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock => {}
            Err(e) => {
                warn!("Erro ao receber UDP: {e}");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

/// MAC configurado ou, se vazio, lido de `/sys/class/net/<interface>/address`.
fn resolve_local_mac(cfg: &LinkConfig) -> Result<MacAddress, LinkError> {
    if !cfg.local_mac.is_empty() {
        return Ok(cfg.local_mac.parse()?);
    }
    read_interface_mac(&Path::new("/sys/class/net").join(&cfg.interface).join("address"))
}

fn read_interface_mac(path: &Path) -> Result<MacAddress, LinkError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LinkError::LocalMacUnavailable(format!("{}: {e}", path.display())))?;
    Ok(content.trim().parse()?)
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
