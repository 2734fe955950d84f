//! Configuração unificada via TOML.
//!
//! Um único `config.toml` com as seções `[link]`, `[poller]` e `[monitor]`.
//! Campos ausentes usam o valor padrão.

use crate::types::MacAddress;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Erros ao ler ou gravar a configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de E/S em {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Erro ao parsear TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuração do link de rádio (rendição UDP no host).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// IP local para bind
    pub bind_ip: String,
    /// Porta UDP local
    pub port: u16,
    /// Canal de rádio (1–14)
    pub channel: u8,
    /// Interface de onde ler o MAC quando `local_mac` está vazio
    pub interface: String,
    /// MAC local explícito (vazio = lido da interface)
    pub local_mac: String,
    /// Slots da fila de saída
    pub tx_queue_depth: usize,
    /// Slots da fila de recepção
    pub rx_queue_depth: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bind_ip: "0.0.0.0".into(),
            port: 5005,
            channel: 1,
            interface: "wlan0".into(),
            local_mac: String::new(),
            tx_queue_depth: 8,
            rx_queue_depth: 64,
        }
    }
}

/// Política para falhas de envio que não são fila cheia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Espera o mesmo backoff da fila cheia
    Backoff,
    /// Tenta de novo imediatamente
    Immediate,
}

/// Configuração do Poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// MAC do nó de referência
    pub peer_mac: String,
    /// Endereço UDP do nó de referência
    pub peer_addr: String,
    /// Backoff após fila cheia (ms)
    pub backoff_ms: u64,
    /// O que fazer em outras falhas de envio
    pub on_failure: FailurePolicy,
    /// Intervalo do log de estatísticas (segundos)
    pub stats_interval_secs: f64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            peer_mac: "98:A3:16:EB:E6:CC".into(),
            peer_addr: "127.0.0.1:5006".into(),
            backoff_ms: 20,
            on_failure: FailurePolicy::Backoff,
            stats_interval_secs: 10.0,
        }
    }
}

impl PollerConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn peer_mac(&self) -> Result<MacAddress, crate::types::ParseMacError> {
        self.peer_mac.parse()
    }
}

/// Configuração do Monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Pontos mantidos no gráfico
    pub max_points: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { max_points: 50 }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub link: LinkConfig,
    pub poller: PollerConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Lê e parseia um arquivo TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Carrega o arquivo se existir; só a ausência do arquivo cai no padrão.
    /// Um arquivo presente mas inválido é erro.
    pub fn load_strict(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("{} não encontrado, usando configuração padrão", path.display());
            return Ok(AppConfig::default());
        }
        let config = Self::from_file(path)?;
        info!("Configuração carregada de {}", path.display());
        Ok(config)
    }

    /// Carrega configuração de um arquivo TOML, com fallback para o padrão.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    info!("Configuração carregada de {}", path.display());
                    return config;
                }
                Err(e) => warn!("Erro ao carregar {}: {}", path.display(), e),
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Caminho do config: primeiro argumento da linha de comando ou
    /// `config.toml` ao lado do executável.
    pub fn resolve_path() -> PathBuf {
        std::env::args_os()
            .nth(1)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path)
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.link.port == 0 {
            errors.push("Porta do link não pode ser 0".into());
        }
        if !(1..=14).contains(&self.link.channel) {
            errors.push(format!("Canal inválido: {} (1–14)", self.link.channel));
        }
        if self.link.tx_queue_depth == 0 || self.link.rx_queue_depth == 0 {
            errors.push("Profundidade das filas deve ser >= 1".into());
        }
        if !self.link.local_mac.is_empty() && self.link.local_mac.parse::<MacAddress>().is_err() {
            errors.push(format!("MAC local inválido: '{}'", self.link.local_mac));
        }
        if let Err(e) = self.poller.peer_mac() {
            errors.push(e.to_string());
        }
        if self.poller.peer_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!("Endereço do peer inválido: '{}'", self.poller.peer_addr));
        }
        if !(1..=1000).contains(&self.poller.backoff_ms) {
            errors.push(format!(
                "Backoff inválido: {} ms (1–1000)",
                self.poller.backoff_ms
            ));
        }
        if self.poller.stats_interval_secs.is_nan() || self.poller.stats_interval_secs <= 0.0 {
            errors.push("Intervalo de estatísticas deve ser > 0".into());
        }
        if self.monitor.max_points < 2 {
            errors.push(format!(
                "max_points inválido: {} (mínimo 2)",
                self.monitor.max_points
            ));
        }

        errors
    }
}
