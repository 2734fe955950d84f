//! # Ranging Monitor
//!
//! Gráfico em tempo real das distâncias impressas pelo poller.
//! Lê as linhas `Distance:<valor>` do stdin; outras linhas são ignoradas.
//!
//! ```bash
//! ranging_poller | ranging_monitor
//! ```
//!
//! ## Atalhos
//! - `F` / `F11`: Fullscreen
//! - `P`: Pausar/retomar o gráfico
//! - `Q` / `Esc`: Sair

mod dashboard;
mod line_thread;

use dashboard::RangingDashboard;
use ranging_core::config::AppConfig;

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config = AppConfig::load(&AppConfig::resolve_path());

    // ── Janela eframe ──
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("📡 Ranging Monitor")
            .with_inner_size([900.0, 540.0])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ranging Monitor",
        options,
        Box::new(move |cc| Ok(Box::new(RangingDashboard::new(cc, config)))),
    )
}
