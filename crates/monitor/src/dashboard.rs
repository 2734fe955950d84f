//! Dashboard do monitor – App eframe/egui.

use crate::line_thread::{self, Measurement};
use crossbeam_channel::Receiver;
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotPoints};
use ranging_core::config::AppConfig;
use ranging_core::history::DistanceHistory;
use std::time::Instant;
use tracing::info;

const CONNECTION_TIMEOUT_SECS: f64 = 2.0;
const ACCENT: Color32 = Color32::from_rgb(255, 64, 64);
const ONLINE: Color32 = Color32::from_rgb(0, 255, 136);
const DIM: Color32 = Color32::from_rgb(128, 128, 128);

/// Estado do dashboard.
pub struct RangingDashboard {
    // Dados
    rx: Receiver<Measurement>,
    history: DistanceHistory,
    last_data_time: Option<Instant>,
    received: u64,

    // UI state
    paused: bool,
    is_fullscreen: bool,
}

impl RangingDashboard {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        // Inicia thread de leitura
        let rx = line_thread::spawn_stdin_thread();

        Self {
            rx,
            history: DistanceHistory::new(config.monitor.max_points),
            last_data_time: None,
            received: 0,
            paused: false,
            is_fullscreen: false,
        }
    }

    /// Processa medições pendentes da thread de leitura.
    fn poll_measurements(&mut self) {
        while let Ok(m) = self.rx.try_recv() {
            self.received += 1;
            self.last_data_time = Some(Instant::now());
            if !self.paused {
                self.history.push(m.time_secs, m.distance);
            }
        }
    }

    fn is_receiving(&self) -> bool {
        self.last_data_time
            .is_some_and(|t| t.elapsed().as_secs_f64() < CONNECTION_TIMEOUT_SECS)
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        let (text, color) = if self.is_receiving() {
            (format!("● Recebendo | {} medições", self.received), ONLINE)
        } else {
            ("○ Aguardando linhas Distance: no stdin...".to_string(), DIM)
        };
        ui.label(RichText::new(text).color(color).monospace());
    }

    fn render_summary(&self, ui: &mut egui::Ui) {
        let last = self.history.last().map(|s| s.distance);
        let range = self.history.range();

        ui.horizontal(|ui: &mut egui::Ui| {
            summary_value(ui, "Atual", last);
            summary_value(ui, "Mín", range.map(|(lo, _)| lo));
            summary_value(ui, "Máx", range.map(|(_, hi)| hi));
            if self.paused {
                ui.label(RichText::new("⏸ PAUSADO").color(ACCENT).monospace().strong());
            }
        });
    }

    fn render_plot(&self, ui: &mut egui::Ui) {
        let points: PlotPoints = self.history.points().into();
        let line = Line::new(points).color(ACCENT).width(1.5);

        let mut plot = Plot::new("distance_plot")
            .height((ui.available_height() - 24.0).max(120.0))
            .x_axis_label("Tempo (s)")
            .y_axis_label("Distância (m)")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false);

        // Margem de 1 m em torno da faixa observada
        if let Some((lo, hi)) = self.history.range() {
            plot = plot.include_y(lo - 1.0).include_y(hi + 1.0);
        }

        plot.show(ui, |plot_ui| {
            plot_ui.line(line);
        });
    }
}

fn summary_value(ui: &mut egui::Ui, label: &str, value: Option<f64>) {
    let text = value.map_or_else(|| "--".to_string(), |v| format!("{v:.2} m"));
    ui.label(RichText::new(format!("{label}:")).color(DIM).monospace());
    ui.label(RichText::new(text).monospace().strong());
    ui.add_space(12.0);
}

impl eframe::App for RangingDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Poll medições ──
        self.poll_measurements();

        // ── Solicitar repaint contínuo (60 FPS) ──
        ctx.request_repaint_after(std::time::Duration::from_millis(16));

        // ── Atalhos de teclado ──
        ctx.input(|i: &egui::InputState| {
            if i.key_pressed(egui::Key::P) {
                self.paused = !self.paused;
                info!("Gráfico {}", if self.paused { "pausado" } else { "retomado" });
            }
            if i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            if i.key_pressed(egui::Key::F) || i.key_pressed(egui::Key::F11) {
                self.is_fullscreen = !self.is_fullscreen;
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
            }
        });

        // ── Painel central ──
        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            ui.vertical_centered(|ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("📡 DISTÂNCIA EM TEMPO REAL")
                        .color(ACCENT)
                        .size(20.0)
                        .strong()
                        .monospace(),
                );
                self.render_status(ui);
            });

            ui.add_space(6.0);
            self.render_summary(ui);
            ui.separator();
            self.render_plot(ui);

            ui.label(
                RichText::new("[F] Fullscreen | [P] Pausar | [Q/Esc] Sair")
                    .color(DIM)
                    .monospace()
                    .size(10.0),
            );
        });
    }
}
