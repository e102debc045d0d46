use std::collections::{HashMap, HashSet};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use egui::{Color32, ColorImage, RichText, TextureHandle};

use crate::core::presets::PRESETS;
use crate::core::session::{AppStatus, MoodSession, Ticket};
use crate::core::themes::parse_hex_color;
use crate::core::{artwork, export};
use crate::error::{MoodError, SubmitError};
use crate::models::{MoodAnalysis, Track};
use crate::sources::MoodSource;

const ACCENT: Color32 = Color32::from_rgb(0x1d, 0xb9, 0x54);
const COVER_SIZE: f32 = 40.0;

enum BgResult {
    AnalysisDone(Ticket, Result<MoodAnalysis, MoodError>),
    CoverDone(String, Vec<u8>),
    CoverFailed(String, String),
}

pub struct MoodifyApp {
    session: MoodSession,
    source: Arc<dyn MoodSource>,

    // Idle view
    input: String,

    // Dashboard covers, keyed by URL
    http: reqwest::blocking::Client,
    covers: HashMap<String, TextureHandle>,
    requested_covers: HashSet<String>,

    // Background tasks
    tx: mpsc::Sender<BgResult>,
    rx: mpsc::Receiver<BgResult>,
    pending_covers: usize,
    status_msg: String,
}

impl MoodifyApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: Arc<dyn MoodSource>) -> Self {
        let (tx, rx) = mpsc::channel();

        Self {
            session: MoodSession::new(),
            source,
            input: String::new(),
            http: reqwest::blocking::Client::new(),
            covers: HashMap::new(),
            requested_covers: HashSet::new(),
            tx,
            rx,
            pending_covers: 0,
            status_msg: String::new(),
        }
    }

    fn start_analysis(&mut self) {
        let ticket = match self.session.submit(&self.input) {
            Ok(ticket) => ticket,
            Err(SubmitError::EmptyQuery) => {
                self.status_msg = "Describe your mood first.".to_string();
                return;
            }
            Err(e) => {
                tracing::debug!(error = %e, "submission ignored");
                return;
            }
        };

        let query = self.session.pending_query().unwrap_or_default().to_string();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        self.status_msg.clear();

        std::thread::spawn(move || {
            let result = source.fetch_mood_result(&query);
            let _ = tx.send(BgResult::AnalysisDone(ticket, result));
        });
    }

    /// Back to the input view. The text typed before is not kept.
    fn start_over(&mut self) {
        self.session.reset();
        self.input.clear();
        self.covers.clear();
        self.requested_covers.clear();
        self.status_msg.clear();
    }

    fn fetch_covers(&mut self, tracks: Vec<Track>) {
        for track in tracks {
            if !self.requested_covers.insert(track.cover_url.clone()) {
                continue;
            }
            let tx = self.tx.clone();
            let http = self.http.clone();
            self.pending_covers += 1;

            std::thread::spawn(move || match artwork::fetch_cover(&http, &track) {
                Ok(data) => {
                    let _ = tx.send(BgResult::CoverDone(track.cover_url, data));
                }
                Err(e) => {
                    let _ = tx.send(BgResult::CoverFailed(track.cover_url, format!("{:#}", e)));
                }
            });
        }
    }

    fn save_playlist(&mut self) {
        let Some(analysis) = self.session.analysis() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(export::default_file_name(analysis))
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };

        self.status_msg = match export::save_analysis(&path, analysis) {
            Ok(()) => format!("Saved to {}", path.display()),
            Err(e) => format!("Save failed: {:#}", e),
        };
    }

    fn process_bg_results(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.rx.try_recv() {
            match result {
                BgResult::AnalysisDone(ticket, result) => {
                    if self.session.complete(ticket, result) {
                        let tracks = self
                            .session
                            .analysis()
                            .map(|a| a.all_tracks().cloned().collect())
                            .unwrap_or_default();
                        self.fetch_covers(tracks);
                    }
                }
                BgResult::CoverDone(url, data) => {
                    self.pending_covers = self.pending_covers.saturating_sub(1);
                    if !self.requested_covers.contains(&url) {
                        continue;
                    }
                    match image::load_from_memory(&data) {
                        Ok(img) => {
                            let rgba = img.to_rgba8();
                            let size = [rgba.width() as usize, rgba.height() as usize];
                            let pixels = rgba.into_raw();
                            let color_image = ColorImage::from_rgba_unmultiplied(size, &pixels);
                            let texture = ctx.load_texture(
                                format!("cover_{}", url),
                                color_image,
                                Default::default(),
                            );
                            self.covers.insert(url, texture);
                        }
                        Err(e) => tracing::debug!(url = %url, error = %e, "cover is not an image"),
                    }
                }
                BgResult::CoverFailed(url, msg) => {
                    self.pending_covers = self.pending_covers.saturating_sub(1);
                    tracing::debug!(url = %url, error = %msg, "cover download failed");
                }
            }
        }
    }

    fn show_idle(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new("How are you feeling right now?").size(32.0).strong());
            ui.add_space(8.0);
            ui.label(
                RichText::new("Describe your mood and get a soundtrack for the moment.")
                    .color(Color32::GRAY),
            );
            ui.add_space(20.0);

            ui.add_sized(
                [600.0, 120.0],
                egui::TextEdit::multiline(&mut self.input).hint_text(
                    "e.g. I'm feeling super energetic and ready to conquer the world, maybe a bit of 80s synth vibes...",
                ),
            );
            ui.add_space(12.0);

            let can_submit = !self.input.trim().is_empty();
            let submit = ui.add_enabled(
                can_submit,
                egui::Button::new(RichText::new("Generate Vibes").strong().color(Color32::BLACK))
                    .fill(ACCENT),
            );
            let shortcut = ui.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command);
            if submit.clicked() || (can_submit && shortcut) {
                self.start_analysis();
            }

            ui.add_space(16.0);
            ui.horizontal_wrapped(|ui| {
                for preset in PRESETS {
                    if ui.button(preset).clicked() {
                        self.input = preset.to_string();
                    }
                }
            });

            if !self.status_msg.is_empty() {
                ui.add_space(8.0);
                ui.label(&self.status_msg);
            }
        });
    }

    fn show_analyzing(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.spinner();
            ui.add_space(16.0);
            ui.label(RichText::new("Reading your vibes...").size(28.0).strong());
            if let Some(query) = self.session.pending_query() {
                ui.label(RichText::new(format!("\"{}\"", query)).color(Color32::GRAY));
            }
            ui.label(
                RichText::new(format!("Asking {} for the right songs.", self.source.name()))
                    .color(Color32::GRAY),
            );
        });
    }

    /// Returns what the user clicked: (start over, save).
    fn show_ready(&self, ui: &mut egui::Ui) -> (bool, bool) {
        let mut start_over = false;
        let mut save = false;

        let Some(analysis) = self.session.analysis() else {
            return (true, false);
        };
        let color = parse_hex_color(&analysis.color)
            .map(|(r, g, b)| Color32::from_rgb(r, g, b))
            .unwrap_or(ACCENT);

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.horizontal(|ui| {
                egui::Frame::none()
                    .fill(color)
                    .rounding(12.0)
                    .inner_margin(24.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(&analysis.emoji).size(64.0));
                    });

                ui.vertical(|ui| {
                    ui.label(RichText::new("AI CURATED PLAYLIST").small().color(Color32::GRAY));
                    ui.label(RichText::new(format!("{} Vibes", analysis.mood)).size(40.0).strong());
                    ui.label(RichText::new(&analysis.description).color(Color32::LIGHT_GRAY));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Save playlist...").clicked() {
                            save = true;
                        }
                        if !self.status_msg.is_empty() {
                            ui.label(&self.status_msg);
                        }
                    });
                });
            });

            ui.add_space(16.0);

            for (p_idx, playlist) in analysis.playlists.iter().enumerate() {
                ui.separator();
                ui.label(RichText::new(&playlist.name).size(20.0).strong().color(color));
                if !playlist.description.is_empty() {
                    ui.label(RichText::new(&playlist.description).color(Color32::GRAY));
                }
                ui.add_space(4.0);

                egui::Grid::new(format!("tracks_{}", p_idx))
                    .num_columns(5)
                    .striped(true)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").color(Color32::GRAY));
                        ui.label("");
                        ui.label(RichText::new("TITLE").color(Color32::GRAY));
                        ui.label(RichText::new("ALBUM").color(Color32::GRAY));
                        ui.label(RichText::new("TIME").color(Color32::GRAY));
                        ui.end_row();

                        for (i, track) in playlist.tracks.iter().enumerate() {
                            ui.label(format!("{}", i + 1));

                            if let Some(texture) = self.covers.get(&track.cover_url) {
                                let size = texture.size_vec2();
                                let scale = (COVER_SIZE / size.x).min(COVER_SIZE / size.y).min(1.0);
                                ui.image(egui::load::SizedTexture::new(texture.id(), size * scale));
                            } else {
                                ui.allocate_space(egui::vec2(COVER_SIZE, COVER_SIZE));
                            }

                            ui.vertical(|ui| {
                                ui.label(RichText::new(&track.title).strong());
                                ui.label(RichText::new(&track.artist).color(Color32::GRAY));
                            });
                            ui.label(RichText::new(&track.album).color(Color32::GRAY));
                            ui.label(&track.duration);
                            ui.end_row();
                        }
                    });
            }

            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                if ui.link("Try a different mood?").clicked() {
                    start_over = true;
                }
            });
        });

        (start_over, save)
    }

    fn show_error(&self, ui: &mut egui::Ui) -> bool {
        let mut retry = false;
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.label(RichText::new("⚠").size(48.0).color(Color32::RED));
            ui.label(RichText::new("Oops! Something went wrong").size(26.0).strong());
            ui.add_space(8.0);
            ui.label(
                RichText::new(self.session.error_message().unwrap_or_default())
                    .color(Color32::GRAY),
            );
            ui.add_space(20.0);
            if ui.button(RichText::new("Try Again").strong()).clicked() {
                retry = true;
            }
        });
        retry
    }
}

impl eframe::App for MoodifyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_bg_results(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("🎵 Moodify").size(22.0).strong().color(ACCENT));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(self.source.name()).color(Color32::GRAY));
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.session.status() {
            AppStatus::Idle => self.show_idle(ui),
            AppStatus::Analyzing => self.show_analyzing(ui),
            AppStatus::Ready => {
                let (start_over, save) = self.show_ready(ui);
                if save {
                    self.save_playlist();
                }
                if start_over {
                    self.start_over();
                }
            }
            AppStatus::Error => {
                if self.show_error(ui) {
                    self.session.acknowledge();
                    self.input.clear();
                }
            }
        });

        if self.session.status() == AppStatus::Analyzing || self.pending_covers > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
