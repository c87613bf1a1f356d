//! Page rendering. Everything here reads state and reports what the user
//! asked for; applying those requests is the app's job.

use egui::emath::Rot2;
use egui::{
    vec2, Align, Align2, Color32, CornerRadius, FontId, Frame, Layout, Margin, Pos2, Rect,
    RichText, ScrollArea, Sense, Stroke, TextEdit, Ui, Vec2,
};

use crate::config::PageConfig;
use crate::hearts::{sway_degrees, FloatingHeart};
use crate::media::MusicFile;
use crate::notes::VideoEntry;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageAction {
    EditDedication(String),
    PickVideos,
    PickMusic,
    ToggleMusic,
    RemoveVideo(String),
}

/// Screen area reserved for a video card's player, in egui points.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSlot {
    pub id: String,
    pub rect: Rect,
    /// False when the slot is scrolled (partly) out of view.
    pub visible: bool,
}

/// What the page needs to know to draw one frame.
pub struct PageView<'a> {
    pub dedication: &'a str,
    pub videos: &'a [VideoEntry],
    pub music: Option<&'a MusicFile>,
    pub playing: bool,
    pub bars: &'a [u8],
    pub hearts: &'a [FloatingHeart],
    pub time: f64,
}

/// Interactive widgets on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Dedication,
    PickMusic,
    ToggleMusic,
    PickVideos,
    RemoveVideo(String),
}

#[derive(Debug, Default)]
pub struct PageOutput {
    pub actions: Vec<PageAction>,
    pub video_slots: Vec<VideoSlot>,
    /// Where each control landed this frame.
    pub controls: Vec<(Control, Rect)>,
}

impl PageOutput {
    pub fn control_rect(&self, control: &Control) -> Option<Rect> {
        self.controls
            .iter()
            .find(|(c, _)| c == control)
            .map(|(_, rect)| *rect)
    }

    fn clicked(&mut self, response: &egui::Response, control: Control, action: PageAction) {
        if response.clicked() {
            self.actions.push(action);
        }
        self.controls.push((control, response.rect));
    }
}

const CARD_MAX_WIDTH: f32 = 960.0;
const VIDEO_ASPECT: f32 = 9.0 / 16.0;
const BAR_WIDTH: f32 = 8.0;
const BAR_GAP: f32 = 4.0;
const FOOTER: &str =
    "✨ Esta página siempre estará aquí para recordarnos lo especial que es nuestro amor ✨";

const ACTIVITIES: [&str; 4] = [
    "Escribir juntos una promesa y guardarla aquí ✍️",
    "Ver un video y contar qué recuerdas de ese momento 🎥",
    "Pausar la música y cantarla juntos 🎶",
    "Buscar tu foto favorita y pegarla en la dedicatoria 📸",
];

pub fn draw_page(ctx: &egui::Context, view: &PageView<'_>, config: &PageConfig) -> PageOutput {
    let mut out = PageOutput::default();

    egui::CentralPanel::default()
        .frame(Frame::new().fill(config.background_color).inner_margin(Margin::same(24)))
        .show(ctx, |ui| {
            paint_hearts(ui, view, config);

            ScrollArea::vertical().auto_shrink(false).show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(CARD_MAX_WIDTH);
                    Frame::new()
                        .fill(config.card_color)
                        .corner_radius(CornerRadius::same(16))
                        .inner_margin(Margin::same(24))
                        .stroke(Stroke::new(1.0, config.accent_color.gamma_multiply(0.4)))
                        .show(ui, |ui| {
                            ui.with_layout(Layout::top_down(Align::LEFT), |ui| {
                                draw_header(ui, view.time, config);
                                ui.add_space(20.0);
                                draw_dedication(ui, view, &mut out);
                                ui.add_space(20.0);
                                draw_music(ui, view, config, &mut out);
                                ui.add_space(20.0);
                                draw_videos(ui, view, &mut out);
                                ui.add_space(20.0);
                                draw_activities(ui, config);
                                ui.add_space(28.0);
                                ui.vertical_centered(|ui| {
                                    ui.label(RichText::new(FOOTER).small().color(Color32::GRAY));
                                });
                            });
                        });
                });
            });
        });

    out
}

// Painted first so the card covers them.
fn paint_hearts(ui: &Ui, view: &PageView<'_>, config: &PageConfig) {
    let area = ui.max_rect();
    let painter = ui.painter();
    for heart in view.hearts {
        let Some(pose) = heart.pose(view.time) else {
            continue;
        };
        let pos = Pos2::new(
            area.left() + pose.x * area.width(),
            area.top() + pose.y * area.height(),
        );
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            "❤",
            FontId::proportional(24.0),
            config.heart_color.gamma_multiply(pose.opacity),
        );
    }
}

fn draw_header(ui: &mut Ui, time: f64, config: &PageConfig) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(44.0), Sense::hover());
        let painter = ui.painter();
        let galley =
            painter.layout_no_wrap("🌻".to_string(), FontId::proportional(36.0), Color32::GOLD);
        let angle = sway_degrees(time, config.sway_period).to_radians();
        let pos = rotated_text_origin(rect.center(), galley.size(), angle);
        painter.add(egui::epaint::TextShape::new(pos, galley, Color32::GOLD).with_angle(angle));

        ui.vertical(|ui| {
            ui.heading(RichText::new("Nuestra Historia 💛").strong().size(28.0));
            ui.label(
                RichText::new("Una página interactiva y romántica para celebrar 15 meses juntos.")
                    .small()
                    .color(Color32::DARK_GRAY),
            );
        });
    });
}

// Text shapes rotate around their top-left corner; shift that corner so the
// galley turns around `center` instead.
fn rotated_text_origin(center: Pos2, size: Vec2, angle: f32) -> Pos2 {
    center - Rot2::from_angle(angle) * (size / 2.0)
}

fn draw_dedication(ui: &mut Ui, view: &PageView<'_>, out: &mut PageOutput) {
    ui.label(RichText::new("Tu dedicatoria").strong());
    let mut text = view.dedication.to_owned();
    let response = ui.add(
        TextEdit::multiline(&mut text)
            .hint_text("Escribe aquí lo que quieras decirle...")
            .desired_rows(6)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        out.actions.push(PageAction::EditDedication(text));
    }
    out.controls.push((Control::Dedication, response.rect));
}

fn draw_music(ui: &mut Ui, view: &PageView<'_>, config: &PageConfig, out: &mut PageOutput) {
    ui.label(RichText::new("🎶 Música de fondo").strong());
    let pick = ui.button("Elegir canción…");
    out.clicked(&pick, Control::PickMusic, PageAction::PickMusic);

    let Some(music) = view.music else {
        return;
    };
    ui.add_space(8.0);
    ui.vertical_centered(|ui| {
        let label = if view.playing {
            format!("⏸️ Pausar - {}", music.name)
        } else {
            format!("▶️ Reproducir - {}", music.name)
        };
        let button = egui::Button::new(RichText::new(label).strong())
            .fill(config.accent_color)
            .corner_radius(CornerRadius::same(8));
        let toggle = ui.add(button);
        out.clicked(&toggle, Control::ToggleMusic, PageAction::ToggleMusic);
        ui.add_space(8.0);
        draw_bars(ui, view.bars, config);
    });
}

/// Bottom-aligned bars, one per visible bin, scaled into the bar area.
fn draw_bars(ui: &mut Ui, bars: &[u8], config: &PageConfig) {
    let count = config.visible_bars as f32;
    let size = vec2(count * (BAR_WIDTH + BAR_GAP) - BAR_GAP, config.bar_area_height);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter();
    for (i, &value) in bars.iter().take(config.visible_bars).enumerate() {
        let height = bar_height(value, config);
        let left = rect.left() + i as f32 * (BAR_WIDTH + BAR_GAP);
        let bar = Rect::from_min_max(
            Pos2::new(left, rect.bottom() - height),
            Pos2::new(left + BAR_WIDTH, rect.bottom()),
        );
        painter.rect_filled(bar, CornerRadius::same(2), config.heart_color);
    }
}

fn bar_height(value: u8, config: &PageConfig) -> f32 {
    (f32::from(value) / 255.0 * config.bar_area_height).max(f32::from(config.bar_floor))
}

fn draw_videos(ui: &mut Ui, view: &PageView<'_>, out: &mut PageOutput) {
    ui.label(RichText::new("🎥 Nuestros videos").strong());
    let pick = ui.button("Agregar videos…");
    out.clicked(&pick, Control::PickVideos, PageAction::PickVideos);
    ui.add_space(8.0);

    if view.videos.is_empty() {
        ui.label(RichText::new("No hay videos aún.").color(Color32::GRAY));
        return;
    }

    for video in view.videos {
        Frame::new()
            .fill(Color32::from_gray(249))
            .stroke(Stroke::new(1.0, Color32::from_gray(220)))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(Margin::same(12))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&video.name).strong().small());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let label = RichText::new("Eliminar")
                            .small()
                            .color(Color32::from_rgb(220, 38, 38));
                        let remove = ui.link(label);
                        out.clicked(
                            &remove,
                            Control::RemoveVideo(video.id.clone()),
                            PageAction::RemoveVideo(video.id.clone()),
                        );
                    });
                });
                let width = ui.available_width();
                let (rect, _) =
                    ui.allocate_exact_size(vec2(width, width * VIDEO_ASPECT), Sense::hover());
                ui.painter().rect_filled(rect, CornerRadius::same(8), Color32::BLACK);
                out.video_slots.push(VideoSlot {
                    id: video.id.clone(),
                    rect,
                    visible: ui.clip_rect().contains_rect(rect),
                });
            });
        ui.add_space(12.0);
    }
}

fn draw_activities(ui: &mut Ui, config: &PageConfig) {
    Frame::new()
        .fill(config.background_color)
        .corner_radius(CornerRadius::same(12))
        .inner_margin(Margin::same(16))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("💡 Actividades divertidas").strong());
            ui.add_space(6.0);
            for activity in ACTIVITIES {
                ui.label(RichText::new(format!("• {activity}")).small());
            }
        });
}
