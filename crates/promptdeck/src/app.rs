use anyhow::Context;
use eframe::egui;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

use crate::carousel::gesture::Release;
use crate::carousel::layout::Motion;
use crate::carousel::session::Session;
use crate::config::Config;
use crate::deck::Slide;
use crate::deck::sequencer::{Mode, Sequencer};
use crate::render::ambient::AmbienceCache;
use crate::render::card::{self, CardFace, CardGeometry};
use crate::render::chrome::{self, HEADER_HEIGHT, Logo};
use crate::render::transition::TransitionDirection;
use crate::selector::{CategorySelector, SelectorAction};
use crate::theme::{ColorPair, Theme};

const TOAST_DURATION: f32 = 1.5;
const TOAST_FADE_START: f32 = 1.0;
const ESC_DOUBLE_TAP: f32 = 1.0;
const EMPTY_MESSAGE: &str = "Keine Fragen verfügbar";

/// Flags from the command line, merged with config in [`run`].
#[derive(Debug, Default)]
pub struct LaunchOptions {
    pub source: Option<String>,
    pub windowed: bool,
    pub questions_only: bool,
    pub categories: Vec<String>,
    pub intro: bool,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        if elapsed < TOAST_FADE_START {
            1.0
        } else if elapsed < TOAST_DURATION {
            1.0 - (elapsed - TOAST_FADE_START) / (TOAST_DURATION - TOAST_FADE_START)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

/// Pointer input gathered inside `ctx.input` and applied afterwards.
enum PointerInput {
    Down(egui::Pos2),
    Move(egui::Pos2),
    Up(egui::Pos2),
    Gone,
}

struct QuizApp {
    session: Session,
    theme: Theme,
    logo: Logo,
    ambience: AmbienceCache,
    selector: CategorySelector,
    rng: StdRng,
    show_hud: bool,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    /// Rest rect of the current card from the last frame, for hit testing.
    last_card_rect: egui::Rect,
}

impl QuizApp {
    fn new(session: Session, mut rng: StdRng) -> Self {
        let now = Instant::now();
        Self {
            session,
            theme: Theme::default(),
            logo: Logo::new(now, &mut rng),
            ambience: AmbienceCache::default(),
            selector: CategorySelector::default(),
            rng,
            show_hud: false,
            toast: None,
            last_esc: None,
            last_card_rect: egui::Rect::NOTHING,
        }
    }

    fn compute_scale(rect: egui::Rect) -> f32 {
        (rect.width() / 1280.0).min(rect.height() / 800.0).clamp(0.5, 2.0)
    }

    /// Rest rect of the current card within the area below the header.
    fn card_rect(area: egui::Rect, scale: f32) -> egui::Rect {
        let width = (area.width() * 0.7).min(520.0 * scale);
        let height = (area.height() * 0.8).min(width * 1.35);
        egui::Rect::from_center_size(area.center(), egui::vec2(width, height))
    }

    /// Spin the logo along with a move that started at `now`.
    fn follow_move(&mut self, now: Instant) {
        if let Some(t) = self.session.gesture().transition() {
            if t.start == now {
                self.logo.spin(t.direction, now);
            }
        }
    }

    fn step(&mut self, direction: TransitionDirection, now: Instant) {
        if self.session.step(direction, now) {
            self.logo.spin(direction, now);
        }
    }

    fn toggle_mode(&mut self) {
        let next = match self.session.sequencer().mode() {
            Mode::Mixed => Mode::QuestionsOnly,
            Mode::QuestionsOnly => Mode::Mixed,
        };
        if self.session.set_mode(next, &mut self.rng) {
            let label = match next {
                Mode::Mixed => "Fragen & Aktionen",
                Mode::QuestionsOnly => "Nur Fragen",
            };
            self.toast = Some(Toast::new(label.to_string()));
        }
    }

    /// Open the category dialog. It takes the pointer, so a drag in progress snaps back.
    fn open_selector(&mut self, now: Instant) {
        self.session.cancel_drag(now);
        let selected = self.session.sequencer().selected().clone();
        self.selector.open(&selected);
    }

    /// Pose of the current card this frame, placed on the last rest rect.
    fn current_card_geometry(&self, now: Instant) -> Option<CardGeometry> {
        let rest = self.last_card_rect;
        self.session
            .place_cards(now, rest.width(), self.theme.gutter)
            .into_iter()
            .find(|p| p.index == self.session.index())
            .map(|p| CardGeometry::new(rest, &p.transform))
    }

    fn finish_drag(&mut self, release: Release, now: Instant) {
        if let Release::Committed(direction) = release {
            self.logo.spin(direction, now);
        }
    }

    fn handle_pointer(&mut self, input: PointerInput, now: Instant) {
        match input {
            PointerInput::Down(pos) => {
                if self.last_card_rect.contains(pos) {
                    self.session.pointer_down(pos.x, now);
                } else {
                    self.session.swipe_down(pos.x, pos.y);
                }
            }
            PointerInput::Move(pos) => {
                if self.session.gesture().is_dragging() {
                    self.session.pointer_move(pos.x);
                    let on_card = self
                        .current_card_geometry(now)
                        .is_some_and(|g| g.contains(pos));
                    if !on_card {
                        let release = self.session.pointer_leave(now);
                        self.finish_drag(release, now);
                    }
                }
            }
            PointerInput::Up(pos) => {
                if self.session.gesture().is_dragging() {
                    let release = self.session.pointer_up(now);
                    self.finish_drag(release, now);
                } else if self.session.swipe_up(pos.x, pos.y, now) {
                    self.follow_move(now);
                }
            }
            PointerInput::Gone => {
                let release = self.session.pointer_leave(now);
                self.finish_drag(release, now);
            }
        }
    }

    fn category_entries(&self) -> Vec<(String, usize, ColorPair)> {
        let sequencer = self.session.sequencer();
        sequencer
            .categories()
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let count = sequencer.count_in(name);
                let colors = crate::theme::category_colors(name, position);
                (name.clone(), count, colors)
            })
            .collect()
    }

    fn draw_cards(&mut self, ui: &egui::Ui, rest: egui::Rect, now: Instant) {
        let gutter = self.theme.gutter;
        let placed = self.session.place_cards(now, rest.width(), gutter);

        let sequencer = self.session.sequencer();
        let visible = placed
            .iter()
            .filter(|p| p.transform.visible)
            .filter_map(|p| sequencer.slide(p.index))
            .map(Slide::text);
        self.ambience.sync(visible, now, &mut self.rng);

        let painter = ui.painter();
        for placed in placed.iter().filter(|p| p.transform.visible) {
            let Some(slide) = sequencer.slide(placed.index) else {
                continue;
            };
            let Some(colors) = self.session.colors_for(placed.index) else {
                continue;
            };
            let question = slide.question();
            let face = CardFace {
                text: slide.text(),
                category: question.map(|q| q.category.as_str()),
                kind: question.map(|q| q.kind.label()),
                colors,
                ambience: question.and_then(|_| self.ambience.get(slide.text())),
            };
            let geometry = CardGeometry::new(rest, &placed.transform);
            card::draw_card(painter, &geometry, &face, &self.theme);
        }
    }

    fn draw_empty_state(&self, ui: &egui::Ui, area: egui::Rect, colors: ColorPair, scale: f32) {
        let galley = ui.painter().layout_no_wrap(
            EMPTY_MESSAGE.to_string(),
            egui::FontId::proportional(28.0 * scale),
            colors.accent,
        );
        let pos = area.center() - galley.rect.size() / 2.0;
        ui.painter().galley(pos, galley, colors.accent);
    }

    fn draw_counter(&self, ui: &egui::Ui, rect: egui::Rect, colors: ColorPair, scale: f32) {
        if self.session.is_empty() {
            return;
        }
        let text = format!("{} / {}", self.session.index() + 1, self.session.len());
        let color = Theme::with_opacity(colors.accent, 0.5);
        let galley =
            ui.painter()
                .layout_no_wrap(text, egui::FontId::monospace(14.0 * scale), color);
        let pos = egui::pos2(
            rect.center().x - galley.rect.width() / 2.0,
            rect.bottom() - 30.0 * scale,
        );
        ui.painter().galley(pos, galley, color);
    }

    /// Request the next frame: immediately while anything moves, otherwise at the next timer.
    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        let animating = !matches!(self.session.motion(now), Motion::Resting)
            || self.logo.is_spinning()
            || self.toast.is_some();
        if animating {
            ctx.request_repaint();
            return;
        }
        let deadline = [
            Some(self.logo.next_deadline()),
            self.ambience.next_deadline(),
            self.session.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(deadline) = deadline {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}

impl eframe::App for QuizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut pointer_inputs: Vec<PointerInput> = Vec::new();
        let dialog_open = self.selector.is_open();

        ctx.input(|i| {
            if !dialog_open {
                for event in &i.events {
                    match event {
                        egui::Event::PointerButton {
                            pos,
                            button: egui::PointerButton::Primary,
                            pressed,
                            ..
                        } => pointer_inputs.push(if *pressed {
                            PointerInput::Down(*pos)
                        } else {
                            PointerInput::Up(*pos)
                        }),
                        egui::Event::PointerMoved(pos) => {
                            pointer_inputs.push(PointerInput::Move(*pos))
                        }
                        egui::Event::PointerGone => pointer_inputs.push(PointerInput::Gone),
                        _ => {}
                    }
                }
            }

            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            // ESC: close the dialog first, then double-tap to quit
            if i.key_pressed(egui::Key::Escape) {
                if dialog_open {
                    self.selector.close();
                    return;
                }
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < ESC_DOUBLE_TAP {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }

            if dialog_open {
                return;
            }

            if i.key_pressed(egui::Key::ArrowRight) {
                self.step(TransitionDirection::Forward, now);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.step(TransitionDirection::Backward, now);
            }
            if i.key_pressed(egui::Key::M) {
                self.toggle_mode();
            }
            if i.key_pressed(egui::Key::C) {
                self.open_selector(now);
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        for input in pointer_inputs {
            self.handle_pointer(input, now);
        }

        self.session.tick(now);
        self.logo.update(now, &mut self.rng);
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let colors = self.session.chrome_colors(now);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors.background).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let scale = Self::compute_scale(rect);

                let header_bottom = rect.top() + HEADER_HEIGHT * scale;
                let area = egui::Rect::from_min_max(
                    egui::pos2(rect.left(), header_bottom),
                    rect.max,
                );
                let rest = Self::card_rect(area, scale);
                self.last_card_rect = rest;

                if self.session.is_empty() {
                    self.draw_empty_state(ui, area, colors, scale);
                } else {
                    self.draw_cards(ui, rest, now);
                }
                self.draw_counter(ui, rect, colors, scale);

                let rotation = self
                    .logo
                    .rotation_deg(now, self.session.drag_fraction(rect.width()));
                let header = chrome::draw_header(
                    ui,
                    rect,
                    colors,
                    &self.theme,
                    scale,
                    &self.logo,
                    rotation,
                    self.session.sequencer().mode(),
                );
                if !self.selector.is_open() {
                    if header.categories_clicked {
                        self.open_selector(now);
                    }
                    if header.mode_clicked {
                        self.toggle_mode();
                    }
                }

                if let Some(ref toast) = self.toast {
                    let opacity = toast.opacity();
                    if opacity > 0.0 {
                        let toast_color = Theme::with_opacity(colors.accent, opacity * 0.9);
                        let toast_bg = Theme::with_opacity(self.theme.panel, opacity * 0.9);
                        let galley = ui.painter().layout_no_wrap(
                            toast.message.clone(),
                            egui::FontId::proportional(20.0 * scale),
                            toast_color,
                        );
                        let padding = 16.0 * scale;
                        let toast_rect = egui::Rect::from_min_size(
                            egui::pos2(
                                rect.center().x - galley.rect.width() / 2.0 - padding,
                                rect.bottom() - 90.0 * scale,
                            ),
                            egui::vec2(
                                galley.rect.width() + padding * 2.0,
                                galley.rect.height() + padding * 2.0,
                            ),
                        );
                        ui.painter().rect_filled(toast_rect, 8.0 * scale, toast_bg);
                        let text_pos =
                            egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
                        ui.painter().galley(text_pos, galley, toast_color);
                    }
                }

                if self.show_hud {
                    let drag_hint = format!(
                        "Move past {:.0} px to turn",
                        self.session.gesture().threshold()
                    );
                    draw_hud(ui, &self.theme, colors, &drag_hint, rect, scale);
                }
            });

        let entries = self.category_entries();
        match self.selector.show(ctx, &entries, &self.theme) {
            SelectorAction::Apply(selected) => {
                let count = selected.len();
                if self.session.set_selected(selected, &mut self.rng) {
                    self.toast = Some(Toast::new(format!("{count} Kategorien")));
                }
            }
            SelectorAction::Close | SelectorAction::None => {}
        }

        self.schedule_repaint(ctx, now);
    }
}

fn draw_hud(
    ui: &egui::Ui,
    theme: &Theme,
    colors: ColorPair,
    drag_hint: &str,
    rect: egui::Rect,
    scale: f32,
) {
    let shortcuts = [
        ("\u{2192} / swipe left", "Next card"),
        ("\u{2190} / swipe right", "Previous card"),
        ("Drag card", drag_hint),
        ("M", "Questions only / mixed"),
        ("C", "Choose categories"),
        ("F", "Toggle fullscreen"),
        ("H", "Toggle this HUD"),
        ("Esc", "Close dialog / \u{00d7}2 exit"),
        ("Q", "Quit"),
    ];

    let bg = Theme::with_opacity(theme.panel, 0.92);
    let text_color = Theme::with_opacity(egui::Color32::WHITE, 0.9);
    let key_color = colors.accent;

    let padding = 24.0 * scale;
    let line_height = 32.0 * scale;
    let hud_height = shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0 * scale;
    let hud_width = 420.0 * scale;

    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(hud_width, hud_height));
    ui.painter().rect_filled(hud_rect, 12.0 * scale, bg);

    let title_galley = ui.painter().layout_no_wrap(
        "Keyboard Shortcuts".to_string(),
        egui::FontId::proportional(20.0 * scale),
        text_color,
    );
    let title_pos = egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding);
    ui.painter().galley(title_pos, title_galley, text_color);

    let mut y = hud_rect.top() + padding + 40.0 * scale;
    for (key, desc) in &shortcuts {
        let key_galley = ui.painter().layout_no_wrap(
            key.to_string(),
            egui::FontId::monospace(15.0 * scale),
            key_color,
        );
        ui.painter()
            .galley(egui::pos2(hud_rect.left() + padding, y), key_galley, key_color);

        let desc_galley = ui.painter().layout_no_wrap(
            desc.to_string(),
            egui::FontId::proportional(15.0 * scale),
            text_color,
        );
        ui.painter().galley(
            egui::pos2(hud_rect.left() + padding + 190.0 * scale, y),
            desc_galley,
            text_color,
        );
        y += line_height;
    }
}

pub fn run(options: LaunchOptions) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let source = config.question_source(options.source.as_deref());
    let deck = source
        .load()
        .with_context(|| format!("Failed to load questions from {}", source.describe()))?;

    let mode = if options.questions_only {
        Mode::QuestionsOnly
    } else {
        config.mode()
    };
    let selection: Vec<String> = if options.categories.is_empty() {
        config.categories().map(<[String]>::to_vec).unwrap_or_default()
    } else {
        options.categories
    };
    let show_intro = options.intro || config.show_intro();
    let windowed = options.windowed || config.windowed();

    tracing::info!(
        questions = deck.questions.len(),
        categories = deck.categories().len(),
        mode = mode.name(),
        "starting deck"
    );

    let mut rng = StdRng::from_os_rng();
    let sequencer = Sequencer::new(deck, mode)
        .with_intro(show_intro)
        .with_selection(&selection);
    let session = Session::new(sequencer, &mut rng);

    let title = "promptdeck";
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(QuizApp::new(session, rng)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
