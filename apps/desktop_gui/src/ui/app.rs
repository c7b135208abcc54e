use std::time::{Duration, Instant};

use client_core::{AvatarDescriptor, AvatarProvider, SeededAvatar};
use crossbeam_channel::{Receiver, Sender};
use shared::{
    domain::{Step, PRESET_AMOUNTS},
    protocol::TransactionStatus,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiAction, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::PaymentUiState,
};

const NAV_AVATAR_SIZE: f32 = 60.0;
const CARD_AVATAR_SIZE: f32 = 100.0;
/// Floor for receipt polling so a zero setting cannot spin the repaint loop.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x9b, 0x6d, 0xff);

const SLIDES: [(&str, &str); 3] = [
    (
        "Find your meter",
        "Every meter carries a numeric token id. Enter it once and it is remembered.",
    ),
    (
        "Pick an amount",
        "Combine preset buttons or type an amount. The energy estimate updates as you go.",
    ),
    (
        "Pay on-chain",
        "Approve the payment in your wallet and wait for the receipt to confirm.",
    ),
];

pub struct PaymentApp {
    state: PaymentUiState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    avatars: SeededAvatar,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    slide_index: usize,
}

impl PaymentApp {
    pub fn new(
        state: PaymentUiState,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        poll_interval: Duration,
    ) -> Self {
        let mut app = Self {
            state,
            cmd_tx,
            ui_rx,
            avatars: SeededAvatar,
            poll_interval: effective_poll_interval(poll_interval),
            last_poll: None,
            slide_index: 0,
        };
        for cmd in app.state.startup_commands() {
            app.dispatch(cmd);
        }
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.state.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            for cmd in self.state.apply_event(event) {
                self.dispatch(cmd);
            }
        }
    }

    fn apply_actions(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            for cmd in self.state.apply_action(action) {
                self.dispatch(cmd);
            }
        }
    }

    fn poll_if_due(&mut self, ctx: &egui::Context) {
        if !self.state.tx_status.is_pending() {
            self.last_poll = None;
            return;
        }
        let due = self
            .last_poll
            .map_or(true, |last| last.elapsed() >= self.poll_interval);
        if due {
            self.last_poll = Some(Instant::now());
            self.apply_actions(vec![UiAction::PollTick]);
        }
        ctx.request_repaint_after(self.poll_interval);
    }

    fn avatar(&self, size: f32) -> Option<AvatarDescriptor> {
        self.avatars
            .avatar(self.state.session.token_id(), size as u32)
    }

    fn render_nav(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("Watt-A-Frame").strong());
            ui.label(
                egui::RichText::new("beta")
                    .small()
                    .color(egui::Color32::WHITE)
                    .background_color(egui::Color32::from_rgb(0xef, 0x44, 0x44)),
            );
            if ui.small_button("?").on_hover_text("How it works").clicked() {
                actions.push(UiAction::OpenSlides);
            }

            if self.state.session.shows_nav_avatar() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(avatar) = self.avatar(NAV_AVATAR_SIZE) {
                        let response = paint_avatar(ui, &avatar, NAV_AVATAR_SIZE)
                            .on_hover_text(format!("{} - back to device", avatar.alias));
                        if response.clicked() {
                            actions.push(UiAction::Retreat);
                        }
                    }
                });
            }
        });
    }

    fn render_identify(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.vertical_centered(|ui| {
            match self.avatar(CARD_AVATAR_SIZE) {
                Some(avatar) => {
                    paint_avatar(ui, &avatar, CARD_AVATAR_SIZE);
                    ui.label(egui::RichText::new(&avatar.alias).strong());
                }
                None => {
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(CARD_AVATAR_SIZE, CARD_AVATAR_SIZE),
                        egui::Sense::hover(),
                    );
                    ui.painter()
                        .rect_filled(rect, 10.0, ui.visuals().faint_bg_color);
                }
            }
        });
        ui.add_space(8.0);

        let mut token_input = self.state.token_input.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut token_input)
                .hint_text("Enter M3ter ID")
                .desired_width(f32::INFINITY),
        );
        if response.changed() {
            actions.push(UiAction::TokenInputChanged(token_input));
        }
        ui.add_space(8.0);

        if self.state.is_connected() {
            if ui
                .add_enabled(self.state.session.can_advance(), egui::Button::new("Next >"))
                .clicked()
            {
                actions.push(UiAction::Advance);
            }
        } else {
            self.render_connect(ui, actions);
        }
    }

    fn render_pay(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        let amounts = self.state.session.amounts();
        ui.horizontal_wrapped(|ui| {
            for amount in PRESET_AMOUNTS {
                let button = egui::Button::new(format!("${amount}"))
                    .selected(amounts.is_selected(amount))
                    .min_size(egui::vec2(56.0, 40.0));
                if ui.add(button).clicked() {
                    actions.push(UiAction::TogglePreset(amount));
                }
            }
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let mut amount_input = self.state.amount_input.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut amount_input)
                    .hint_text("Enter amount")
                    .desired_width(180.0),
            );
            if response.changed() {
                actions.push(UiAction::AmountInputChanged(amount_input));
            }
            if let Some(label) = self.state.session.energy_label() {
                ui.label(format!("{label} \u{26a1}"));
            }
        });
        ui.add_space(8.0);

        if !self.state.is_connected() {
            self.render_connect(ui, actions);
            return;
        }

        ui.horizontal(|ui| {
            let pay = egui::Button::new(egui::RichText::new("Pay").color(egui::Color32::WHITE))
                .fill(ACCENT);
            if ui.add_enabled(self.state.can_submit(), pay).clicked() {
                actions.push(UiAction::Submit);
            }
            if self.state.is_busy() {
                ui.spinner();
            }
        });
        render_tx_status(ui, &self.state.tx_status);
    }

    fn render_connect(&self, ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
        ui.horizontal(|ui| {
            let connect =
                egui::Button::new(egui::RichText::new("Connect").color(egui::Color32::WHITE))
                    .fill(ACCENT);
            if ui.add_enabled(!self.state.is_connecting(), connect).clicked() {
                actions.push(UiAction::ConnectWallet);
            }
            if self.state.is_connecting() {
                ui.spinner();
            }
        });
    }

    fn render_slides(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        if !self.state.session.slide_open() {
            return;
        }
        let mut open = true;
        let (title, body) = SLIDES[self.slide_index % SLIDES.len()];
        egui::Window::new("How it works")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.heading(title);
                ui.label(body);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("<").clicked() {
                        self.slide_index = (self.slide_index + SLIDES.len() - 1) % SLIDES.len();
                    }
                    ui.label(format!(
                        "{}/{}",
                        self.slide_index % SLIDES.len() + 1,
                        SLIDES.len()
                    ));
                    if ui.button(">").clicked() {
                        self.slide_index = (self.slide_index + 1) % SLIDES.len();
                    }
                });
            });
        if !open {
            actions.push(UiAction::CloseSlides);
        }
    }
}

impl eframe::App for PaymentApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.poll_if_due(ctx);

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            self.render_nav(ui, &mut actions);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(self.state.status.as_str());
                if let Some(account) = self.state.account {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.small(egui::RichText::new(account.to_string()).monospace());
                    });
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.state.last_error {
                ui.horizontal(|ui| {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("{}: {}", err.label(), err.message()),
                    );
                    if ui.small_button("x").clicked() {
                        actions.push(UiAction::DismissError);
                    }
                });
                ui.separator();
            }

            if self.state.is_loading() {
                ui.spinner();
                return;
            }

            ui.group(|ui| match self.state.session.step() {
                Step::Identify => self.render_identify(ui, &mut actions),
                Step::Pay => self.render_pay(ui, &mut actions),
            });
        });

        self.render_slides(ctx, &mut actions);
        self.apply_actions(actions);

        // Backend events arrive off the UI thread.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

fn effective_poll_interval(configured: Duration) -> Duration {
    configured.max(MIN_POLL_INTERVAL)
}

fn render_tx_status(ui: &mut egui::Ui, status: &TransactionStatus) {
    match status {
        TransactionStatus::Idle => {}
        TransactionStatus::Pending(hash) => {
            ui.small(format!("Pending {hash}"));
        }
        TransactionStatus::Confirmed(hash) => {
            ui.colored_label(
                egui::Color32::from_rgb(0x22, 0xc5, 0x5e),
                format!("Confirmed {hash}"),
            );
        }
        TransactionStatus::Failed(reason) => {
            ui.colored_label(ui.visuals().error_fg_color, format!("Failed: {reason}"));
        }
    }
}

/// Identicon-style disc: fill and ring colors come from the token digest.
fn paint_avatar(ui: &mut egui::Ui, avatar: &AvatarDescriptor, size: f32) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
    let [fill, ring] = avatar_colors(&avatar.digest_hex);
    let painter = ui.painter();
    painter.circle_filled(rect.center(), size / 2.0, fill);
    painter.circle_stroke(rect.center(), size / 2.0 - 3.0, egui::Stroke::new(4.0, ring));
    response
}

fn avatar_colors(digest_hex: &str) -> [egui::Color32; 2] {
    let byte = |index: usize| {
        digest_hex
            .get(index * 2..index * 2 + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0x80)
    };
    [
        egui::Color32::from_rgb(byte(2), byte(3), byte(4)),
        egui::Color32::from_rgb(byte(5), byte(6), byte(7)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_colors_follow_digest_bytes() {
        let [fill, ring] = avatar_colors("0000ff10200a0b0c");
        assert_eq!(fill, egui::Color32::from_rgb(0xff, 0x10, 0x20));
        assert_eq!(ring, egui::Color32::from_rgb(0x0a, 0x0b, 0x0c));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        assert_eq!(effective_poll_interval(Duration::ZERO), MIN_POLL_INTERVAL);
        assert_eq!(
            effective_poll_interval(Duration::from_secs(2)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn short_digest_falls_back_to_neutral() {
        let [fill, _] = avatar_colors("ab");
        assert_eq!(fill, egui::Color32::from_rgb(0x80, 0x80, 0x80));
    }
}
