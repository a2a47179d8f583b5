// src/gui.rs
use crate::config::{AppConfig, BandKind};
use crate::connectivity::TcpProbe;
use crate::engine::{self, Engine};
use crate::forecast::{self, ForecastError, ForecastSeries, ForecastWindow};
use crate::form::{FieldValue, Form};
use crate::i18n::{Language, UiText};
use crate::notify::{self, DATE_FORMAT};
use crate::session::PostgresAuthenticator;
use crate::types::*;
use crate::visualizer::{self, PlotModel};
use eframe::egui;
use egui::{Color32, RichText, Vec2};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

const BACKGROUND_COLOR: Color32 = Color32::from_rgb(0xff, 0xf1, 0xe6);
const BUTTON_COLOR: Color32 = Color32::from_rgb(0x1b, 0xc1, 0x63);
const TEXT_COLOR: Color32 = Color32::BLACK;
const ERROR_COLOR: Color32 = Color32::from_rgb(190, 30, 30);
const INFO_COLOR: Color32 = Color32::from_rgb(20, 90, 170);

const FORM_WIDTH: f32 = 340.0;
const BUTTON_HEIGHT: f32 = 32.0;
const PLOT_DIALOG_SIZE: [f32; 2] = [620.0, 560.0];
const REPORTS_DIR: &str = "reports";
const MAX_LOG_LINES: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Login,
    Main,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MessageLevel {
    Info,
    Error,
}

enum Dialog {
    SelectDates(Form),
    Plot { bearing: usize },
    SendMessage(Form),
    Message { level: MessageLevel, text: String },
    ConfirmExit,
}

enum DialogOutcome {
    Keep,
    Close,
    Push(Dialog),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pending {
    Login,
    Send,
}

pub struct VibrationApp {
    config: Arc<AppConfig>,
    language: Language,
    screen: Screen,
    login_form: Form,
    bearing: usize,
    series: ForecastSeries,
    forecast_window: Option<ForecastWindow>,
    user: Option<String>,
    dialogs: Vec<Dialog>,
    pending: Option<Pending>,
    exit_confirmed: bool,
    shown_title: String,
    log_messages: Vec<String>,
    rx: Receiver<AppMessage>,
    tx_cmd: Sender<GuiCommand>,
}

impl VibrationApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Arc<AppConfig>) -> Self {
        // 1. engine thread owns probe, database session and sender
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let engine = Engine::new(
            Box::new(TcpProbe::new(config.probe.clone())),
            Box::new(PostgresAuthenticator::new(config.database.clone())),
            notify::build_sender(&config.notify),
        );
        engine::spawn_thread(engine, tx, rx_cmd);

        // 2. theme
        Self::apply_theme(&cc.egui_ctx);

        // 3. last used language wins over the configured one
        let language = Self::load_language_from_disk()
            .or_else(|| Language::from_code(&config.ui.language))
            .unwrap_or_else(|| {
                log::warn!("unknown ui.language {:?}, using Russian", config.ui.language);
                Language::Russian
            });
        Self::with_channels(config, language, rx, tx_cmd)
    }

    fn with_channels(
        config: Arc<AppConfig>,
        language: Language,
        rx: Receiver<AppMessage>,
        tx_cmd: Sender<GuiCommand>,
    ) -> Self {
        let screen = if config.auth.required {
            Screen::Login
        } else {
            log::info!("auth.required = false, opening main window without a session");
            Screen::Main
        };
        let series = build_series(&config);

        let mut app = Self {
            config,
            language,
            screen,
            login_form: Form::login(),
            bearing: 0,
            series,
            forecast_window: None,
            user: None,
            dialogs: Vec::new(),
            pending: None,
            exit_confirmed: false,
            shown_title: String::new(),
            log_messages: Vec::new(),
            rx,
            tx_cmd,
        };
        app.log(app.text(UiText::Ready));
        app
    }

    fn apply_theme(ctx: &egui::Context) {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = BACKGROUND_COLOR;
        visuals.window_fill = BACKGROUND_COLOR;
        visuals.override_text_color = Some(TEXT_COLOR);
        ctx.set_visuals(visuals);
    }

    fn language_store_path() -> PathBuf {
        PathBuf::from("data/last_language.txt")
    }

    fn load_language_from_disk() -> Option<Language> {
        let raw = fs::read_to_string(Self::language_store_path()).ok()?;
        Language::from_code(&raw)
    }

    fn persist_language(&self) {
        self.persist_language_at(&Self::language_store_path());
    }

    fn persist_language_at(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("cannot create {}: {e}", parent.display());
            }
        }
        if let Err(e) = fs::write(path, self.language.code()) {
            log::warn!("cannot remember language in {}: {e}", path.display());
        }
    }

    fn set_language(&mut self, lang: Language) {
        if self.language != lang {
            self.language = lang;
            self.persist_language();
        }
    }

    fn text(&self, key: UiText) -> &'static str {
        self.language.text(key)
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn message(&self, level: MessageLevel, text: impl Into<String>) -> Dialog {
        Dialog::Message {
            level,
            text: text.into(),
        }
    }

    fn push_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        let dialog = self.message(level, text);
        self.dialogs.push(dialog);
    }

    fn forecast_error_text(&self, err: &ForecastError) -> String {
        match err {
            ForecastError::SameDay => self.text(UiText::SameDay).to_owned(),
            ForecastError::BeginAfterEnd => self.text(UiText::BeginAfterEnd).to_owned(),
            other => other.to_string(),
        }
    }

    fn window_caption(&self) -> Option<String> {
        self.forecast_window.map(|w| {
            format!(
                "{} – {}",
                w.begin().format(DATE_FORMAT),
                w.end().format(DATE_FORMAT)
            )
        })
    }

    fn dispatch(&mut self, cmd: GuiCommand, pending: Pending) {
        // at most one command in flight
        if self.tx_cmd.send(cmd).is_err() {
            log::error!("engine thread is gone, cannot run {pending:?}");
            self.push_message(MessageLevel::Error, "engine thread stopped");
            return;
        }
        self.pending = Some(pending);
    }

    fn wide_button(ui: &mut egui::Ui, label: &str) -> egui::Response {
        ui.add_sized(
            [ui.available_width(), BUTTON_HEIGHT],
            egui::Button::new(RichText::new(label).color(TEXT_COLOR)).fill(BUTTON_COLOR),
        )
    }

    /// The base screen only accepts input when nothing is pending and no dialog is open.
    fn accepts_input(&self) -> bool {
        self.pending.is_none() && self.dialogs.is_empty()
    }

    fn submit_login(&mut self) {
        // Enter is read from raw input, which a disabled Ui does not filter
        if !self.accepts_input() {
            return;
        }
        if let Err(e) = self.login_form.validate() {
            self.push_message(MessageLevel::Error, e.localized(self.language));
            return;
        }
        let cmd = GuiCommand::Login {
            username: self.login_form.text("login").trim().to_owned(),
            password: self.login_form.text("password").to_owned(),
        };
        self.dispatch(cmd, Pending::Login);
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply_message(msg);
        }
    }

    fn apply_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Log(s) => self.log(&s),
            AppMessage::Offline => {
                self.pending = None;
                self.log(self.text(UiText::Offline));
                self.push_message(MessageLevel::Error, self.text(UiText::Offline));
            }
            AppMessage::LoginSucceeded { user } => {
                self.pending = None;
                // drop the typed password together with the form
                self.login_form = Form::login();
                self.user = Some(user);
                self.screen = Screen::Main;
            }
            // screen and user stay untouched: no way into Main without a session
            AppMessage::LoginFailed(reason) => {
                self.pending = None;
                self.log(&reason);
                self.push_message(MessageLevel::Error, self.text(UiText::BadCredentials));
            }
            // the send dialog stays open under the result
            AppMessage::NotificationSent(backend) => {
                self.pending = None;
                self.log(&format!("{} ({backend:?})", self.text(UiText::SentOk)));
                self.push_message(MessageLevel::Info, self.text(UiText::SentOk));
            }
            AppMessage::NotificationFailed(reason) => {
                self.pending = None;
                let text = format!("{} {reason}", self.text(UiText::SendFailed));
                self.log(&text);
                self.push_message(MessageLevel::Error, text);
            }
        }
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.exit_confirmed {
            return;
        }
        ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        if !self.dialogs.iter().any(|d| matches!(d, Dialog::ConfirmExit)) {
            self.dialogs.push(Dialog::ConfirmExit);
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = match self.screen {
            Screen::Login => self.text(UiText::LoginTitle),
            Screen::Main => self.text(UiText::MainTitle),
        };
        if self.shown_title != title {
            self.shown_title = title.to_owned();
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.to_owned()));
        }
    }

    fn show_login(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.text(UiText::LoginTitle));
        ui.add_space(12.0);
        self.login_form.show(ui, self.language);
        ui.add_space(12.0);
        let submitted = Self::wide_button(ui, self.text(UiText::Enter)).clicked()
            || ui.input(|i| i.key_pressed(egui::Key::Enter));
        if submitted {
            self.submit_login();
        }
    }

    fn show_main(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.text(UiText::MainTitle));
        let user = self
            .user
            .clone()
            .unwrap_or_else(|| self.text(UiText::NoSession).to_owned());
        ui.label(format!("{} {user}", self.text(UiText::User)));
        ui.add_space(10.0);

        let labels = self.config.bearings.labels();
        let selected = labels.get(self.bearing).cloned().unwrap_or_default();
        let caption = self.text(UiText::Bearing);
        ui.horizontal(|ui| {
            ui.label(caption);
            egui::ComboBox::from_id_source("main_bearing")
                .selected_text(selected)
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for (i, label) in labels.iter().enumerate() {
                        ui.selectable_value(&mut self.bearing, i, label.as_str());
                    }
                });
        });
        ui.add_space(10.0);

        // menu buttons only push dialogs, nothing runs until the dialog submits
        if Self::wide_button(ui, self.text(UiText::SelectDates)).clicked() {
            let mut form = Form::date_range();
            // reopen with the last accepted window
            if let Some(w) = self.forecast_window {
                form.set("begin", FieldValue::Date(w.begin()));
                form.set("end", FieldValue::Date(w.end()));
            }
            self.dialogs.push(Dialog::SelectDates(form));
        }
        ui.add_space(6.0);
        if Self::wide_button(ui, self.text(UiText::Visualize)).clicked() {
            self.dialogs.push(Dialog::Plot {
                bearing: self.bearing,
            });
        }
        ui.add_space(6.0);
        if Self::wide_button(ui, self.text(UiText::SendMessage)).clicked() {
            let mut form = Form::send_message(labels);
            form.set("bearing", FieldValue::Choice(self.bearing));
            self.dialogs.push(Dialog::SendMessage(form));
        }

        ui.add_space(10.0);
        let period = self
            .window_caption()
            .unwrap_or_else(|| self.text(UiText::NotSelected).to_owned());
        ui.label(format!("{} {period}", self.text(UiText::ForecastPeriod)));
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.text(UiText::Language));
                let mut selected = self.language;
                egui::ComboBox::from_id_source("language_switcher")
                    .selected_text(self.language.display_name())
                    .show_ui(ui, |ui| {
                        for lang in [Language::Russian, Language::English] {
                            ui.selectable_value(&mut selected, lang, lang.display_name());
                        }
                    });
                self.set_language(selected);
                if self.pending.is_some() {
                    ui.separator();
                    ui.spinner();
                    ui.label(self.text(UiText::Working));
                }
            });
            // last lines of the in-window log
            egui::ScrollArea::vertical()
                .max_height(70.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for msg in &self.log_messages {
                        ui.small(msg.as_str());
                    }
                });
        });
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        // only the top dialog reacts; the rest are drawn disabled
        let mut dialogs = std::mem::take(&mut self.dialogs);
        let top = dialogs.len().checked_sub(1);
        let mut outcome = DialogOutcome::Keep;
        for (idx, dialog) in dialogs.iter_mut().enumerate() {
            let is_top = Some(idx) == top;
            let result = self.show_dialog(ctx, idx, dialog, is_top && self.pending.is_none());
            if is_top {
                outcome = result;
            }
        }
        match outcome {
            DialogOutcome::Keep => {}
            DialogOutcome::Close => {
                dialogs.pop();
            }
            DialogOutcome::Push(d) => dialogs.push(d),
        }
        // dialogs raised while the stack was taken out go on top
        dialogs.append(&mut self.dialogs);
        self.dialogs = dialogs;
    }

    fn show_dialog(
        &mut self,
        ctx: &egui::Context,
        idx: usize,
        dialog: &mut Dialog,
        interactive: bool,
    ) -> DialogOutcome {
        let title = match dialog {
            Dialog::SelectDates(_) => self.text(UiText::SelectDates),
            Dialog::Plot { .. } => self.text(UiText::PlotTitle),
            Dialog::SendMessage(_) => self.text(UiText::SendTitle),
            Dialog::Message { .. } | Dialog::ConfirmExit => " ",
        };
        // the exit question has to be answered with a button
        let closable = !matches!(dialog, Dialog::ConfirmExit);
        let resizable = matches!(dialog, Dialog::Plot { .. });

        let mut open = true;
        let mut outcome = DialogOutcome::Keep;
        let mut window = egui::Window::new(title)
            .id(egui::Id::new(("dialog", idx)))
            .collapsible(false)
            .resizable(resizable)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO);
        if resizable {
            window = window.default_size(PLOT_DIALOG_SIZE);
        }
        if closable {
            window = window.open(&mut open);
        }
        window.show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                outcome = match dialog {
                    Dialog::SelectDates(form) => self.show_select_dates(ui, form),
                    Dialog::Plot { bearing } => self.show_plot(ui, *bearing),
                    Dialog::SendMessage(form) => self.show_send_message(ui, form),
                    Dialog::Message { level, text } => Self::show_message(ui, *level, text, self.language),
                    Dialog::ConfirmExit => self.show_confirm_exit(ui, ctx),
                };
            });
        });
        if !open && interactive {
            return DialogOutcome::Close;
        }
        outcome
    }

    fn show_select_dates(&mut self, ui: &mut egui::Ui, form: &mut Form) -> DialogOutcome {
        form.show(ui, self.language);
        ui.add_space(10.0);
        if !Self::wide_button(ui, self.text(UiText::Predict)).clicked() {
            return DialogOutcome::Keep;
        }
        let (Some(begin), Some(end)) = (form.date("begin"), form.date("end")) else {
            return DialogOutcome::Keep;
        };
        match ForecastWindow::new(begin, end) {
            Ok(window) => {
                self.forecast_window = Some(window);
                let caption = self.window_caption().unwrap_or_default();
                log::info!("forecast window set: {caption} ({} days)", window.days());
                self.log(&format!("{} {caption}", self.text(UiText::ForecastPeriod)));
                DialogOutcome::Close
            }
            Err(e) => {
                log::warn!("rejected forecast window {begin}..{end}: {e}");
                DialogOutcome::Push(self.message(MessageLevel::Error, self.forecast_error_text(&e)))
            }
        }
    }

    fn show_plot(&mut self, ui: &mut egui::Ui, bearing: usize) -> DialogOutcome {
        let lang = self.language;
        // the model borrows the series, so the export result is handled after it is dropped
        let config = Arc::clone(&self.config);
        let exported: Option<anyhow::Result<PathBuf>> = {
            let label = config.bearings.label(bearing);
            let outliers = forecast::outliers(&self.series, &config.bearings, bearing);
            match (label, outliers) {
                (Ok(title), Ok(outliers)) => {
                    let model = PlotModel {
                        series: &self.series,
                        outliers: &outliers,
                        title,
                        subtitle: self.window_caption(),
                    };
                    let clicked = ui.button(self.text(UiText::ExportPng)).clicked();
                    visualizer::draw_forecast(ui, &model, lang);
                    clicked.then(|| {
                        visualizer::export_forecast_png(&model, lang, Path::new(REPORTS_DIR))
                    })
                }
                (Err(e), _) | (_, Err(e)) => {
                    ui.colored_label(ERROR_COLOR, e.to_string());
                    None
                }
            }
        };

        match exported {
            Some(Ok(path)) => {
                let text = format!("{} {}", self.text(UiText::Exported), path.display());
                self.log(&text);
                DialogOutcome::Push(self.message(MessageLevel::Info, text))
            }
            Some(Err(e)) => {
                log::error!("plot export failed: {e:#}");
                let text = format!("{} {e}", self.text(UiText::ExportFailed));
                DialogOutcome::Push(self.message(MessageLevel::Error, text))
            }
            None => DialogOutcome::Keep,
        }
    }

    fn show_send_message(&mut self, ui: &mut egui::Ui, form: &mut Form) -> DialogOutcome {
        form.show(ui, self.language);
        ui.add_space(10.0);
        if !Self::wide_button(ui, self.text(UiText::Send)).clicked() {
            return DialogOutcome::Keep;
        }
        let target = self
            .config
            .bearings
            .label(form.choice("bearing"))
            .map(str::to_owned);
        match (target, form.date("deadline")) {
            (Ok(bearing_label), Some(deadline)) => {
                let notification = Notification {
                    bearing_label,
                    deadline,
                };
                self.dispatch(GuiCommand::SendNotification(notification), Pending::Send);
                DialogOutcome::Keep
            }
            (Err(e), _) => DialogOutcome::Push(self.message(MessageLevel::Error, e.to_string())),
            (Ok(_), None) => DialogOutcome::Keep,
        }
    }

    fn show_message(ui: &mut egui::Ui, level: MessageLevel, text: &str, lang: Language) -> DialogOutcome {
        ui.set_min_width(260.0);
        ui.horizontal(|ui| {
            let (icon, color) = match level {
                MessageLevel::Info => ("ℹ", INFO_COLOR),
                MessageLevel::Error => ("⚠", ERROR_COLOR),
            };
            ui.label(RichText::new(icon).size(22.0).color(color));
            ui.label(text);
        });
        ui.add_space(8.0);
        if Self::wide_button(ui, lang.text(UiText::Ok)).clicked() {
            DialogOutcome::Close
        } else {
            DialogOutcome::Keep
        }
    }

    fn show_confirm_exit(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) -> DialogOutcome {
        ui.horizontal(|ui| {
            ui.label(RichText::new("⚠").size(22.0).color(ERROR_COLOR));
            ui.label(self.text(UiText::ConfirmExit));
        });
        ui.add_space(8.0);
        let mut outcome = DialogOutcome::Keep;
        ui.columns(2, |cols| {
            if Self::wide_button(&mut cols[0], self.text(UiText::Yes)).clicked() {
                self.exit_confirmed = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                outcome = DialogOutcome::Close;
            }
            if cols[1]
                .add_sized(
                    [cols[1].available_width(), BUTTON_HEIGHT],
                    egui::Button::new(self.text(UiText::No)),
                )
                .clicked()
            {
                outcome = DialogOutcome::Close;
            }
        });
        outcome
    }
}

fn build_series(config: &AppConfig) -> ForecastSeries {
    let ramp = ForecastSeries::ramp(config.forecast.points, config.forecast.half_width);
    match config.forecast.band {
        BandKind::Fixed => ramp,
        BandKind::Interval => match ForecastSeries::with_prediction_interval(&ramp.values()) {
            Ok(series) => series,
            Err(e) => {
                log::error!("prediction interval unavailable ({e}), keeping fixed band");
                ramp
            }
        },
    }
}

impl eframe::App for VibrationApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. drain engine replies
        self.process_messages();
        // 2. window close goes through the confirmation dialog
        self.handle_close_request(ctx);
        self.sync_title(ctx);

        // keep polling while the engine works, the UI gets no input events then
        if self.pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // 3. status bar
        self.show_status_bar(ctx);

        // 4. base screen, frozen under dialogs and pending commands
        let enabled = self.accepts_input();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(16.0);
                    ui.allocate_ui(Vec2::new(FORM_WIDTH, ui.available_height()), |ui| {
                        ui.vertical(|ui| match self.screen {
                            Screen::Login => self.show_login(ui),
                            Screen::Main => self.show_main(ui),
                        });
                    });
                });
            });
        });

        // 5. dialogs on top
        self.show_dialogs(ctx);
    }
}
