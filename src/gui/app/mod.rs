mod modals;

use std::time::Duration;

use eframe::egui;
use modals::Modals;
use tracing::{
    error,
    info,
};

use super::{
    form::{
        application_form,
        FormLimits,
    },
    message_overlay::MessageOverlay,
    result_panel::{
        encoded_record_table,
        status_line,
        PredictionView,
    },
    theme::{
        set_theme,
        Theme,
    },
};
use crate::{
    config::AppConfig,
    core::{
        tasks::{
            TaskManager,
            TaskResult,
        },
        ArtifactCache,
        PredictionState,
    },
    encoding::ApplicationRequest,
};

pub struct LoanApp {
    // Form
    pub request: ApplicationRequest,
    pub limits: FormLimits,

    // Configuration
    pub config: AppConfig,

    // UI State
    pub theme: Theme,
    pub view: PredictionView,
    pub message_overlay: MessageOverlay,
    pub modals: Modals,

    // Model
    cache: ArtifactCache,
    task_manager: TaskManager,
}

impl LoanApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let theme = Theme::dracula();
        set_theme(&cc.egui_ctx, &theme);
        cc.egui_ctx.set_zoom_factor(cc.egui_ctx.zoom_factor() + 0.2);

        Self::with_config(config, theme)
    }

    fn with_config(config: AppConfig, theme: Theme) -> Self {
        let limits = FormLimits::from_config(&config);
        let mut request = ApplicationRequest::default();
        limits.clamp(&mut request);

        Self {
            request,
            limits,
            config,
            theme,
            view: PredictionView::default(),
            message_overlay: MessageOverlay::new(),
            modals: Modals::default(),
            cache: ArtifactCache::new(),
            task_manager: TaskManager::new(),
        }
    }

    fn submit(&mut self) {
        if self.view.state.is_busy() {
            return;
        }

        // The request is copied, so later edits cannot change this submission.
        let request = self.request;
        info!(?request, "Submitting application");

        self.view.start();
        self.view.record = Some(request.encode());
        self.message_overlay.set_message(self.view.state.message());
        self.task_manager.predict(request, self.config.clone(), self.cache.clone());
    }

    fn handle_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::PredictionState(state) => {
                self.view.state = state;
                if state.is_busy() {
                    self.message_overlay.set_message(state.message());
                }
            }

            TaskResult::PredictionFinished { record, outcome } => {
                self.message_overlay.clear_message();
                self.view.record = Some(record);

                match outcome {
                    Ok(decision) => {
                        self.view.state = decision.into();
                        self.view.error = None;
                    }
                    Err(failure) => {
                        error!("Prediction run failed: {}", failure);
                        if !self.view.state.is_terminal() {
                            self.view.state = PredictionState::PredictFailed;
                        }
                        self.view.error = Some(failure.to_string());
                        self.modals.error.show_failure(&failure);
                    }
                }
            }
        }
    }
}

impl eframe::App for LoanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for result in self.task_manager.poll_results() {
            self.handle_task_result(result);
        }

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            status_line(ui, &self.theme, &self.view);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.theme.heading("Loan Approval Prediction"));
            ui.add_space(8.0);

            application_form(ui, &self.theme, &mut self.request, &self.limits);

            ui.add_space(12.0);
            let predict = ui.add_enabled(
                !self.view.state.is_busy(),
                egui::Button::new("Predict").min_size(egui::vec2(120.0, 32.0)),
            );
            if predict.clicked() {
                self.submit();
            }

            if let Some(record) = &self.view.record {
                ui.add_space(12.0);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    encoded_record_table(ui, &self.theme, record);
                });
            }
        });

        self.message_overlay.show(ctx, &self.theme);
        self.modals.error.show(ctx, &self.theme);

        if self.view.state.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
