use eframe::egui::{
    self,
    RichText,
    Ui,
};
use egui_extras::{
    Column,
    TableBuilder,
};

use super::theme::Theme;
use crate::{
    core::PredictionState,
    encoding::ApplicationRecord,
};

/// What the result area shows after the last click.
#[derive(Debug, Clone, Default)]
pub struct PredictionView {
    pub state: PredictionState,
    pub record: Option<ApplicationRecord>,
    pub error: Option<String>,
}

impl PredictionView {
    pub fn start(&mut self) {
        self.state = PredictionState::Fetching;
        self.error = None;
    }

    pub fn status_text(&self) -> String {
        match (&self.state, &self.error) {
            (PredictionState::FetchFailed | PredictionState::PredictFailed, Some(error)) => {
                format!("{} {}", self.state.message(), error)
            }
            _ => self.state.message().to_string(),
        }
    }
}

pub fn status_line(ui: &mut Ui, theme: &Theme, view: &PredictionView) {
    let color = match view.state {
        PredictionState::Approved => theme.approved(),
        PredictionState::Denied | PredictionState::FetchFailed | PredictionState::PredictFailed => {
            theme.denied()
        }
        _ => theme.pending(),
    };

    let text = RichText::new(view.status_text()).color(color);
    if view.state.is_terminal() {
        ui.label(text.size(20.0).strong());
    } else {
        ui.horizontal(|ui| {
            if view.state.is_busy() {
                ui.add(egui::Spinner::new());
            }
            ui.label(text);
        });
    }
}

/// Feature/value table of the record sent to the model.
pub fn encoded_record_table(ui: &mut Ui, theme: &Theme, record: &ApplicationRecord) {
    ui.label(theme.heading("Encoded data for model prediction"));

    let row_height = egui::TextStyle::Body
        .resolve(ui.style())
        .size
        .max(ui.spacing().interact_size.y);

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(180.0))
        .column(Column::remainder())
        .header(22.0, |mut header| {
            header.col(|ui| {
                ui.strong("Feature");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|body| {
            let named = record.named();
            body.rows(row_height, named.len(), |mut row| {
                let (name, value) = named[row.index()];
                row.col(|ui| {
                    ui.label(name);
                });
                row.col(|ui| {
                    ui.monospace(format_value(value));
                });
            });
        });
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
