use eframe::egui::{
    self,
    Ui,
};

use super::theme::Theme;
use crate::{
    config::AppConfig,
    encoding::{
        ApplicationRequest,
        Category,
    },
};

const MONEY_STEP: f64 = 1000.0;

/// UI-level bounds for the numeric inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormLimits {
    pub loan_term_min: f64,
    pub loan_term_step: f64,
}

impl FormLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            loan_term_min: f64::from(config.loan_term_min_months),
            loan_term_step: f64::from(config.loan_term_step_months.max(1)),
        }
    }

    /// Pulls a loaded or restored request back inside the bounds.
    pub fn clamp(&self, request: &mut ApplicationRequest) {
        request.applicant_income = request.applicant_income.max(0.0);
        request.co_applicant_income = request.co_applicant_income.max(0.0);
        request.loan_amount = request.loan_amount.max(0.0);
        request.loan_term = request.loan_term.max(self.loan_term_min);
    }
}

fn step_down(value: f64, step: f64, min: f64) -> f64 {
    (value - step).max(min)
}

fn step_up(value: f64, step: f64) -> f64 {
    value + step
}

fn category_select<C: Category>(ui: &mut Ui, theme: &Theme, value: &mut C) {
    ui.label(theme.field_label(C::FIELD));

    egui::ComboBox::from_id_salt(C::FIELD)
        .selected_text(value.label())
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for option in C::ALL {
                ui.selectable_value(value, *option, option.label());
            }
        });
}

fn number_input(
    ui: &mut Ui,
    theme: &Theme,
    label: &str,
    value: &mut f64,
    min: f64,
    step: f64,
) {
    ui.label(theme.field_label(label));

    ui.horizontal(|ui| {
        ui.add(
            egui::DragValue::new(value)
                .range(min..=f64::MAX)
                .speed(step / 10.0)
                .fixed_decimals(0),
        );
        if ui.small_button("-").clicked() {
            *value = step_down(*value, step, min);
        }
        if ui.small_button("+").clicked() {
            *value = step_up(*value, step);
        }
    });
}

fn count_input(ui: &mut Ui, theme: &Theme, label: &str, value: &mut u32) {
    ui.label(theme.field_label(label));

    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(value).range(0..=u32::MAX).speed(0.1));
        if ui.small_button("-").clicked() {
            *value = value.saturating_sub(1);
        }
        if ui.small_button("+").clicked() {
            *value = value.saturating_add(1);
        }
    });
}

/// Two rows of four columns; the last cell shows the live derived fields.
pub fn application_form(
    ui: &mut Ui,
    theme: &Theme,
    request: &mut ApplicationRequest,
    limits: &FormLimits,
) {
    ui.columns(4, |cols| {
        category_select(&mut cols[0], theme, &mut request.gender);
        category_select(&mut cols[0], theme, &mut request.marital_status);

        count_input(&mut cols[1], theme, "Dependents", &mut request.dependents);
        category_select(&mut cols[1], theme, &mut request.education);

        category_select(&mut cols[2], theme, &mut request.self_employed);
        number_input(
            &mut cols[2],
            theme,
            "Applicant Income (Dollars)",
            &mut request.applicant_income,
            0.0,
            MONEY_STEP,
        );

        number_input(
            &mut cols[3],
            theme,
            "Co-Applicant Income (Dollars)",
            &mut request.co_applicant_income,
            0.0,
            MONEY_STEP,
        );
        number_input(
            &mut cols[3],
            theme,
            "Loan Amount (Dollars)",
            &mut request.loan_amount,
            0.0,
            MONEY_STEP,
        );
    });

    ui.add_space(12.0);

    ui.columns(4, |cols| {
        number_input(
            &mut cols[0],
            theme,
            "Loan Term (Months)",
            &mut request.loan_term,
            limits.loan_term_min,
            limits.loan_term_step,
        );

        category_select(&mut cols[1], theme, &mut request.credit_history);
        category_select(&mut cols[2], theme, &mut request.property_area);

        for line in request.derived().summary_lines() {
            cols[3].label(line);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_respects_minimum() {
        assert_eq!(step_down(5000.0, 1000.0, 0.0), 4000.0);
        assert_eq!(step_down(500.0, 1000.0, 0.0), 0.0);
        assert_eq!(step_down(12.0, 12.0, 12.0), 12.0);
        assert_eq!(step_up(360.0, 12.0), 372.0);
    }

    #[test]
    fn limits_follow_config() {
        let config = AppConfig {
            loan_term_min_months: 12,
            loan_term_step_months: 0,
            ..Default::default()
        };
        let limits = FormLimits::from_config(&config);
        assert_eq!(limits, FormLimits { loan_term_min: 12.0, loan_term_step: 1.0 });

        let mut request = ApplicationRequest {
            loan_term: 0.0,
            loan_amount: -5.0,
            ..Default::default()
        };
        limits.clamp(&mut request);
        assert_eq!(request.loan_term, 12.0);
        assert_eq!(request.loan_amount, 0.0);
    }
}
