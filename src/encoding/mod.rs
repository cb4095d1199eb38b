//! Turns one submission of the applicant form into the 14-feature row the
//! classifier was trained on.

pub mod categories;

pub use categories::{
    Category,
    CreditHistory,
    Education,
    Gender,
    MaritalStatus,
    PropertyArea,
    SelfEmployed,
};
use serde::{
    Deserialize,
    Serialize,
};

pub const FEATURE_COUNT: usize = 14;

/// Column order expected by the trained model. Do not reorder.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Gender",
    "Marital Status",
    "Dependents",
    "Education",
    "Self-Employed",
    "Applicant Income",
    "Co-Applicant Income",
    "Loan Amount",
    "Loan Term",
    "Credit History",
    "Property Area",
    "Income-to-Loan Ratio",
    "Total Income",
    "Income per Term",
];

pub type FeatureRow = [f64; FEATURE_COUNT];

/// Snapshot of the form at the moment "Predict" is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationRequest {
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub dependents: u32,
    pub education: Education,
    pub self_employed: SelfEmployed,
    pub applicant_income: f64,
    pub co_applicant_income: f64,
    pub loan_amount: f64,
    /// Months.
    pub loan_term: f64,
    pub credit_history: CreditHistory,
    pub property_area: PropertyArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedFields {
    pub total_income: f64,
    pub income_to_loan_ratio: f64,
    pub income_per_term: f64,
}

impl DerivedFields {
    pub fn compute(
        applicant_income: f64,
        co_applicant_income: f64,
        loan_amount: f64,
        loan_term: f64,
    ) -> Self {
        let total_income = total_income(applicant_income, co_applicant_income);
        Self {
            total_income,
            income_to_loan_ratio: income_to_loan_ratio(total_income, loan_amount),
            income_per_term: income_per_term(total_income, loan_term),
        }
    }

    /// Two-decimal lines shown next to the form while it is being edited.
    pub fn summary_lines(&self) -> [String; 3] {
        [
            format!("Income-to-Loan Ratio: {:.2}", self.income_to_loan_ratio),
            format!("Total Income: {:.2}", self.total_income),
            format!("Income per Term: {:.2}", self.income_per_term),
        ]
    }
}

pub fn total_income(applicant_income: f64, co_applicant_income: f64) -> f64 {
    applicant_income + co_applicant_income
}

pub fn income_to_loan_ratio(total_income: f64, loan_amount: f64) -> f64 {
    if loan_amount > 0.0 {
        total_income / loan_amount
    } else {
        0.0
    }
}

pub fn income_per_term(total_income: f64, loan_term: f64) -> f64 {
    if loan_term > 0.0 {
        total_income / loan_term
    } else {
        0.0
    }
}

/// The encoded, immutable record handed to the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplicationRecord {
    features: FeatureRow,
}

impl ApplicationRequest {
    pub fn derived(&self) -> DerivedFields {
        DerivedFields::compute(
            self.applicant_income,
            self.co_applicant_income,
            self.loan_amount,
            self.loan_term,
        )
    }

    pub fn encode(&self) -> ApplicationRecord {
        let derived = self.derived();

        ApplicationRecord {
            features: [
                f64::from(self.gender.code()),
                f64::from(self.marital_status.code()),
                f64::from(self.dependents),
                f64::from(self.education.code()),
                f64::from(self.self_employed.code()),
                self.applicant_income,
                self.co_applicant_income,
                self.loan_amount,
                self.loan_term,
                f64::from(self.credit_history.code()),
                f64::from(self.property_area.code()),
                derived.income_to_loan_ratio,
                derived.total_income,
                derived.income_per_term,
            ],
        }
    }
}

impl ApplicationRecord {
    pub fn features(&self) -> &FeatureRow {
        &self.features
    }

    pub fn named(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.features.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    #[test]
    fn typical_application_derives_expected_fields() {
        let request = ApplicationRequest {
            applicant_income: 5000.0,
            co_applicant_income: 0.0,
            loan_amount: 100_000.0,
            loan_term: 360.0,
            ..Default::default()
        };

        let derived = request.derived();
        assert_eq!(derived.total_income, 5000.0);
        assert_eq!(round2(derived.income_to_loan_ratio), 0.05);
        assert_eq!(round2(derived.income_per_term), 13.89);
        assert_eq!(
            derived.summary_lines(),
            [
                "Income-to-Loan Ratio: 0.05".to_string(),
                "Total Income: 5000.00".to_string(),
                "Income per Term: 13.89".to_string(),
            ]
        );
    }

    #[test]
    fn zero_loan_amount_gives_exact_zero_ratio() {
        let request = ApplicationRequest {
            applicant_income: 4200.0,
            co_applicant_income: 1800.0,
            loan_amount: 0.0,
            loan_term: 12.0,
            ..Default::default()
        };

        let ratio = request.derived().income_to_loan_ratio;
        assert!(ratio.is_finite());
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn encoded_record_follows_feature_order() {
        let request = ApplicationRequest {
            gender: Gender::Female,
            marital_status: MaritalStatus::Single,
            dependents: 2,
            education: Education::Masters,
            self_employed: SelfEmployed::Yes,
            applicant_income: 6000.0,
            co_applicant_income: 2000.0,
            loan_amount: 40_000.0,
            loan_term: 240.0,
            credit_history: CreditHistory::Poor,
            property_area: PropertyArea::Rural,
        };

        let record = request.encode();
        assert_eq!(
            record.features(),
            &[
                0.0, 1.0, 2.0, 2.0, 1.0, 6000.0, 2000.0, 40_000.0, 240.0, 1.0, 0.0, 0.2, 8000.0,
                8000.0 / 240.0,
            ]
        );

        let named = record.named();
        assert_eq!(named.len(), FEATURE_COUNT);
        assert_eq!(named[0], ("Gender", 0.0));
        assert_eq!(named[13].0, "Income per Term");
    }

    #[test]
    fn default_form_encodes_preselected_options() {
        let record = ApplicationRequest::default().encode();
        assert_eq!(record.features(), &[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn ratio_is_zero_without_positive_loan(
            applicant in 0.0f64..1e9,
            co_applicant in 0.0f64..1e9,
            loan_amount in -1e9f64..=0.0,
        ) {
            let total = total_income(applicant, co_applicant);
            prop_assert_eq!(income_to_loan_ratio(total, loan_amount), 0.0);
        }

        #[test]
        fn per_term_is_zero_without_positive_term(
            applicant in 0.0f64..1e9,
            co_applicant in 0.0f64..1e9,
            loan_term in -1e4f64..=0.0,
        ) {
            let total = total_income(applicant, co_applicant);
            prop_assert_eq!(income_per_term(total, loan_term), 0.0);
        }

        #[test]
        fn total_income_is_exact_sum(applicant in 0u32..10_000_000, co_applicant in 0u32..10_000_000) {
            let (a, c) = (f64::from(applicant), f64::from(co_applicant));
            let derived = DerivedFields::compute(a, c, 1.0, 1.0);
            prop_assert_eq!(derived.total_income, a + c);
        }
    }
}
