//! Loan approval predictor: an egui form that encodes an applicant into the
//! 14-feature row a pre-trained classifier expects, downloads that classifier
//! from Google Drive, and shows whether the loan is approved.

pub mod config;
pub mod core;
pub mod encoding;
pub mod gui;
pub mod model;
pub mod persistence;

pub use config::AppConfig;
pub use encoding::{
    ApplicationRecord,
    ApplicationRequest,
};
pub use model::Decision;
