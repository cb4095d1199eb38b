pub mod app;
pub mod error_modal;
pub mod form;
pub mod message_overlay;
pub mod result_panel;
pub mod theme;

pub use app::LoanApp;
