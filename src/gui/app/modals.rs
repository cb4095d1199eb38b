use crate::gui::error_modal::ErrorModal;

#[derive(Default)]
pub struct Modals {
    pub error: ErrorModal,
}
