use eframe::egui;
use loan_approval::{
    config::CONFIG_FILE,
    gui::LoanApp,
    persistence::get_data_file_path,
    AppConfig,
};
use tracing::{
    info,
    warn,
};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
    EnvFilter,
};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stdout);

    tracing_subscriber::registry().with(env_filter).with(console_layer).init();
}

fn main() -> eframe::Result {
    init_logging();

    let config = AppConfig::load();
    if !get_data_file_path(CONFIG_FILE).exists() {
        // Write the defaults out so there is a file to edit.
        if let Err(e) = config.save() {
            warn!("Could not write default config: {}", e);
        }
    }
    if config.model_file_id.trim().is_empty() {
        warn!(
            "model_file_id is empty; set it in {} before predicting",
            get_data_file_path(CONFIG_FILE).display()
        );
    }
    info!(artifact = %config.artifact_path.display(), "Loan approval predictor starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Loan Approval Prediction")
            .with_inner_size([1000.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Loan Approval Prediction",
        options,
        Box::new(|cc| Ok(Box::new(LoanApp::new(cc, config)))),
    )
}
