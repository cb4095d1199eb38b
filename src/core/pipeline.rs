use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    sync::{
        Arc,
        Mutex,
    },
};

use thiserror::Error;
use tracing::{
    info,
    warn,
};

use crate::{
    config::AppConfig,
    core::http::{
        http_client,
        DriveDownloader,
        FetchError,
    },
    encoding::{
        ApplicationRecord,
        ApplicationRequest,
    },
    model::{
        load_artifact,
        ArtifactError,
        Classifier,
        Decision,
        ModelArtifact,
        ModelError,
    },
};

/// Why a prediction run stopped before producing a decision.
#[derive(Error, Debug)]
pub enum PredictionFailure {
    #[error("Could not download the model: {0}")]
    Network(FetchError),

    #[error("The model download returned no content")]
    MissingArtifact,

    #[error("Could not load the model: {0}")]
    ArtifactLoad(ArtifactError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ModelError),

    #[error("The prediction worker stopped unexpectedly")]
    Interrupted,
}

impl From<FetchError> for PredictionFailure {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::EmptyBody(_) => PredictionFailure::MissingArtifact,
            other => PredictionFailure::Network(other),
        }
    }
}

impl From<ArtifactError> for PredictionFailure {
    fn from(error: ArtifactError) -> Self {
        match error {
            ArtifactError::Empty(_) => PredictionFailure::MissingArtifact,
            other => PredictionFailure::ArtifactLoad(other),
        }
    }
}

impl PredictionFailure {
    pub fn title(&self) -> &'static str {
        match self {
            PredictionFailure::Network(_) => "Download Failed",
            PredictionFailure::MissingArtifact => "Model Missing",
            PredictionFailure::ArtifactLoad(_) => "Model Load Failed",
            PredictionFailure::Prediction(_) | PredictionFailure::Interrupted => "Prediction Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionState {
    #[default]
    Idle,
    Fetching,
    Fetched,
    FetchFailed,
    Predicting,
    Approved,
    Denied,
    PredictFailed,
}

impl PredictionState {
    pub fn is_busy(self) -> bool {
        matches!(self, PredictionState::Fetching | PredictionState::Fetched | PredictionState::Predicting)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            PredictionState::FetchFailed
                | PredictionState::Approved
                | PredictionState::Denied
                | PredictionState::PredictFailed
        )
    }

    pub fn message(self) -> &'static str {
        match self {
            PredictionState::Idle => "Fill in the form and press Predict.",
            PredictionState::Fetching => "Downloading model...",
            PredictionState::Fetched => "Model downloaded, loading...",
            PredictionState::FetchFailed => "Failed to download the model.",
            PredictionState::Predicting => "Running prediction...",
            PredictionState::Approved => "Loan Approved",
            PredictionState::Denied => "Loan Denied",
            PredictionState::PredictFailed => "Prediction could not be completed.",
        }
    }
}

impl From<Decision> for PredictionState {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => PredictionState::Approved,
            Decision::Denied => PredictionState::Denied,
        }
    }
}

/// Somewhere the model file can be obtained from.
pub trait ArtifactSource {
    /// Identifies the artifact for session caching.
    fn cache_key(&self) -> String;

    /// Writes the artifact to `dest`, overwriting what is there.
    fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError>;
}

/// The shared Google Drive file named in the config.
pub struct DriveSource {
    downloader: DriveDownloader,
    file_id: String,
}

impl DriveSource {
    pub fn new(downloader: DriveDownloader, file_id: impl Into<String>) -> Self {
        Self { downloader, file_id: file_id.into() }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let client = http_client(config.request_timeout())
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::new(DriveDownloader::new(client), config.model_file_id.clone()))
    }
}

impl ArtifactSource for DriveSource {
    fn cache_key(&self) -> String {
        format!("drive:{}", self.file_id)
    }

    fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError> {
        self.downloader.fetch(&self.file_id, dest)
    }
}

struct CachedModel {
    key: String,
    model: Arc<ModelArtifact>,
}

/// Decoded model kept for the rest of the session.
#[derive(Clone, Default)]
pub struct ArtifactCache {
    slot: Arc<Mutex<Option<CachedModel>>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<ModelArtifact>> {
        let slot = self.slot.lock().ok()?;
        slot.as_ref().filter(|cached| cached.key == key).map(|cached| Arc::clone(&cached.model))
    }

    pub fn store(&self, key: String, model: Arc<ModelArtifact>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(CachedModel { key, model });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().map(|slot| slot.is_none()).unwrap_or(true)
    }
}

fn cache_key(source: &dyn ArtifactSource, config: &AppConfig) -> String {
    match config.expected_sha256() {
        Some(digest) => format!("{}#{}", source.cache_key(), digest.to_ascii_lowercase()),
        None => source.cache_key(),
    }
}

fn obtain_model(
    source: &dyn ArtifactSource,
    config: &AppConfig,
    cache: &ArtifactCache,
    on_state: &mut dyn FnMut(PredictionState),
) -> Result<Arc<ModelArtifact>, PredictionFailure> {
    let key = cache_key(source, config);

    if config.reuse_downloaded_model {
        if let Some(model) = cache.get(&key) {
            info!(kind = model.kind(), "Using model from session cache");
            on_state(PredictionState::Fetched);
            on_state(PredictionState::Predicting);
            return Ok(model);
        }
    }

    on_state(PredictionState::Fetching);
    let path = match source.fetch(&config.artifact_path) {
        Ok(path) => path,
        Err(e) => {
            warn!("Model download failed: {}", e);
            on_state(PredictionState::FetchFailed);
            return Err(e.into());
        }
    };

    if fs::metadata(&path).is_ok_and(|meta| meta.len() == 0) {
        warn!(path = %path.display(), "Downloaded model file is empty");
        on_state(PredictionState::FetchFailed);
        return Err(PredictionFailure::MissingArtifact);
    }
    on_state(PredictionState::Fetched);

    on_state(PredictionState::Predicting);
    let model = match load_artifact(&path, config.expected_sha256()) {
        Ok(model) => Arc::new(model),
        Err(e) => {
            warn!(path = %path.display(), "Model load failed: {}", e);
            on_state(PredictionState::PredictFailed);
            return Err(e.into());
        }
    };

    if config.reuse_downloaded_model {
        cache.store(key, Arc::clone(&model));
    }
    Ok(model)
}

/// Fetches the model, loads it, and classifies one application.
///
/// Every state the run passes through is reported to `on_state`, ending with
/// exactly one terminal state.
pub fn run_prediction(
    source: &dyn ArtifactSource,
    config: &AppConfig,
    cache: &ArtifactCache,
    record: &ApplicationRecord,
    mut on_state: impl FnMut(PredictionState),
) -> Result<Decision, PredictionFailure> {
    let model = obtain_model(source, config, cache, &mut on_state)?;

    let outcome = model
        .predict(&[*record.features()])
        .and_then(|predictions| Decision::from_prediction(&predictions));

    match outcome {
        Ok(decision) => {
            info!(%decision, kind = model.kind(), "Prediction complete");
            on_state(decision.into());
            Ok(decision)
        }
        Err(e) => {
            warn!("Prediction failed: {}", e);
            on_state(PredictionState::PredictFailed);
            Err(e.into())
        }
    }
}

/// Encodes the form and runs a prediction against it.
pub fn predict_application(
    source: &dyn ArtifactSource,
    config: &AppConfig,
    cache: &ArtifactCache,
    request: ApplicationRequest,
    on_state: impl FnMut(PredictionState),
) -> (ApplicationRecord, Result<Decision, PredictionFailure>) {
    let record = request.encode();
    let outcome = run_prediction(source, config, cache, &record, on_state);
    (record, outcome)
}
