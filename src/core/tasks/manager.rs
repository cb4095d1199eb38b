use std::{
    sync::mpsc,
    thread,
};

use tracing::{
    debug,
    error,
};

use super::TaskResult;
use crate::{
    config::AppConfig,
    core::{
        pipeline::{
            predict_application,
            ArtifactSource,
            DriveSource,
        },
        ArtifactCache,
        PredictionFailure,
        PredictionState,
    },
    encoding::{
        ApplicationRecord,
        ApplicationRequest,
    },
};

use super::types::PredictionOutcome;

/// Guarantees every run ends with `PredictionFinished`, even if the worker unwinds.
struct FinishGuard<'a> {
    sender: &'a mpsc::Sender<TaskResult>,
    request: ApplicationRequest,
    finished: bool,
}

impl<'a> FinishGuard<'a> {
    fn new(sender: &'a mpsc::Sender<TaskResult>, request: ApplicationRequest) -> Self {
        Self { sender, request, finished: false }
    }

    fn finish(mut self, record: ApplicationRecord, outcome: PredictionOutcome) {
        self.finished = true;
        let _ = self.sender.send(TaskResult::PredictionFinished { record, outcome });
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        error!("Prediction worker stopped before reporting an outcome");
        let _ = self.sender.send(TaskResult::PredictionState(PredictionState::PredictFailed));
        let _ = self.sender.send(TaskResult::PredictionFinished {
            record: self.request.encode(),
            outcome: Err(PredictionFailure::Interrupted),
        });
    }
}

pub struct TaskManager {
    receiver: mpsc::Receiver<TaskResult>,
    sender: mpsc::Sender<TaskResult>,
}

impl TaskManager {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();

        Self { receiver, sender }
    }

    pub fn poll_results(&mut self) -> Vec<TaskResult> {
        let mut results = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }

        results
    }

    /// Runs one prediction off the UI thread against the configured Drive file.
    pub fn predict(&self, request: ApplicationRequest, config: AppConfig, cache: ArtifactCache) {
        let sender = self.sender.clone();

        thread::spawn(move || {
            let guard = FinishGuard::new(&sender, request);
            let (record, outcome) = match DriveSource::from_config(&config) {
                Ok(source) => run(&source, request, &config, &cache, &sender),
                Err(e) => {
                    let _ = sender.send(TaskResult::PredictionState(PredictionState::FetchFailed));
                    (request.encode(), Err(PredictionFailure::from(e)))
                }
            };
            guard.finish(record, outcome);
        });
    }

    /// Same as [`TaskManager::predict`] with a caller-supplied source.
    pub fn predict_with<S>(
        &self,
        source: S,
        request: ApplicationRequest,
        config: AppConfig,
        cache: ArtifactCache,
    ) where
        S: ArtifactSource + Send + 'static,
    {
        let sender = self.sender.clone();

        thread::spawn(move || {
            let guard = FinishGuard::new(&sender, request);
            let (record, outcome) = run(&source, request, &config, &cache, &sender);
            guard.finish(record, outcome);
        });
    }
}

fn run(
    source: &dyn ArtifactSource,
    request: ApplicationRequest,
    config: &AppConfig,
    cache: &ArtifactCache,
    sender: &mpsc::Sender<TaskResult>,
) -> (ApplicationRecord, PredictionOutcome) {
    predict_application(source, config, cache, request, |state| {
        debug!(?state, "Prediction state");
        let _ = sender.send(TaskResult::PredictionState(state));
    })
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{
            Path,
            PathBuf,
        },
        time::{
            Duration,
            Instant,
        },
    };

    use super::*;
    use crate::{
        core::http::FetchError,
        encoding::FEATURE_COUNT,
        model::{
            artifact::encode_artifact,
            ArtifactFormat,
            Decision,
            ModelArtifact,
            Tree,
            TreeNode,
        },
    };

    struct StaticSource(Vec<u8>);

    impl ArtifactSource for StaticSource {
        fn cache_key(&self) -> String {
            "static".to_string()
        }

        fn fetch(&self, dest: &Path) -> Result<PathBuf, FetchError> {
            fs::write(dest, &self.0).unwrap();
            Ok(dest.to_path_buf())
        }
    }

    fn wait_for_finish(manager: &mut TaskManager) -> Vec<TaskResult> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();
        while Instant::now() < deadline {
            results.extend(manager.poll_results());
            if results.iter().any(|r| matches!(r, TaskResult::PredictionFinished { .. })) {
                return results;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("prediction did not finish: {:?}", results);
    }

    #[test]
    fn background_prediction_reports_states_then_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let model = ModelArtifact::DecisionTree(Tree::new(
            FEATURE_COUNT,
            vec![TreeNode::Leaf { class: 0 }],
        ));
        let bytes = encode_artifact(&model, ArtifactFormat::Json);
        let config = AppConfig {
            artifact_path: dir.path().join("loan_model.bin"),
            ..Default::default()
        };

        let mut manager = TaskManager::new();
        manager.predict_with(
            StaticSource(bytes),
            ApplicationRequest::default(),
            config,
            ArtifactCache::new(),
        );

        let results = wait_for_finish(&mut manager);
        let states: Vec<PredictionState> = results
            .iter()
            .filter_map(|r| match r {
                TaskResult::PredictionState(state) => Some(*state),
                _ => None,
            })
            .collect();
        assert_eq!(states.last(), Some(&PredictionState::Denied));
        assert_eq!(results.last().map(TaskResult::task_type), Some("prediction_finished"));

        match results.last() {
            Some(TaskResult::PredictionFinished { outcome, record }) => {
                assert_eq!(outcome.as_ref().ok(), Some(&Decision::Denied));
                assert_eq!(record, &ApplicationRequest::default().encode());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    struct BrokenSource;

    impl ArtifactSource for BrokenSource {
        fn cache_key(&self) -> String {
            "broken".to_string()
        }

        fn fetch(&self, _dest: &Path) -> Result<PathBuf, FetchError> {
            panic!("source exploded");
        }
    }

    #[test]
    fn panicking_worker_still_finishes_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            artifact_path: dir.path().join("loan_model.bin"),
            ..Default::default()
        };

        let mut manager = TaskManager::new();
        manager.predict_with(BrokenSource, ApplicationRequest::default(), config, ArtifactCache::new());

        let results = wait_for_finish(&mut manager);
        assert!(results
            .iter()
            .any(|r| matches!(r, TaskResult::PredictionState(PredictionState::PredictFailed))));
        match results.last() {
            Some(TaskResult::PredictionFinished { outcome: Err(failure), record }) => {
                assert!(matches!(failure, PredictionFailure::Interrupted));
                assert_eq!(failure.title(), "Prediction Failed");
                assert_eq!(record, &ApplicationRequest::default().encode());
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn missing_file_id_fails_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            model_file_id: String::new(),
            artifact_path: dir.path().join("loan_model.bin"),
            ..Default::default()
        };

        let mut manager = TaskManager::new();
        manager.predict(ApplicationRequest::default(), config, ArtifactCache::new());

        let results = wait_for_finish(&mut manager);
        match results.last() {
            Some(TaskResult::PredictionFinished { outcome: Err(failure), .. }) => {
                assert!(matches!(failure, PredictionFailure::Network(FetchError::MissingFileId)));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
