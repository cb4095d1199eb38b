use crate::{
    core::{
        PredictionFailure,
        PredictionState,
    },
    encoding::ApplicationRecord,
    model::Decision,
};

pub type PredictionOutcome = Result<Decision, PredictionFailure>;

#[derive(Debug)]
pub enum TaskResult {
    PredictionState(PredictionState),
    PredictionFinished { record: ApplicationRecord, outcome: PredictionOutcome },
}

impl TaskResult {
    pub fn task_type(&self) -> &'static str {
        match self {
            TaskResult::PredictionState(_) => "prediction_state",
            TaskResult::PredictionFinished { .. } => "prediction_finished",
        }
    }
}
