pub mod errors;
pub mod http;
pub mod pipeline;
pub mod tasks;

pub use errors::LoanError;
pub use pipeline::{
    ArtifactCache,
    PredictionFailure,
    PredictionState,
};
