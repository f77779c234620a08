pub mod matcher;
pub mod model;
pub mod normalizer;
pub mod ranker;
pub mod scorer;
pub mod service;

pub use model::{Estimator, EstimatorError, EstimatorSettings};
pub use service::{Prediction, PredictionService, PredictionSource};
