mod config;
pub use config::{
    MIN_RESIDUAL_THRESHOLD, MIN_SAMPLES, OUTLIER_RATIO, TrialBudget, derive_residual_threshold,
    required_trials,
};

mod fit;
pub use fit::FitResult;

mod line;
pub use line::Line;

mod ransac;
pub use ransac::RobustLineRegressor;
