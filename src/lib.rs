#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits, clippy::len_without_is_empty)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

#[macro_use]
extern crate alloc;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod error;
pub use error::{Result, TrendError};

mod traits;
pub use traits::Smoother;

mod utils;
pub(crate) use utils::helper;
pub use utils::{BoundedWindow, MIN_WINDOW_CAPACITY};

mod ema;
pub use ema::{Ema, SMOOTHING_COEFFICIENT};

mod dema;
pub use dema::Dema;

mod regression;
pub use regression::{
    FitResult, Line, MIN_RESIDUAL_THRESHOLD, MIN_SAMPLES, OUTLIER_RATIO, RobustLineRegressor,
    TrialBudget, derive_residual_threshold, required_trials,
};

#[cfg(feature = "std")]
mod trend;
#[cfg(feature = "std")]
pub use trend::{Trend, TrendClassifier, TrendKind};
